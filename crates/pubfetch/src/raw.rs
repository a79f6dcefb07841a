//! Tolerant accessors for raw citation trees.
//!
//! Raw records come from XML, where a repeated element becomes a sequence and a
//! lone element becomes a mapping. Nothing in the source schema says which one a
//! field will be, so every lookup goes through the helpers here:
//!
//! - [`one_or_many`] coerces any field to a sequence before iteration
//! - [`mapping`] follows a key through a node that must be a mapping (or a list of them)
//! - [`text`] reads leaf text and never fails
//!
//! # Examples
//!
//! ```
//! use pubfetch::raw::{mapping, one_or_many, text};
//! use serde_json::json;
//!
//! let single = json!({ "Author": { "LastName": "Doe" } });
//! let many = json!({ "Author": [{ "LastName": "Doe" }, { "LastName": "Roe" }] });
//!
//! assert_eq!(one_or_many(single.get("Author")).len(), 1);
//! assert_eq!(one_or_many(many.get("Author")).len(), 2);
//!
//! let pmid = json!({ "PMID": { "@Version": "1", "$text": "111" } });
//! assert_eq!(text(pmid.get("PMID")).as_deref(), Some("111"));
//! assert!(mapping(Some(&pmid), "PMID", "record").is_ok());
//! ```

use super::*;

/// Key under which element text is stored when the element also has attributes.
pub const TEXT_KEY: &str = "$text";

/// Coerces a field to a sequence: absent or null gives zero items, a sequence
/// gives its items, anything else gives itself as the single item.
pub fn one_or_many(value: Option<&Value>) -> Vec<&Value> {
  match value {
    None | Some(Value::Null) => Vec::new(),
    Some(Value::Array(items)) => items.iter().collect(),
    Some(other) => vec![other],
  }
}

/// Looks up `key` in `node`, which must be a mapping when present.
///
/// A sequence in place of the mapping is tolerated by reading its first item.
/// An absent or null node, or an absent or null key, is `Ok(None)`. Any other
/// node kind (a string where a mapping belongs, for instance) is a
/// [`PubfetchError::RecordShape`] naming `path`.
pub fn mapping<'a>(
  node: Option<&'a Value>,
  key: &str,
  path: &str,
) -> Result<Option<&'a Value>, PubfetchError> {
  let Some(node) = first(node) else {
    return Ok(None);
  };
  match node {
    Value::Object(map) => Ok(map.get(key).filter(|value| !value.is_null())),
    other => Err(PubfetchError::RecordShape(format!(
      "expected a mapping at `{path}`, found {}",
      kind(other)
    ))),
  }
}

/// Reads the text of a leaf node.
///
/// Strings are returned as-is, numbers and booleans are rendered, a mapping
/// yields its `$text` entry and a sequence yields the text of its first item.
/// Blank text counts as missing.
pub fn text(value: Option<&Value>) -> Option<String> {
  let text = match first(value)? {
    Value::String(s) => s.clone(),
    Value::Number(n) => n.to_string(),
    Value::Bool(b) => b.to_string(),
    Value::Object(map) => map.get(TEXT_KEY)?.as_str()?.to_string(),
    Value::Null | Value::Array(_) => return None,
  };
  if text.trim().is_empty() {
    None
  } else {
    Some(text)
  }
}

/// Unwraps a sequence to its first item; null counts as absent.
fn first(value: Option<&Value>) -> Option<&Value> {
  match value? {
    Value::Null => None,
    Value::Array(items) => items.iter().find(|item| !item.is_null()),
    other => Some(other),
  }
}

/// Short name of a node's kind for error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "a sequence",
    Value::Object(_) => "a mapping",
  }
}
