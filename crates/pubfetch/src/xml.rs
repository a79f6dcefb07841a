//! Conversion of efetch XML documents into raw citation trees.
//!
//! The tree keeps the XML's own ambiguity instead of resolving it against a
//! schema, so the rest of the crate can be tested with plain JSON literals:
//!
//! - an element with only text becomes a string, an empty element becomes null
//! - an element with children or attributes becomes a mapping
//! - attributes are stored as `@name`, text beside attributes or children as `$text`
//! - a tag seen once is a single value, a tag repeated among siblings is a sequence
//! - inline formatting (`<i>`, `<b>`, `<u>`, `<sub>`, `<sup>`) is flattened into the
//!   surrounding text, so `The <i>BRCA1</i> gene` reads as `The BRCA1 gene`
//!
//! # Examples
//!
//! ```
//! use pubfetch::xml::to_value;
//!
//! let tree = to_value(
//!   r#"<AuthorList><Author><LastName>Doe</LastName></Author></AuthorList>"#,
//! )?;
//! assert_eq!(tree["AuthorList"]["Author"]["LastName"], "Doe");
//! # Ok::<(), pubfetch::errors::PubfetchError>(())
//! ```

use quick_xml::{
  events::{BytesStart, Event},
  Reader,
};
use serde_json::{map::Entry, Map};

use super::*;
use crate::raw::TEXT_KEY;

/// Formatting tags PubMed allows inside titles, abstracts and affiliations.
const INLINE_TAGS: [&str; 5] = ["b", "i", "u", "sub", "sup"];

/// An element whose end tag has not been read yet.
struct Frame {
  /// Qualified tag name
  tag:      String,
  /// Attributes and completed child elements
  children: Map<String, Value>,
  /// Character data collected so far, including flattened inline markup
  text:     String,
  /// Whether this is inline markup whose text belongs to the parent
  inline:   bool,
}

impl Frame {
  /// Opens a frame for `tag` with its attributes already recorded.
  fn new(tag: String, children: Map<String, Value>) -> Self {
    Self { tag, children, text: String::new(), inline: false }
  }

  /// Opens a frame for inline markup; its attributes are dropped.
  fn inline(tag: String) -> Self { Self { tag, children: Map::new(), text: String::new(), inline: true } }

  /// Closes the frame into its tag and value.
  fn finish(self) -> (String, Value) {
    let text = self.text.trim();
    let value = if self.children.is_empty() {
      if text.is_empty() {
        Value::Null
      } else {
        Value::String(text.to_string())
      }
    } else {
      let mut children = self.children;
      if !text.is_empty() {
        children.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
      }
      Value::Object(children)
    };
    (self.tag, value)
  }
}

/// Parses an XML document into a raw tree rooted at an unnamed mapping.
///
/// # Errors
///
/// Returns [`PubfetchError::ApiError`] when the document is not well-formed.
pub fn to_value(xml: &str) -> Result<Value, PubfetchError> {
  let mut reader = Reader::from_str(xml);
  let mut stack = vec![Frame::new(String::new(), Map::new())];

  loop {
    let event = reader.read_event().map_err(parse_error)?;
    match event {
      Event::Start(e) => {
        let tag = tag_name(&e);
        if is_inline(&tag) {
          stack.push(Frame::inline(tag));
        } else {
          stack.push(Frame::new(tag, attributes(&e)?));
        }
      },
      Event::Empty(e) if is_inline(&tag_name(&e)) => (),
      Event::Empty(e) => {
        let attrs = attributes(&e)?;
        let value = if attrs.is_empty() { Value::Null } else { Value::Object(attrs) };
        if let Some(parent) = stack.last_mut() {
          insert_child(&mut parent.children, tag_name(&e), value);
        }
      },
      Event::Text(e) =>
        if let Some(frame) = stack.last_mut() {
          frame.text.push_str(&e.unescape().map_err(parse_error)?);
        },
      Event::CData(e) =>
        if let Some(frame) = stack.last_mut() {
          frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
        },
      Event::End(_) => {
        let frame = match stack.pop() {
          Some(frame) if !stack.is_empty() => frame,
          _ => return Err(PubfetchError::ApiError("Failed to parse XML: unmatched end tag".into())),
        };
        let Some(parent) = stack.last_mut() else { continue };
        if frame.inline {
          parent.text.push_str(&frame.text);
        } else {
          let (tag, value) = frame.finish();
          insert_child(&mut parent.children, tag, value);
        }
      },
      Event::Eof => break,
      _ => (),
    }
  }

  match stack.pop() {
    Some(root) if stack.is_empty() => Ok(Value::Object(root.children)),
    _ => Err(PubfetchError::ApiError("Failed to parse XML: unclosed element".into())),
  }
}

/// Adds a child under `tag`, promoting the slot to a sequence on repetition.
fn insert_child(children: &mut Map<String, Value>, tag: String, value: Value) {
  match children.entry(tag) {
    Entry::Vacant(slot) => {
      slot.insert(value);
    },
    Entry::Occupied(mut slot) => match slot.get_mut() {
      Value::Array(items) => items.push(value),
      existing => {
        let previous = existing.take();
        *existing = Value::Array(vec![previous, value]);
      },
    },
  }
}

/// Whether `tag` is inline formatting rather than structure.
fn is_inline(tag: &str) -> bool { INLINE_TAGS.contains(&tag) }

/// The element's qualified name as a string.
fn tag_name(e: &BytesStart<'_>) -> String { String::from_utf8_lossy(e.name().as_ref()).into_owned() }

/// Collects an element's attributes as `@name` entries.
fn attributes(e: &BytesStart<'_>) -> Result<Map<String, Value>, PubfetchError> {
  let mut attrs = Map::new();
  for attr in e.attributes() {
    let attr = attr
      .map_err(|err| PubfetchError::ApiError(format!("Failed to parse XML attribute: {err}")))?;
    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
    let value = attr.unescape_value().map_err(parse_error)?;
    attrs.insert(format!("@{key}"), Value::String(value.into_owned()));
  }
  Ok(attrs)
}

/// Wraps a parser error the same way for every event kind.
fn parse_error(err: quick_xml::Error) -> PubfetchError {
  PubfetchError::ApiError(format!("Failed to parse XML: {err}"))
}
