//! Affiliation classification and email extraction.
//!
//! Affiliations are judged with a plain substring heuristic: text mentioning any
//! academic keyword (university, hospital, ...) is academic, everything else is
//! treated as a company affiliation.
//!
//! # Examples
//!
//! ```
//! use pubfetch::classify::{extract_email, AffiliationClassifier};
//!
//! let classifier = AffiliationClassifier::default();
//! assert!(classifier.is_non_academic("Acme Pharmaceuticals Inc."));
//! assert!(!classifier.is_non_academic("Department of Biology, Acme Corp"));
//!
//! assert_eq!(extract_email("Acme Inc, contact: jane.doe@acme.com"), Some("jane.doe@acme.com"));
//! assert_eq!(extract_email("no email here"), None);
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use super::*;

/// Substrings that mark an affiliation as academic.
pub const ACADEMIC_KEYWORDS: [&str; 6] =
  ["university", "college", "institute", "hospital", "school", "department"];

lazy_static! {
  /// Loose `local-part@domain` pattern over word characters, dots and hyphens.
  static ref EMAIL: Regex = Regex::new(r"[\w.-]+@[\w.-]+").unwrap();
}

/// Classification policy for affiliation text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
  /// Keywords whose presence (as a case-insensitive substring) marks an affiliation academic
  pub academic_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
  fn default() -> Self {
    Self { academic_keywords: ACADEMIC_KEYWORDS.iter().map(|k| k.to_string()).collect() }
  }
}

/// Decides whether an affiliation belongs to an academic institution.
#[derive(Debug, Clone)]
pub struct AffiliationClassifier {
  /// Lowercased academic keywords
  keywords: Vec<String>,
}

impl AffiliationClassifier {
  /// Creates a classifier from the given policy.
  ///
  /// Keywords are lowercased once here so matching is case-insensitive on both sides.
  pub fn new(config: ClassifierConfig) -> Self {
    let keywords = config.academic_keywords.iter().map(|k| k.to_lowercase()).collect();
    Self { keywords }
  }

  /// Returns `true` unless the affiliation contains one of the academic keywords.
  ///
  /// Matching is by substring, not whole word, so "Schoolhouse Labs" counts as
  /// academic. Empty or whitespace-only text matches no keyword and is therefore
  /// reported as non-academic.
  pub fn is_non_academic(&self, affiliation: &str) -> bool {
    let affiliation = affiliation.to_lowercase();
    !self.keywords.iter().any(|keyword| affiliation.contains(keyword.as_str()))
  }
}

impl Default for AffiliationClassifier {
  fn default() -> Self { Self::new(ClassifierConfig::default()) }
}

/// Returns the first email-looking substring of `text`, if any.
///
/// No validation is done beyond the pattern: `a@b` is accepted.
pub fn extract_email(text: &str) -> Option<&str> { EMAIL.find(text).map(|m| m.as_str()) }
