//! The normalized paper produced from one raw PubMed citation.

use super::*;

/// Placeholder used for identifier, title and year when the record omits them.
pub const NOT_AVAILABLE: &str = "N/A";

/// A paper with its non-academic authorship extracted.
///
/// `non_academic_authors` and `company_affiliations` are index-aligned: entry `i`
/// of one belongs to entry `i` of the other. An author listing two company
/// affiliations appears twice.
///
/// # Examples
///
/// ```
/// use pubfetch::{Paper, ReportRow};
///
/// let paper = Paper {
///   id:                   "111".into(),
///   title:                "A study".into(),
///   publication_year:     "2024".into(),
///   non_academic_authors: vec!["Jane Doe".into(), "John Roe".into()],
///   company_affiliations: vec!["Acme Inc".into(), "Globex".into()],
///   corresponding_email:  String::new(),
/// };
///
/// let row = ReportRow::from(&paper);
/// assert_eq!(row.non_academic_authors, "Jane Doe; John Roe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
  /// PubMed identifier (PMID), or `"N/A"`
  pub id:                   String,
  /// Article title, or `"N/A"`
  pub title:                String,
  /// Publication year as printed in the journal issue, or `"N/A"`
  pub publication_year:     String,
  /// Display names of authors with a non-academic affiliation
  pub non_academic_authors: Vec<String>,
  /// The non-academic affiliation text for each entry of `non_academic_authors`
  pub company_affiliations: Vec<String>,
  /// The last email address found in any affiliation, or empty
  pub corresponding_email:  String,
}

impl Paper {
  /// Whether any author was flagged as non-academic.
  pub fn has_company_authors(&self) -> bool { !self.non_academic_authors.is_empty() }
}
