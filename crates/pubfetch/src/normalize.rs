//! Normalization of one raw PubMed citation into a [`Paper`].
//!
//! The walk follows the efetch layout:
//!
//! ```text
//! PubmedArticle
//! └── MedlineCitation
//!     ├── PMID
//!     └── Article
//!         ├── ArticleTitle
//!         ├── Journal/JournalIssue/PubDate/Year
//!         └── AuthorList/Author*
//!             ├── ForeName, LastName
//!             └── AffiliationInfo*/Affiliation
//! ```
//!
//! Missing fields fall back to defaults. Only a node of the wrong kind where a
//! mapping is required produces an error, which the batch extractor isolates.

use super::*;
use crate::{
  classify::{extract_email, AffiliationClassifier},
  paper::NOT_AVAILABLE,
  raw::{kind, mapping, one_or_many, text},
};

/// Turns raw citation records into [`Paper`]s.
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
  /// Policy used to flag company affiliations
  classifier: AffiliationClassifier,
}

impl RecordNormalizer {
  /// Creates a normalizer around the given classifier.
  pub fn new(classifier: AffiliationClassifier) -> Self { Self { classifier } }

  /// Normalizes one `PubmedArticle` record.
  ///
  /// # Errors
  ///
  /// Returns [`PubfetchError::RecordShape`] when the record, its citation, article,
  /// journal chain, author list, an author or an affiliation entry is present but
  /// is not a mapping.
  ///
  /// # Examples
  ///
  /// ```
  /// use pubfetch::RecordNormalizer;
  /// use serde_json::json;
  ///
  /// let record = json!({
  ///   "MedlineCitation": {
  ///     "PMID": { "@Version": "1", "$text": "111" },
  ///     "Article": {
  ///       "ArticleTitle": "A study",
  ///       "AuthorList": { "Author": {
  ///         "ForeName": "Jane",
  ///         "LastName": "Doe",
  ///         "AffiliationInfo": { "Affiliation": "Acme Inc, jane@acme.com" }
  ///       }}
  ///     }
  ///   }
  /// });
  ///
  /// let paper = RecordNormalizer::default().normalize(&record)?;
  /// assert_eq!(paper.id, "111");
  /// assert_eq!(paper.publication_year, "N/A");
  /// assert_eq!(paper.non_academic_authors, vec!["Jane Doe"]);
  /// assert_eq!(paper.corresponding_email, "jane@acme.com");
  /// # Ok::<(), pubfetch::errors::PubfetchError>(())
  /// ```
  pub fn normalize(&self, record: &Value) -> Result<Paper, PubfetchError> {
    if !record.is_object() {
      return Err(PubfetchError::RecordShape(format!(
        "expected a mapping at `PubmedArticle`, found {}",
        kind(record)
      )));
    }

    let citation = mapping(Some(record), "MedlineCitation", "PubmedArticle")?;
    let article = mapping(citation, "Article", "MedlineCitation")?;

    let id = text(mapping(citation, "PMID", "MedlineCitation")?);
    let title = text(mapping(article, "ArticleTitle", "Article")?);

    let journal = mapping(article, "Journal", "Article")?;
    let issue = mapping(journal, "JournalIssue", "Journal")?;
    let pub_date = mapping(issue, "PubDate", "JournalIssue")?;
    let year = text(mapping(pub_date, "Year", "PubDate")?);

    let author_list = mapping(article, "AuthorList", "Article")?;
    let authors = one_or_many(mapping(author_list, "Author", "AuthorList")?);

    let mut non_academic_authors = Vec::new();
    let mut company_affiliations = Vec::new();
    let mut corresponding_email = String::new();

    for (index, author) in authors.into_iter().enumerate() {
      let path = format!("AuthorList/Author[{index}]");
      let affiliations = one_or_many(mapping(Some(author), "AffiliationInfo", &path)?);

      for (slot, info) in affiliations.into_iter().enumerate() {
        let info_path = format!("{path}/AffiliationInfo[{slot}]");
        let Some(affiliation) = text(mapping(Some(info), "Affiliation", &info_path)?) else {
          continue;
        };

        if self.classifier.is_non_academic(&affiliation) {
          trace!("Non-academic affiliation for {path}: {affiliation}");
          non_academic_authors.push(display_name(author));
          company_affiliations.push(affiliation.clone());
        }

        if let Some(email) = extract_email(&affiliation) {
          corresponding_email = email.to_string();
        }
      }
    }

    Ok(Paper {
      id: id.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
      title: title.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
      publication_year: year.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
      non_academic_authors,
      company_affiliations,
      corresponding_email,
    })
  }
}

/// "ForeName LastName", leaving out whichever part is missing.
///
/// Only called on authors already checked to be mappings.
fn display_name(author: &Value) -> String {
  [author.get("ForeName"), author.get("LastName")]
    .into_iter()
    .filter_map(text)
    .collect::<Vec<_>>()
    .join(" ")
}
