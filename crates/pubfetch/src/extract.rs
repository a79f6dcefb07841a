//! Batch extraction with per-record failure isolation.
//!
//! Every record in a fetched batch is mapped to its own outcome. Papers keep
//! the batch order; records that fail to normalize are reported as
//! [`RecordFailure`]s and left out, so one malformed citation never costs the
//! rest of the batch.

use super::*;
use crate::raw::{mapping, one_or_many, text};

/// A record that could not be normalized.
#[derive(Debug)]
pub struct RecordFailure {
  /// Zero-based position of the record within the batch
  pub index: usize,
  /// The record's PMID, when it could still be read
  pub pmid:  Option<String>,
  /// Why normalization failed
  pub error: PubfetchError,
}

impl std::fmt::Display for RecordFailure {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.pmid {
      Some(pmid) => write!(f, "record {} (PMID {}): {}", self.index, pmid, self.error),
      None => write!(f, "record {}: {}", self.index, self.error),
    }
  }
}

/// The result of extracting one batch.
#[derive(Debug, Default)]
pub struct Extraction {
  /// Successfully normalized papers, in batch order
  pub papers:   Vec<Paper>,
  /// Records that were skipped
  pub failures: Vec<RecordFailure>,
}

/// Applies a [`RecordNormalizer`] to every record of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchExtractor {
  /// Normalizer applied to each record
  normalizer: RecordNormalizer,
}

impl BatchExtractor {
  /// Creates an extractor around the given normalizer.
  pub fn new(normalizer: RecordNormalizer) -> Self { Self { normalizer } }

  /// Extracts papers from an efetch tree.
  ///
  /// Accepts either the whole document (`PubmedArticleSet` with one or many
  /// `PubmedArticle`s) or a bare sequence of records.
  ///
  /// # Examples
  ///
  /// ```
  /// use pubfetch::BatchExtractor;
  /// use serde_json::json;
  ///
  /// let batch = json!({ "PubmedArticleSet": { "PubmedArticle": [
  ///   { "MedlineCitation": { "PMID": "1" } },
  ///   "not a record",
  ///   { "MedlineCitation": { "PMID": "3" } }
  /// ]}});
  ///
  /// let extraction = BatchExtractor::default().extract(&batch);
  /// assert_eq!(extraction.papers.len(), 2);
  /// assert_eq!(extraction.failures[0].index, 1);
  /// ```
  pub fn extract(&self, batch: &Value) -> Extraction {
    let records = records(batch);
    debug!("Extracting {} records", records.len());

    let mut extraction = Extraction::default();
    for (index, outcome) in records.into_iter().map(|record| self.outcome(record)).enumerate() {
      match outcome {
        Ok(paper) => extraction.papers.push(paper),
        Err((pmid, error)) => {
          let failure = RecordFailure { index, pmid, error };
          warn!("Skipping {failure}");
          extraction.failures.push(failure);
        },
      }
    }
    extraction
  }

  /// Normalizes one record, keeping its PMID alongside any error.
  fn outcome(&self, record: &Value) -> Result<Paper, (Option<String>, PubfetchError)> {
    self.normalizer.normalize(record).map_err(|error| (pmid_of(record), error))
  }
}

/// The records of a batch, with a single record read as a one-element batch.
fn records(batch: &Value) -> Vec<&Value> {
  match batch {
    Value::Array(_) => one_or_many(Some(batch)),
    Value::Object(map) => match map.get("PubmedArticleSet") {
      Some(set) => one_or_many(set.get("PubmedArticle")),
      None => vec![batch],
    },
    _ => Vec::new(),
  }
}

/// Best-effort PMID lookup for failure reports.
fn pmid_of(record: &Value) -> Option<String> {
  let citation = mapping(Some(record), "MedlineCitation", "PubmedArticle").ok()?;
  text(mapping(citation, "PMID", "MedlineCitation").ok()?)
}
