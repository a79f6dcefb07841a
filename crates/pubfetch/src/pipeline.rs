//! The search → fetch → extract pipeline.
//!
//! A run makes at most two service calls, one after the other: a search for the
//! query's identifiers, then a single fetch for all of them. A failure in either
//! call aborts the run; failures inside individual records do not.

use super::*;

/// Everything one run produced.
#[derive(Debug, Default)]
pub struct RunReport {
  /// Identifiers returned by the search, in search order
  pub identifiers: Vec<String>,
  /// Papers and skipped records from the fetched batch
  pub extraction:  Extraction,
}

impl RunReport {
  /// The report rows for every extracted paper, in batch order.
  pub fn rows(&self) -> Vec<ReportRow> { self.extraction.papers.iter().map(ReportRow::from).collect() }
}

/// Runs queries against a search and a fetch service.
///
/// # Examples
///
/// ```no_run
/// use pubfetch::{EntrezClient, EntrezConfig, Pipeline};
///
/// # async fn example() -> Result<(), pubfetch::errors::PubfetchError> {
/// let client = EntrezClient::new(EntrezConfig::default())?;
/// let report = Pipeline::new(&client, &client).with_max_results(5).run("crispr").await?;
/// println!("{} papers", report.extraction.papers.len());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<'a, S, F> {
  /// Service resolving a query to identifiers
  search:      &'a S,
  /// Service resolving identifiers to raw records
  fetch:       &'a F,
  /// Extraction applied to the fetched batch
  extractor:   BatchExtractor,
  /// Identifier cap passed to the search
  max_results: usize,
}

impl<'a, S: SearchService, F: FetchService> Pipeline<'a, S, F> {
  /// Creates a pipeline with the default classifier and result cap.
  pub fn new(search: &'a S, fetch: &'a F) -> Self {
    Self {
      search,
      fetch,
      extractor: BatchExtractor::default(),
      max_results: entrez::DEFAULT_MAX_RESULTS,
    }
  }

  /// Replaces the extractor, e.g. to inject a different classifier.
  pub fn with_extractor(mut self, extractor: BatchExtractor) -> Self {
    self.extractor = extractor;
    self
  }

  /// Changes the number of identifiers requested from the search.
  pub fn with_max_results(mut self, max_results: usize) -> Self {
    self.max_results = max_results;
    self
  }

  /// Searches for `query`, fetches every hit in one call and extracts papers.
  ///
  /// # Errors
  ///
  /// Returns the search or fetch error unchanged; no partial report is produced.
  pub async fn run(&self, query: &str) -> Result<RunReport, PubfetchError> {
    debug!("Searching for: {query}");
    let identifiers = self.search.search(query, self.max_results).await?;
    debug!("Found {} paper IDs: {:?}", identifiers.len(), identifiers);

    if identifiers.is_empty() {
      return Ok(RunReport::default());
    }

    let batch = self.fetch.fetch(&identifiers).await?;
    let extraction = self.extractor.extract(&batch);
    debug!(
      "Extracted {} papers, skipped {} records",
      extraction.papers.len(),
      extraction.failures.len()
    );

    Ok(RunReport { identifiers, extraction })
  }
}
