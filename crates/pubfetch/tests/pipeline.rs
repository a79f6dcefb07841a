//! End-to-end runs of the pipeline against in-memory services.

use std::cell::{Cell, RefCell};

use pubfetch::{
  errors::PubfetchError, AffiliationClassifier, BatchExtractor, ClassifierConfig, FetchService,
  Pipeline, RecordNormalizer, SearchService,
};
use serde_json::{json, Value};

/// Returns a fixed identifier list and counts calls.
struct StubSearch {
  ids:   Vec<String>,
  calls: Cell<usize>,
  limit: Cell<usize>,
}

impl StubSearch {
  fn new(ids: &[&str]) -> Self {
    Self { ids: ids.iter().map(|s| s.to_string()).collect(), calls: Cell::new(0), limit: Cell::new(0) }
  }
}

impl SearchService for StubSearch {
  async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<String>, PubfetchError> {
    self.calls.set(self.calls.get() + 1);
    self.limit.set(max_results);
    Ok(self.ids.clone())
  }
}

/// Returns a fixed batch, or fails with a transport error when `batch` is `None`.
struct StubFetch {
  batch:     Option<Value>,
  requested: RefCell<Vec<Vec<String>>>,
}

impl StubFetch {
  fn new(batch: Option<Value>) -> Self { Self { batch, requested: RefCell::new(Vec::new()) } }
}

impl FetchService for StubFetch {
  async fn fetch(&self, ids: &[String]) -> Result<Value, PubfetchError> {
    self.requested.borrow_mut().push(ids.to_vec());
    self.batch.clone().ok_or_else(|| PubfetchError::ApiError("connection reset".into()))
  }
}

fn article(pmid: &str, title: &str, affiliation: &str) -> Value {
  json!({
    "MedlineCitation": {
      "PMID": { "@Version": "1", "$text": pmid },
      "Article": {
        "ArticleTitle": title,
        "Journal": { "JournalIssue": { "PubDate": { "Year": "2024" } } },
        "AuthorList": { "Author": [
          { "ForeName": "Jane", "LastName": "Doe", "AffiliationInfo": { "Affiliation": affiliation } },
          { "ForeName": "Ann", "LastName": "Lee",
            "AffiliationInfo": { "Affiliation": "University of Oslo, ann@uio.no" } }
        ]}
      }
    }
  })
}

#[tokio::test]
async fn test_two_record_report() -> anyhow::Result<()> {
  let search = StubSearch::new(&["111", "222"]);
  let fetch = StubFetch::new(Some(json!({ "PubmedArticleSet": { "PubmedArticle": [
    article("111", "Checkpoint blockade", "Acme Biotherapeutics, Cambridge"),
    article("222", "CAR-T manufacturing", "Globex Pharma, jane@globex.com")
  ]}})));

  let report = Pipeline::new(&search, &fetch).run("cancer immunotherapy").await?;

  assert_eq!(search.calls.get(), 1);
  assert_eq!(search.limit.get(), 20);
  assert_eq!(*fetch.requested.borrow(), vec![vec!["111".to_string(), "222".to_string()]]);
  assert_eq!(report.identifiers, vec!["111", "222"]);
  assert!(report.extraction.failures.is_empty());

  let rows = report.rows();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].pubmed_id, "111");
  assert_eq!(rows[0].non_academic_authors, "Jane Doe");
  assert_eq!(rows[0].company_affiliations, "Acme Biotherapeutics, Cambridge");
  assert_eq!(rows[0].corresponding_email, "ann@uio.no");
  assert_eq!(rows[1].pubmed_id, "222");
  assert_eq!(rows[1].title, "CAR-T manufacturing");
  assert_eq!(rows[1].publication_date, "2024");
  Ok(())
}

#[tokio::test]
async fn test_malformed_record_does_not_abort_run() -> anyhow::Result<()> {
  let search = StubSearch::new(&["1", "2", "3"]);
  let fetch = StubFetch::new(Some(json!({ "PubmedArticleSet": { "PubmedArticle": [
    article("1", "First", "Acme"),
    { "MedlineCitation": { "PMID": "2", "Article": { "AuthorList": "Doe J, Lee A" } } },
    article("3", "Third", "Initech")
  ]}})));

  let report = Pipeline::new(&search, &fetch).run("query").await?;
  let ids: Vec<_> = report.extraction.papers.iter().map(|p| p.id.as_str()).collect();
  assert_eq!(ids, vec!["1", "3"]);
  assert_eq!(report.extraction.failures.len(), 1);
  assert_eq!(report.extraction.failures[0].pmid.as_deref(), Some("2"));
  Ok(())
}

#[tokio::test]
async fn test_empty_search_skips_fetch() -> anyhow::Result<()> {
  let search = StubSearch::new(&[]);
  let fetch = StubFetch::new(None);

  let report = Pipeline::new(&search, &fetch).run("nothing matches this").await?;
  assert!(report.identifiers.is_empty());
  assert!(report.rows().is_empty());
  assert!(fetch.requested.borrow().is_empty());
  Ok(())
}

#[tokio::test]
async fn test_fetch_failure_aborts_run() {
  let search = StubSearch::new(&["111"]);
  let fetch = StubFetch::new(None);

  let err = Pipeline::new(&search, &fetch).run("cancer").await.unwrap_err();
  assert!(err.is_transport());
  assert_eq!(fetch.requested.borrow().len(), 1);
}

#[tokio::test]
async fn test_custom_extractor_and_limit() -> anyhow::Result<()> {
  let search = StubSearch::new(&["1"]);
  let fetch = StubFetch::new(Some(json!({ "PubmedArticleSet": { "PubmedArticle":
    article("1", "Only", "Acme Labs")
  }})));
  let classifier = AffiliationClassifier::new(ClassifierConfig {
    academic_keywords: vec!["labs".into(), "university".into()],
  });

  let report = Pipeline::new(&search, &fetch)
    .with_extractor(BatchExtractor::new(RecordNormalizer::new(classifier)))
    .with_max_results(5)
    .run("q")
    .await?;

  assert_eq!(search.limit.get(), 5);
  assert!(report.extraction.papers[0].non_academic_authors.is_empty());
  Ok(())
}
