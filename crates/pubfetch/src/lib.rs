//! A library for searching PubMed and flagging papers whose authors list
//! non-academic (company) affiliations.
//!
//! The pipeline runs in four steps:
//! 1. search PubMed for identifiers matching a query,
//! 2. fetch the raw citation records for those identifiers in one request,
//! 3. normalize each record into a [`Paper`], classifying every affiliation,
//! 4. project the papers into [`ReportRow`]s for a console table or CSV file.
//!
//! # Example
//! ```rust,no_run
//! use pubfetch::{EntrezClient, EntrezConfig, Pipeline};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!   let client = EntrezClient::new(EntrezConfig::default())?;
//!   let report = Pipeline::new(&client, &client).run("cancer immunotherapy").await?;
//!   for paper in &report.extraction.papers {
//!     println!("{}: {}", paper.id, paper.title);
//!   }
//!   Ok(())
//! }
//! ```

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};
#[cfg(test)] use tracing_test::traced_test;

pub mod classify;
pub mod entrez;
pub mod errors;
pub mod extract;
pub mod normalize;
pub mod paper;
pub mod pipeline;
pub mod raw;
pub mod report;
pub mod xml;

pub use classify::{AffiliationClassifier, ClassifierConfig};
pub use entrez::{EntrezClient, EntrezConfig, FetchService, SearchService};
use errors::PubfetchError;
pub use extract::{BatchExtractor, Extraction, RecordFailure};
pub use normalize::RecordNormalizer;
pub use paper::Paper;
pub use pipeline::{Pipeline, RunReport};
pub use report::{ConsoleSink, CsvSink, ReportRow, Sink};
