//! Error types for the pubfetch library.
//!
//! Failures fall into two groups:
//! - transport failures while talking to the E-utilities services, which abort a run
//! - record shape failures for a single raw citation, which the batch extractor isolates
//!
//! # Examples
//!
//! ```no_run
//! use pubfetch::{errors::PubfetchError, EntrezClient, EntrezConfig, SearchService};
//!
//! # async fn example() -> Result<(), PubfetchError> {
//! let client = EntrezClient::new(EntrezConfig::default())?;
//! match client.search("cancer immunotherapy", 20).await {
//!   Ok(ids) => println!("Found {} ids", ids.len()),
//!   Err(e) if e.is_transport() => println!("PubMed unavailable: {}", e),
//!   Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Errors that can occur while searching, fetching, extracting or reporting papers.
#[derive(Error, Debug)]
pub enum PubfetchError {
  /// A network request failed.
  ///
  /// This can occur when:
  /// - The network is unavailable
  /// - The server is unreachable
  /// - The request times out
  /// - TLS/SSL errors occur
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A service answered with a non-success HTTP status.
  #[error("{endpoint} returned HTTP {status}")]
  Status {
    /// The E-utilities endpoint that was called (e.g. `esearch.fcgi`)
    endpoint: String,
    /// The status code of the response
    status:   reqwest::StatusCode,
  },

  /// A service returned a body that could not be parsed.
  ///
  /// The string parameter carries the parser message for debugging.
  #[error("API error: {0}")]
  ApiError(String),

  /// The configured service base URL is invalid.
  #[error(transparent)]
  InvalidUrl(#[from] url::ParseError),

  /// A single raw record does not have the shape the normalizer expects.
  ///
  /// The string parameter names the offending path within the record.
  #[error("Malformed record: {0}")]
  RecordShape(String),

  /// Writing a CSV report failed.
  #[error(transparent)]
  Csv(#[from] csv::Error),

  /// A file system or terminal write failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl PubfetchError {
  /// Checks if this error came from one of the remote services.
  ///
  /// Transport errors are fatal to a run: the caller never receives a partial
  /// report when the identifier search or the batch fetch fails.
  pub fn is_transport(&self) -> bool {
    matches!(
      self,
      PubfetchError::Network(_) | PubfetchError::Status { .. } | PubfetchError::ApiError(_)
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_transport_classification() {
    let status = PubfetchError::Status {
      endpoint: "esearch.fcgi".into(),
      status:   reqwest::StatusCode::BAD_GATEWAY,
    };
    assert!(status.is_transport());
    assert_eq!(status.to_string(), "esearch.fcgi returned HTTP 502 Bad Gateway");

    assert!(PubfetchError::ApiError("bad xml".into()).is_transport());
    assert!(!PubfetchError::RecordShape("AuthorList".into()).is_transport());
  }
}
