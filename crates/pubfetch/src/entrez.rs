//! Client for the NCBI E-utilities search and fetch services.
//!
//! Two endpoints are used:
//! - `esearch.fcgi` (JSON) turns a query into an ordered list of PMIDs
//! - `efetch.fcgi` (XML) returns the full citation records for a list of PMIDs
//!
//! The pipeline only depends on the [`SearchService`] and [`FetchService`]
//! traits, so tests and alternative backends can stand in for the live client.
//!
//! # Examples
//!
//! ```no_run
//! use pubfetch::{EntrezClient, EntrezConfig, FetchService, SearchService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EntrezClient::new(EntrezConfig::default())?;
//! let ids = client.search("cancer immunotherapy", 20).await?;
//! let batch = client.fetch(&ids).await?;
//! println!("{}", batch["PubmedArticleSet"]);
//! # Ok(())
//! # }
//! ```

use url::Url;

use super::*;

/// Default E-utilities location.
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/";

/// Default cap on identifiers returned by one search.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Search endpoint, relative to the base URL.
const ESEARCH: &str = "esearch.fcgi";

/// Fetch endpoint, relative to the base URL.
const EFETCH: &str = "efetch.fcgi";

/// Returns identifiers matching a query.
#[allow(async_fn_in_trait)]
pub trait SearchService {
  /// Searches for at most `max_results` identifiers matching `query`, in relevance order.
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, PubfetchError>;
}

/// Returns raw citation records for identifiers.
#[allow(async_fn_in_trait)]
pub trait FetchService {
  /// Fetches the records for all `ids` in a single call, as a raw tree.
  async fn fetch(&self, ids: &[String]) -> Result<Value, PubfetchError>;
}

/// Settings for [`EntrezClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrezConfig {
  /// Base URL the endpoint names are resolved against
  pub base_url:    String,
  /// Result cap used by the pipeline for each search
  pub max_results: usize,
  /// NCBI API key, raising the request rate limit when set
  pub api_key:     Option<String>,
  /// Tool name NCBI asks clients to send with every request
  pub tool:        String,
}

impl Default for EntrezConfig {
  fn default() -> Self {
    Self {
      base_url:    DEFAULT_BASE_URL.to_string(),
      max_results: DEFAULT_MAX_RESULTS,
      api_key:     None,
      tool:        env!("CARGO_PKG_NAME").to_string(),
    }
  }
}

/// Response body of `esearch.fcgi?retmode=json`.
#[derive(Debug, Deserialize)]
struct ESearchResponse {
  /// Search result, absent on some error responses
  #[serde(default)]
  esearchresult: Option<ESearchResult>,
}

/// The `esearchresult` member of an esearch response.
#[derive(Debug, Deserialize)]
struct ESearchResult {
  /// Matching PMIDs
  #[serde(default)]
  idlist: Vec<String>,
  /// Query error reported by NCBI alongside an empty result
  #[serde(rename = "ERROR")]
  error:  Option<String>,
}

/// Client for the PubMed E-utilities.
pub struct EntrezClient {
  /// Internal web client used to connect to the API.
  client:   reqwest::Client,
  /// Base URL, always ending in `/`
  base_url: Url,
  /// Settings this client was built from
  config:   EntrezConfig,
}

impl EntrezClient {
  /// Creates a client for the configured E-utilities location.
  ///
  /// # Errors
  ///
  /// Returns [`PubfetchError::InvalidUrl`] when `base_url` does not parse, or
  /// [`PubfetchError::Network`] when the HTTP client cannot be built.
  pub fn new(config: EntrezConfig) -> Result<Self, PubfetchError> {
    let mut base_url = config.base_url.clone();
    if !base_url.ends_with('/') {
      base_url.push('/');
    }
    let base_url = Url::parse(&base_url)?;
    let client = reqwest::Client::builder()
      .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, base_url, config })
  }

  /// The settings this client was built from.
  pub fn config(&self) -> &EntrezConfig { &self.config }

  /// Query parameters shared by every request.
  fn common_params(&self) -> Vec<(&'static str, String)> {
    let mut params = vec![("db", "pubmed".to_string()), ("tool", self.config.tool.clone())];
    if let Some(key) = &self.config.api_key {
      params.push(("api_key", key.clone()));
    }
    params
  }

  /// Sends a GET to `endpoint` and returns the body of a successful response.
  async fn get(
    &self,
    endpoint: &str,
    params: Vec<(&'static str, String)>,
  ) -> Result<String, PubfetchError> {
    let url = self.base_url.join(endpoint)?;
    debug!("Requesting {url} with {} parameters", params.len());

    let response = self.client.get(url).query(&params).send().await?;
    let status = response.status();
    debug!("{endpoint} response status: {status}");
    if !status.is_success() {
      return Err(PubfetchError::Status { endpoint: endpoint.to_string(), status });
    }

    let text = response.text().await?;
    trace!("{endpoint} response: {text}");
    Ok(text)
  }
}

impl SearchService for EntrezClient {
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, PubfetchError> {
    let mut params = self.common_params();
    params.push(("term", query.to_string()));
    params.push(("retmode", "json".to_string()));
    params.push(("retmax", max_results.to_string()));

    let text = self.get(ESEARCH, params).await?;
    let response: ESearchResponse = serde_json::from_str(&text)
      .map_err(|e| PubfetchError::ApiError(format!("Failed to parse JSON: {}", e)))?;

    let Some(result) = response.esearchresult else {
      return Ok(Vec::new());
    };
    if let Some(error) = &result.error {
      warn!("PubMed reported a search error for {query:?}: {error}");
    }
    Ok(result.idlist)
  }
}

impl FetchService for EntrezClient {
  async fn fetch(&self, ids: &[String]) -> Result<Value, PubfetchError> {
    let mut params = self.common_params();
    params.push(("id", ids.join(",")));
    params.push(("retmode", "xml".to_string()));

    let text = self.get(EFETCH, params).await?;
    xml::to_value(&text)
  }
}

#[cfg(test)]
mod tests {
  use mockito::{Matcher, Server};

  use super::*;

  fn client(server: &Server) -> EntrezClient {
    EntrezClient::new(EntrezConfig { base_url: server.url(), ..EntrezConfig::default() }).unwrap()
  }

  #[traced_test]
  #[tokio::test]
  async fn test_search_returns_id_list() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/esearch.fcgi")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("db".into(), "pubmed".into()),
        Matcher::UrlEncoded("term".into(), "cancer immunotherapy".into()),
        Matcher::UrlEncoded("retmode".into(), "json".into()),
        Matcher::UrlEncoded("retmax".into(), "20".into()),
      ]))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"header":{},"esearchresult":{"count":"2","idlist":["111","222"]}}"#)
      .create_async()
      .await;

    let ids = client(&server).search("cancer immunotherapy", 20).await.unwrap();
    assert_eq!(ids, vec!["111", "222"]);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_search_without_result_is_empty() {
    let mut server = Server::new_async().await;
    let _invalid = server
      .mock("GET", "/esearch.fcgi")
      .match_query(Matcher::UrlEncoded("term".into(), "((".into()))
      .with_status(200)
      .with_body(r#"{"esearchresult":{"idlist":[],"ERROR":"Invalid query"}}"#)
      .create_async()
      .await;
    assert!(client(&server).search("((", 5).await.unwrap().is_empty());

    let _bare = server
      .mock("GET", "/esearch.fcgi")
      .match_query(Matcher::UrlEncoded("term".into(), "anything".into()))
      .with_status(200)
      .with_body("{}")
      .create_async()
      .await;
    assert!(client(&server).search("anything", 5).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_non_success_status_is_transport_error() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("GET", "/esearch.fcgi")
      .match_query(Matcher::Any)
      .with_status(429)
      .create_async()
      .await;

    let err = client(&server).search("cancer", 20).await.unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(
      err,
      PubfetchError::Status { ref endpoint, status }
        if endpoint == "esearch.fcgi" && status == reqwest::StatusCode::TOO_MANY_REQUESTS
    ));
  }

  #[tokio::test]
  async fn test_invalid_json_is_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("GET", "/esearch.fcgi")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body("<html>maintenance</html>")
      .create_async()
      .await;

    let err = client(&server).search("cancer", 20).await.unwrap_err();
    assert!(matches!(err, PubfetchError::ApiError(_)));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_fetch_converts_xml() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/efetch.fcgi")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("id".into(), "111,222".into()),
        Matcher::UrlEncoded("retmode".into(), "xml".into()),
        Matcher::UrlEncoded("api_key".into(), "secret".into()),
      ]))
      .with_status(200)
      .with_header("content-type", "text/xml")
      .with_body(
        r#"<PubmedArticleSet>
  <PubmedArticle><MedlineCitation><PMID Version="1">111</PMID></MedlineCitation></PubmedArticle>
  <PubmedArticle><MedlineCitation><PMID Version="1">222</PMID></MedlineCitation></PubmedArticle>
</PubmedArticleSet>"#,
      )
      .create_async()
      .await;

    let client = EntrezClient::new(EntrezConfig {
      base_url: format!("{}/", server.url()),
      api_key: Some("secret".into()),
      ..EntrezConfig::default()
    })
    .unwrap();
    let batch = client.fetch(&["111".to_string(), "222".to_string()]).await.unwrap();

    let articles = batch["PubmedArticleSet"]["PubmedArticle"].as_array().unwrap();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0]["MedlineCitation"]["PMID"]["$text"], "111");
    mock.assert_async().await;
  }

  #[test]
  fn test_invalid_base_url() {
    let result = EntrezClient::new(EntrezConfig {
      base_url: "not a url".into(),
      ..EntrezConfig::default()
    });
    assert!(matches!(result, Err(PubfetchError::InvalidUrl(_))));
  }
}
