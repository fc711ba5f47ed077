//! Search-results provider trait and the SerpAPI implementation.

use async_trait::async_trait;
use prospector_core::{Error, Result};
use serde::Deserialize;
use tracing::debug;

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// A search request against the results provider.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// Locality the engine should localize results to.
    pub location: String,
    /// Result-count cap.
    pub limit: usize,
}

/// An organic (web) result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub link: String,
}

/// A local-business (map pack) result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub address: String,
}

/// Everything the context resolver reads from one search.
#[derive(Debug, Clone, Default)]
pub struct SearchResultSet {
    pub organic: Vec<OrganicResult>,
    pub local: Vec<LocalResult>,
    /// "Related searches" suggestions.
    pub related: Vec<String>,
}

/// Trait for search-results providers.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a single search.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResultSet>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}

/// SerpAPI-backed provider (Google results).
pub struct SerpApiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    /// Two-letter country passed as `gl`.
    country: String,
}

impl SerpApiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: SERPAPI_URL.to_string(),
            country: "us".to_string(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into().to_lowercase();
        self
    }
}

#[derive(Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    local_results: Option<LocalResults>,
    #[serde(default)]
    related_searches: Vec<RelatedSearch>,
    #[serde(default)]
    error: Option<String>,
}

/// SerpAPI returns local results either wrapped in `places` or as a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum LocalResults {
    Places { places: Vec<LocalResult> },
    List(Vec<LocalResult>),
}

#[derive(Deserialize)]
struct RelatedSearch {
    #[serde(default)]
    query: String,
}

impl SerpResponse {
    fn into_result_set(self) -> Result<SearchResultSet> {
        if let Some(error) = self.error {
            return Err(Error::ProviderUnavailable(format!("SerpAPI: {}", error)));
        }

        let local = match self.local_results {
            Some(LocalResults::Places { places }) => places,
            Some(LocalResults::List(list)) => list,
            None => Vec::new(),
        };

        Ok(SearchResultSet {
            organic: self.organic_results,
            local,
            related: self
                .related_searches
                .into_iter()
                .map(|r| r.query)
                .filter(|q| !q.trim().is_empty())
                .collect(),
        })
    }
}

/// Decode a raw SerpAPI JSON body.
pub fn parse_serp_response(body: &str) -> Result<SearchResultSet> {
    let response: SerpResponse = serde_json::from_str(body)
        .map_err(|e| Error::MalformedOutput(format!("SerpAPI payload: {}", e)))?;
    response.into_result_set()
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResultSet> {
        debug!("SerpAPI search: {:?} ({})", request.query, request.location);

        let limit = request.limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("q", request.query.as_str()),
                ("location", request.location.as_str()),
                ("num", limit.as_str()),
                ("gl", self.country.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::ProviderUnavailable(format!("SerpAPI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ProviderUnavailable(format!(
                "SerpAPI returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ProviderUnavailable(format!("SerpAPI read failed: {}", e)))?;

        parse_serp_response(&body)
    }

    fn name(&self) -> &str {
        "serpapi"
    }
}
