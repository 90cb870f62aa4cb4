//! Web search against the DuckDuckGo Instant Answer API.
//!
//! Only the "abstract" summary the API returns is surfaced, so a query yields
//! zero or one result.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DUCKDUCKGO_ENDPOINT: &str = "https://api.duckduckgo.com";
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

/// A single web search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Search API returned {0}")]
    Status(StatusCode),

    #[error("Could not decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Looks up a query on the web. Implementations never fail: upstream problems
/// degrade to an empty result list.
#[async_trait]
pub trait Search: Send + Sync {
    async fn search(&self, query: &str) -> Vec<SearchResult>;
}

#[derive(Debug, Clone)]
pub struct DuckDuckGoConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            endpoint: DUCKDUCKGO_ENDPOINT.to_string(),
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct InstantAnswerQuery<'a> {
    q: &'a str,
    format: &'static str,
    no_html: u8,
    skip_disambig: u8,
}

impl<'a> InstantAnswerQuery<'a> {
    fn new(q: &'a str) -> Self {
        Self {
            q,
            format: "json",
            no_html: 1,
            skip_disambig: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(default, rename = "Heading")]
    heading: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default, rename = "Abstract")]
    summary: String,
}

pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(config: DuckDuckGoConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SearchError::Request)?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
        })
    }

    /// Run the query and report upstream failures instead of hiding them
    pub async fn try_search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&InstantAnswerQuery::new(query))
            .send()
            .await
            .map_err(SearchError::Request)?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status()));
        }

        // DuckDuckGo answers with application/x-javascript, so decode regardless of content type
        let bytes = response.bytes().await.map_err(SearchError::Request)?;
        let answer: InstantAnswer = serde_json::from_slice(&bytes)?;

        if answer.summary.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![SearchResult {
            title: answer.heading,
            url: answer.abstract_url,
            description: answer.summary,
        }])
    }
}

#[async_trait]
impl Search for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        match self.try_search(query).await {
            Ok(results) => {
                tracing::debug!(query, results = results.len(), "Search finished");
                results
            }
            Err(e) => {
                tracing::warn!(query, "Error in DuckDuckGo search: {}", e);
                Vec::new()
            }
        }
    }
}
