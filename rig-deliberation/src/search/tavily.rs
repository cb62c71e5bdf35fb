//! Tavily Search (premium provider)
//!
//! Requires `TAVILY_API_KEY`. The router only builds a premium chain when
//! a provider with a credential is configured.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::provider::{status_error, SearchProvider, DEFAULT_PROVIDER_TIMEOUT};
use super::types::{ProviderId, RawSearchItem};
use crate::error::SearchError;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Search depth for Tavily API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// Fast search with basic results
    #[default]
    Basic,
    /// More thorough search with detailed results
    Advanced,
}

/// Request body for Tavily API
#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: SearchDepth,
    include_answer: bool,
}

/// Response from Tavily API
#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    /// Extracted content/snippet
    #[serde(default)]
    content: String,
}

pub struct TavilyProvider {
    api_key: String,
    client: Client,
    base_url: String,
    max_results: u32,
    search_depth: SearchDepth,
    timeout: Duration,
}

impl TavilyProvider {
    /// Create a provider with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: 5,
            search_depth: SearchDepth::default(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Create from environment variable TAVILY_API_KEY
    pub fn from_env() -> Result<Self, SearchError> {
        match std::env::var("TAVILY_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(SearchError::MissingCredential("TAVILY_API_KEY")),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(1, 20);
        self
    }

    pub fn with_search_depth(mut self, depth: SearchDepth) -> Self {
        self.search_depth = depth;
        self
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Tavily
    }

    async fn search(&self, query: &str) -> Result<Vec<RawSearchItem>, SearchError> {
        let request = TavilyRequest {
            query,
            max_results: self.max_results,
            search_depth: self.search_depth,
            include_answer: false,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), error_text));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;
        debug!(query = %query, count = parsed.results.len(), "Tavily search completed");

        Ok(parsed
            .results
            .into_iter()
            .map(|r| RawSearchItem::new(r.title, r.url, r.content))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_max_results_clamped() {
        assert_eq!(TavilyProvider::new("k").with_max_results(100).max_results, 20);
        assert_eq!(TavilyProvider::new("k").with_max_results(0).max_results, 1);
    }

    #[test]
    fn test_depth_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SearchDepth::Advanced).unwrap(), "\"advanced\"");
    }

    #[tokio::test]
    async fn test_search_maps_content_to_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tvly-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"title": "T", "url": "https://t.test", "content": "body", "score": 0.9}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = TavilyProvider::new("tvly-key").with_base_url(server.uri());
        let items = provider.search("q").await.unwrap();

        assert_eq!(items, vec![RawSearchItem::new("T", "https://t.test", "body")]);
    }

    #[tokio::test]
    async fn test_unauthorized_not_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = TavilyProvider::new("bad").with_base_url(server.uri());
        let err = provider.search("q").await.unwrap_err();

        assert!(matches!(err, SearchError::Unauthorized));
        assert!(!err.is_retryable());
    }
}
