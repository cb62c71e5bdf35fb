//! MCP-style web search endpoint (primary provider)
//!
//! Request: `POST {base_url}` with `{query, top_n, recency_days}` and a bearer
//! credential. Response: `{results: [{title, link, snippet}]}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::provider::{status_error, SearchProvider, DEFAULT_PROVIDER_TIMEOUT};
use super::types::{ProviderId, RawSearchItem};
use crate::error::SearchError;

pub const DEFAULT_TOP_N: u32 = 10;
pub const DEFAULT_RECENCY_DAYS: u32 = 30;

#[derive(Debug, Serialize)]
struct McpSearchRequest<'a> {
    query: &'a str,
    top_n: u32,
    recency_days: u32,
}

#[derive(Debug, Deserialize)]
struct McpSearchResponse {
    #[serde(default)]
    results: Vec<McpSearchItem>,
}

#[derive(Debug, Deserialize)]
struct McpSearchItem {
    #[serde(default)]
    title: String,
    #[serde(default, alias = "url")]
    link: String,
    #[serde(default, alias = "description")]
    snippet: String,
}

/// Primary web search provider
#[derive(Clone)]
pub struct McpWebSearchProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    top_n: u32,
    recency_days: u32,
    timeout: Duration,
}

impl McpWebSearchProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            top_n: DEFAULT_TOP_N,
            recency_days: DEFAULT_RECENCY_DAYS,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_top_n(mut self, top_n: u32) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_recency_days(mut self, days: u32) -> Self {
        self.recency_days = days;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a query with request-specific limits
    pub async fn search_with(
        &self,
        query: &str,
        top_n: u32,
        recency_days: u32,
    ) -> Result<Vec<RawSearchItem>, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SearchError::MissingCredential("MCP_WEBSEARCH_API_KEY"))?;

        info!(query = %query, top_n, recency_days, "Starting MCP web search");
        let request = McpSearchRequest {
            query,
            top_n,
            recency_days,
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        let parsed: McpSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        debug!(count = parsed.results.len(), "MCP web search completed");
        Ok(parsed
            .results
            .into_iter()
            .map(|item| RawSearchItem::new(item.title, item.link, item.snippet))
            .collect())
    }
}

#[async_trait]
impl SearchProvider for McpWebSearchProvider {
    fn id(&self) -> ProviderId {
        ProviderId::McpWebSearch
    }

    async fn search(&self, query: &str) -> Result<Vec<RawSearchItem>, SearchError> {
        self.search_with(query, self.top_n, self.recency_days).await
    }
}
