//! DuckDuckGo HTML search
//!
//! DuckDuckGo has no free web search API, so the secondary provider scrapes
//! the HTML endpoint. Parsing tries result anchors first (title, link and
//! snippet), then falls back to bare `uddg=` redirect links.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::provider::{status_error, SearchProvider, DEFAULT_PROVIDER_TIMEOUT};
use super::types::{ProviderId, RawSearchItem};
use crate::error::SearchError;

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Keyword-scrape provider over DuckDuckGo's HTML endpoint
pub struct DuckDuckGoProvider {
    client: Client,
    base_url: String,
    max_results: usize,
    timeout: Duration,
}

impl DuckDuckGoProvider {
    pub fn new(max_results: usize) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Point at another host, e.g. a mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parse DuckDuckGo HTML into items.
    fn parse_html(&self, html: &str) -> Vec<RawSearchItem> {
        let mut results = Vec::new();
        let mut seen_urls = HashSet::new();

        // Strategy 1: result anchors carry a title and, nearby, a snippet
        for segment in html.split("class=\"result__a\"").skip(1) {
            if results.len() >= self.max_results {
                break;
            }
            let Some(url) = attribute(segment, "href=\"").and_then(resolve_link) else {
                continue;
            };
            if !seen_urls.insert(url.clone()) {
                continue;
            }
            let title = segment
                .find('>')
                .and_then(|start| {
                    let rest = &segment[start + 1..];
                    rest.find("</a>").map(|end| strip_tags(&rest[..end]))
                })
                .filter(|t| !t.is_empty())
                .or_else(|| extract_domain(&url))
                .unwrap_or_else(|| "Result".to_string());
            let description = segment
                .split("class=\"result__snippet\"")
                .nth(1)
                .and_then(|s| {
                    let rest = &s[s.find('>')? + 1..];
                    rest.find("</a>")
                        .or_else(|| rest.find("</div>"))
                        .map(|end| strip_tags(&rest[..end]))
                })
                .unwrap_or_default();

            results.push(RawSearchItem::new(title, url, description));
        }

        // Strategy 2: any redirect link with the uddg parameter
        if results.len() < self.max_results {
            for segment in html.split("uddg=").skip(1) {
                if results.len() >= self.max_results {
                    break;
                }
                if let Some(end) = segment.find(['&', '"', '\'']) {
                    if let Ok(url) = urlencoding::decode(&segment[..end]) {
                        let url = url.to_string();
                        if url.starts_with("http")
                            && !url.contains("duckduckgo.com")
                            && seen_urls.insert(url.clone())
                        {
                            results.push(RawSearchItem::new(
                                extract_domain(&url).unwrap_or_else(|| "Result".to_string()),
                                url,
                                "Search result from DuckDuckGo",
                            ));
                        }
                    }
                }
            }
        }

        results.into_iter().take(self.max_results).collect()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::DuckDuckGo
    }

    async fn search(&self, query: &str) -> Result<Vec<RawSearchItem>, SearchError> {
        info!(query = %query, "Performing DuckDuckGo search");

        let url = format!("{}?q={}", self.base_url, urlencoding::encode(query));
        debug!(url = %url, "Fetching search results");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        let body = response.text().await?;
        let results = self.parse_html(&body);

        if results.is_empty() {
            warn!(query = %query, "No search results found");
        } else {
            info!(query = %query, count = results.len(), "Search completed");
        }
        Ok(results)
    }
}

/// Value of the first `marker"..."` attribute in `segment`
fn attribute<'a>(segment: &'a str, marker: &str) -> Option<&'a str> {
    let start = segment.find(marker)? + marker.len();
    let rest = &segment[start..];
    rest.find('"').map(|end| &rest[..end])
}

/// Turn an anchor href into an absolute target URL
fn resolve_link(href: &str) -> Option<String> {
    let href = href.replace("&amp;", "&");
    if let Some(idx) = href.find("uddg=") {
        let encoded = &href[idx + 5..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        return urlencoding::decode(encoded).ok().map(|u| u.into_owned());
    }
    if href.starts_with("//") {
        return Some(format!("https:{}", href));
    }
    href.starts_with("http").then_some(href)
}

fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&amp;", "&")
        .replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the domain name from a URL.
fn extract_domain(url: &str) -> Option<String> {
    url.split("//")
        .nth(1)?
        .split('/')
        .next()
        .map(|s| s.to_string())
}
