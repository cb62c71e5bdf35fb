//! Search data types shared by providers, the router and debate nodes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Topic category of a query, used for routing telemetry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    #[default]
    General,
    FinanceNews,
    FinanceData,
    Encyclopedia,
    Academic,
    Government,
    Community,
}

impl QueryCategory {
    pub const ALL: [QueryCategory; 7] = [
        QueryCategory::General,
        QueryCategory::FinanceNews,
        QueryCategory::FinanceData,
        QueryCategory::Encyclopedia,
        QueryCategory::Academic,
        QueryCategory::Government,
        QueryCategory::Community,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryCategory::General => "general",
            QueryCategory::FinanceNews => "finance_news",
            QueryCategory::FinanceData => "finance_data",
            QueryCategory::Encyclopedia => "encyclopedia",
            QueryCategory::Academic => "academic",
            QueryCategory::Government => "government",
            QueryCategory::Community => "community",
        }
    }

    /// One-line description offered to the model classifier
    pub fn description(&self) -> &'static str {
        match self {
            QueryCategory::General => "general knowledge, e.g. how to learn programming",
            QueryCategory::FinanceNews => "financial news and announcements, e.g. a rate decision",
            QueryCategory::FinanceData => "quotes and market data, e.g. a stock price or fund NAV",
            QueryCategory::Encyclopedia => "definitions and concepts, e.g. what is an ETF",
            QueryCategory::Academic => "papers, models and empirical research",
            QueryCategory::Government => "official statistics, policy and regulation",
            QueryCategory::Community => "opinions and community discussion",
        }
    }
}

impl fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        QueryCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown query category: {}", s))
    }
}

/// Concrete search backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderId {
    /// Primary provider, MCP-style web search endpoint
    #[serde(rename = "mcp_websearch")]
    McpWebSearch,
    /// Secondary provider, keyword scrape of DuckDuckGo HTML
    #[serde(rename = "duckduckgo")]
    DuckDuckGo,
    /// Premium provider, needs a credential
    #[serde(rename = "tavily")]
    Tavily,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::McpWebSearch => "mcp_websearch",
            ProviderId::DuckDuckGo => "duckduckgo",
            ProviderId::Tavily => "tavily",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing policy selected per request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Primary provider, then secondary on failure or empty result
    #[default]
    Smart,
    /// Secondary provider only
    #[serde(rename = "duckduckgo")]
    DuckDuckGo,
    /// Premium provider; behaves like `Smart` without a credential
    Tavily,
    /// Primary provider with secondary fallback
    #[serde(rename = "mcp-websearch")]
    McpWebSearch,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::Smart => "smart",
            SearchStrategy::DuckDuckGo => "duckduckgo",
            SearchStrategy::Tavily => "tavily",
            SearchStrategy::McpWebSearch => "mcp-websearch",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smart" => Ok(SearchStrategy::Smart),
            "duckduckgo" | "ddg" => Ok(SearchStrategy::DuckDuckGo),
            "tavily" => Ok(SearchStrategy::Tavily),
            "mcp-websearch" | "mcp_websearch" | "mcp" => Ok(SearchStrategy::McpWebSearch),
            other => Err(format!("unknown search strategy: {}", other)),
        }
    }
}

/// An item as returned by a provider, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchItem {
    pub title: String,
    pub url: String,
    pub description: String,
}

impl RawSearchItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: description.into(),
        }
    }
}

/// Normalized item; `position` is 1-based in provider order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub url: String,
    pub description: String,
    pub position: usize,
}

impl SearchItem {
    pub fn from_raw(items: Vec<RawSearchItem>) -> Vec<SearchItem> {
        items
            .into_iter()
            .enumerate()
            .map(|(i, raw)| SearchItem {
                title: raw.title,
                url: raw.url,
                description: raw.description,
                position: i + 1,
            })
            .collect()
    }
}

/// Outcome of routing one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub query: String,
    /// Provider that served the query, or the last one attempted on failure
    pub provider: ProviderId,
    pub items: Vec<SearchItem>,
    /// Classification outcome and serving provider, for observability
    pub reasoning: String,
    /// True when no provider returned items and the last one in the chain failed
    #[serde(default)]
    pub error: bool,
    pub category: QueryCategory,
    pub strategy: SearchStrategy,
    pub timestamp: DateTime<Utc>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn urls(&self) -> Vec<String> {
        self.items.iter().map(|i| i.url.clone()).collect()
    }
}

/// Aggregate counters over a batch of results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub total: usize,
    pub by_engine: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub total_results: usize,
    pub errors: usize,
}

impl SearchStats {
    pub fn from_results(results: &[SearchResult]) -> Self {
        let mut stats = SearchStats {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            *stats.by_engine.entry(result.provider.to_string()).or_default() += 1;
            *stats.by_category.entry(result.category.to_string()).or_default() += 1;
            stats.total_results += result.items.len();
            if result.error {
                stats.errors += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(provider: ProviderId, category: QueryCategory, items: usize, error: bool) -> SearchResult {
        SearchResult {
            query: "q".into(),
            provider,
            items: SearchItem::from_raw(vec![RawSearchItem::new("t", "https://x.test", "d"); items]),
            reasoning: String::new(),
            error,
            category,
            strategy: SearchStrategy::Smart,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_category_round_trip_names() {
        for category in QueryCategory::ALL {
            assert_eq!(category.as_str().parse::<QueryCategory>(), Ok(category));
        }
        assert!("stocks".parse::<QueryCategory>().is_err());
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&QueryCategory::FinanceData).unwrap();
        assert_eq!(json, "\"finance_data\"");
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("smart".parse::<SearchStrategy>(), Ok(SearchStrategy::Smart));
        assert_eq!("DuckDuckGo".parse::<SearchStrategy>(), Ok(SearchStrategy::DuckDuckGo));
        assert_eq!("mcp".parse::<SearchStrategy>(), Ok(SearchStrategy::McpWebSearch));
        assert!("bing".parse::<SearchStrategy>().is_err());
        assert_eq!(SearchStrategy::default(), SearchStrategy::Smart);
    }

    #[test]
    fn test_positions_are_one_based() {
        let items = SearchItem::from_raw(vec![
            RawSearchItem::new("a", "https://a.test", ""),
            RawSearchItem::new("b", "https://b.test", ""),
        ]);
        assert_eq!(items[0].position, 1);
        assert_eq!(items[1].position, 2);
    }

    #[test]
    fn test_stats_from_results() {
        let results = vec![
            result(ProviderId::McpWebSearch, QueryCategory::General, 3, false),
            result(ProviderId::DuckDuckGo, QueryCategory::General, 2, false),
            result(ProviderId::DuckDuckGo, QueryCategory::Academic, 0, true),
        ];

        let stats = SearchStats::from_results(&results);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.total_results, 5);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.by_engine.get("duckduckgo"), Some(&2));
        assert_eq!(stats.by_category.get("general"), Some(&2));
    }
}
