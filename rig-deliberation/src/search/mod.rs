//! Search routing layer
//!
//! - [`quick_classify`] and [`QueryClassifier`] label a query with a
//!   [`QueryCategory`] for telemetry.
//! - [`SearchProvider`] is the `searchProvider(query) -> items` capability,
//!   implemented by [`McpWebSearchProvider`], [`DuckDuckGoProvider`] and
//!   [`TavilyProvider`].
//! - [`SearchRouter`] walks a provider chain per [`SearchStrategy`] and
//!   normalizes the answer into a [`SearchResult`].

pub mod classifier;
pub mod duckduckgo;
pub mod mcp;
pub mod provider;
pub mod router;
pub mod tavily;
pub mod types;

pub use classifier::{quick_classify, Classification, QueryClassifier};
pub use duckduckgo::DuckDuckGoProvider;
pub use mcp::McpWebSearchProvider;
pub use provider::SearchProvider;
pub use router::SearchRouter;
pub use tavily::{SearchDepth, TavilyProvider};
pub use types::{
    ProviderId, QueryCategory, RawSearchItem, SearchItem, SearchResult, SearchStats, SearchStrategy,
};
