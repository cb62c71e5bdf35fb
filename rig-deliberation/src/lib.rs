//! rig-deliberation: graph-driven debate workflows for Rig
//!
//! A question runs through a directed graph of async nodes that share one
//! state record: research, two opposing personas, rebuttals and a judge.
//! - Pregel-style runtime: supersteps, fan-out/fan-in, conditional edges
//! - Workflow builder with construction-time topology checks
//! - Search router with keyword/model classification and provider fallback
//! - Retry executor with exponential backoff and jitter
//! - RigModelClient: any Rig `Agent` as the model boundary
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rig_deliberation::{
//!     DebateRequest, DebateSettings, Deliberation, DuckDuckGoProvider,
//!     McpWebSearchProvider, RigModelClient, SearchRouter,
//! };
//!
//! let model = Arc::new(RigModelClient::new(agent));
//! let router = SearchRouter::new(
//!     Arc::new(McpWebSearchProvider::new(url, Some(key))),
//!     Arc::new(DuckDuckGoProvider::new(10)),
//! );
//! let service = Deliberation::new(model, Arc::new(router), DebateSettings::default())?;
//! let outcome = service.run(DebateRequest::new("什么是ETF")).await?;
//! println!("{:?}: {}", outcome.debate_winner, outcome.debate_summary);
//! ```

pub mod compat;
pub mod config;
pub mod debate;
pub mod error;
pub mod llm;
pub mod pregel;
pub mod retry;
pub mod search;
pub mod workflow;

// Re-exports for convenience
pub use compat::RigModelClient;
pub use config::DebateSettings;
pub use debate::{
    DebateOutcome, DebateRequest, DebateState, DeepResearchConfig, Deliberation, NodeContext, Topology, Winner,
};
pub use error::{DeliberationError, ErrorBody, InputError, ModelError, ParseError, SearchError};
pub use llm::{extract_structured, ModelClient, ModelConfig, ModelResponse, OpenAiCompatClient};
pub use retry::{with_retry, with_retry_if, RetryError, RetryPolicy};
pub use search::{
    quick_classify, DuckDuckGoProvider, McpWebSearchProvider, QueryCategory, SearchProvider, SearchResult,
    SearchRouter, SearchStrategy, TavilyProvider,
};
pub use workflow::{CompiledWorkflow, TopologyError, WorkflowGraph};
