//! Research-backed debate workflow
//!
//! A question is researched, argued by an optimistic and a pessimistic
//! persona, rebutted by each, and judged. [`Deliberation`] is the entry point;
//! the pieces below it are public so callers can assemble their own
//! topologies from the same nodes.

pub mod context;
pub mod nodes;
pub mod prompts;
pub mod service;
pub mod state;
pub mod workflow;

pub use context::NodeContext;
pub use service::{DebateOutcome, DebateRequest, DeepResearchConfig, Deliberation};
pub use state::{
    DataPoint, DebateState, DebateUpdate, Finding, ResearchSummary, Side, SubTask, SubTaskStatus, Winner,
};
pub use workflow::{debate_route, deep_research_debate, looping_debate, research_route, standard_debate, DebateGraph, Topology};
