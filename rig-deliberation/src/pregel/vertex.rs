//! Vertex (Node) abstractions for the Pregel runtime
//!
//! A vertex is one asynchronous step of a workflow: it reads the shared state
//! and returns a partial update. Vertices never mutate state directly; the
//! runtime merges their updates at the end of each superstep.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::state::WorkflowState;

/// Unique identifier for a vertex in the workflow graph
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub String);

impl VertexId {
    /// Create a new VertexId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for state updates produced by vertex computation
///
/// State updates are collected from all vertices and merged at the end of each superstep.
pub trait StateUpdate: Clone + Send + Sync + 'static {
    /// Create an empty (no-op) update
    fn empty() -> Self;

    /// Check if this update has no effect
    fn is_empty(&self) -> bool;

    /// Names of the state fields this update overwrites
    fn written_fields(&self) -> Vec<&'static str>;
}

/// A computation step in the workflow graph
///
/// `C` is the per-run context (model handle, search router, settings) passed
/// explicitly into every computation.
///
/// # Field ownership
///
/// `output_fields` declares every state field the vertex may write. Vertices
/// dispatched in the same superstep must declare disjoint fields; graph
/// construction rejects overlaps.
#[async_trait]
pub trait Vertex<S, C>: Send + Sync
where
    S: WorkflowState,
    C: Send + Sync,
{
    /// Stable identifier used by edges
    fn id(&self) -> &VertexId;

    /// Fields this vertex may write
    fn output_fields(&self) -> &'static [&'static str];

    /// Run the step against the merged state
    ///
    /// Implementations recover from their own external failures and return a
    /// degraded update instead of failing.
    async fn compute(&self, state: &S, ctx: &C) -> S::Update;

    /// Update applied when `compute` exceeds the runtime's vertex timeout
    fn fallback(&self, _state: &S) -> S::Update {
        S::Update::empty()
    }
}

/// Shared vertex handle
pub type BoxedVertex<S, C> = Arc<dyn Vertex<S, C>>;
