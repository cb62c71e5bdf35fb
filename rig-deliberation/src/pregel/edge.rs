//! Edge primitives: targets, routes and conditional edges

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::vertex::VertexId;

/// Where control goes after a vertex
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Vertex(VertexId),
    End,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Vertex(id) => write!(f, "{}", id),
            Target::End => write!(f, "END"),
        }
    }
}

/// Outcome of a conditional edge predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Continue,
    Complete,
}

/// Pure predicate over the merged state
pub type RoutePredicate<S> = Arc<dyn Fn(&S) -> Route + Send + Sync>;

/// One labelled branch of a conditional edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub label: String,
    pub target: Target,
}

/// Two-way edge evaluated after the source vertex's update is merged
#[derive(Clone)]
pub struct ConditionalEdge<S> {
    pub predicate: RoutePredicate<S>,
    pub on_continue: Branch,
    pub on_complete: Branch,
}

impl<S> ConditionalEdge<S> {
    /// Pick the branch for the current state
    pub fn select(&self, state: &S) -> (Route, &Branch) {
        match (self.predicate)(state) {
            Route::Continue => (Route::Continue, &self.on_continue),
            Route::Complete => (Route::Complete, &self.on_complete),
        }
    }

    pub fn branches(&self) -> [&Branch; 2] {
        [&self.on_continue, &self.on_complete]
    }
}

impl<S> fmt::Debug for ConditionalEdge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalEdge")
            .field("on_continue", &self.on_continue)
            .field("on_complete", &self.on_complete)
            .finish()
    }
}
