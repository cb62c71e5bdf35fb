//! Pregel Runtime for graph-based debate orchestration
//!
//! Key concepts:
//!
//! - **Vertex**: Computation unit (one debate stage)
//! - **Edge**: Connection between vertices (Direct, Fan-in, Conditional)
//! - **Superstep**: Synchronized execution phase
//! - **Update**: Partial state written by one vertex
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PregelRuntime                            │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐                      │
//! │  │Superstep│→ │Superstep│→ │Superstep│→ ...                 │
//! │  │    0    │  │    1    │  │    2    │                      │
//! │  └─────────┘  └─────────┘  └─────────┘                      │
//! │       │            │            │                           │
//! │       ▼            ▼            ▼                           │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │     Per-Superstep: Compute → Merge → Route          │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod edge;
pub mod error;
pub mod runtime;
pub mod state;
pub mod vertex;
pub mod visualization;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use config::RuntimeConfig;
pub use edge::{Branch, ConditionalEdge, Route, RoutePredicate, Target};
pub use error::ExecutionError;
pub use runtime::{PregelRuntime, WorkflowResult};
pub use state::WorkflowState;
pub use vertex::{BoxedVertex, StateUpdate, Vertex, VertexId};
pub use visualization::{render_edge, render_graph, render_node, render_trace, sanitize_id, NodeShape};
