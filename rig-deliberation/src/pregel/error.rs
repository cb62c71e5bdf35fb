//! Error types for the Pregel runtime
//!
//! Vertices recover from their own failures, so these errors only signal
//! defects in the graph or its bounds.

use std::time::Duration;
use thiserror::Error;

use super::vertex::VertexId;

/// Errors that can occur during workflow execution
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Maximum supersteps exceeded
    #[error("Max supersteps exceeded: {0}")]
    MaxSuperstepsExceeded(usize),

    /// Workflow exceeded its total time budget
    #[error("Workflow timeout after {0:?}")]
    WorkflowTimeout(Duration),

    /// A fan-in vertex was left waiting on sources that never ran
    #[error("Fan-in vertex {vertex} never received {missing:?}")]
    UnsatisfiedJoin {
        vertex: VertexId,
        missing: Vec<VertexId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_send_sync() {
        static_assertions::assert_impl_all!(ExecutionError: Send, Sync);
    }

    #[test]
    fn test_error_display() {
        let err = ExecutionError::UnsatisfiedJoin {
            vertex: VertexId::from("join"),
            missing: vec![VertexId::from("left")],
        };
        assert!(err.to_string().contains("join"));
        assert!(err.to_string().contains("left"));
        assert_eq!(
            ExecutionError::MaxSuperstepsExceeded(10).to_string(),
            "Max supersteps exceeded: 10"
        );
    }
}
