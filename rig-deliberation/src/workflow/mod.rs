//! Workflow graph DSL
//!
//! [`WorkflowGraph`] collects vertices and edges, [`WorkflowGraph::build`]
//! validates the topology, and [`CompiledWorkflow`] runs it on the Pregel
//! runtime.

pub mod compiled;
pub mod graph;

pub use compiled::CompiledWorkflow;
pub use graph::{BuiltWorkflowGraph, TopologyError, WorkflowGraph, END, START};
