//! CompiledWorkflow: binds a validated graph to a runtime configuration
//!
//! # Example
//!
//! ```ignore
//! let graph = WorkflowGraph::<DebateState, NodeContext>::new()
//!     .name("standard_debate")
//!     .node(Researcher)
//!     .node(Planner)
//!     .entry("researcher")
//!     .edge("researcher", "planner")
//!     .edge("planner", END)
//!     .build()?;
//!
//! let workflow = CompiledWorkflow::compile(graph, RuntimeConfig::default());
//! let result = workflow.run(initial_state, &ctx).await?;
//! ```

use std::sync::Arc;

use crate::pregel::{render_graph, ExecutionError, PregelRuntime, RuntimeConfig, WorkflowResult, WorkflowState};
use crate::workflow::graph::BuiltWorkflowGraph;

/// A workflow ready to run, shareable across requests
pub struct CompiledWorkflow<S, C>
where
    S: WorkflowState,
    C: Send + Sync + 'static,
{
    runtime: PregelRuntime<S, C>,
}

impl<S, C> CompiledWorkflow<S, C>
where
    S: WorkflowState,
    C: Send + Sync + 'static,
{
    /// Compile a built graph; topology was already validated by `build()`
    pub fn compile(graph: BuiltWorkflowGraph<S, C>, config: RuntimeConfig) -> Self {
        tracing::debug!(
            workflow = %graph.name,
            max_supersteps = config.max_supersteps,
            "Compiling workflow"
        );
        Self {
            runtime: PregelRuntime::new(Arc::new(graph), config),
        }
    }

    /// Run the workflow with the given initial state and request context
    pub async fn run(&self, initial_state: S, ctx: &C) -> Result<WorkflowResult<S>, ExecutionError> {
        self.runtime.run(initial_state, ctx).await
    }

    /// Get the workflow name
    pub fn name(&self) -> &str {
        &self.runtime.graph().name
    }

    pub fn graph(&self) -> &BuiltWorkflowGraph<S, C> {
        self.runtime.graph()
    }

    pub fn config(&self) -> &RuntimeConfig {
        self.runtime.config()
    }

    /// Generate a Mermaid diagram of the workflow
    pub fn to_mermaid(&self) -> String {
        render_graph(self.graph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pregel::testing::{TestVertex, TraceState};
    use crate::workflow::{WorkflowGraph, END};

    fn compiled() -> CompiledWorkflow<TraceState, ()> {
        let graph = WorkflowGraph::new()
            .name("pipeline")
            .node(TestVertex::visit("start"))
            .node(TestVertex::visit("finish"))
            .entry("start")
            .edge("start", "finish")
            .edge("finish", END)
            .build()
            .unwrap();
        CompiledWorkflow::compile(graph, RuntimeConfig::default())
    }

    #[test]
    fn test_workflow_mermaid_generation() {
        let workflow = compiled();
        let mermaid = workflow.to_mermaid();

        assert_eq!(workflow.name(), "pipeline");
        assert!(mermaid.contains("graph TD"));
        assert!(mermaid.contains("start --> finish"));
        assert!(mermaid.contains("finish --> END"));
    }

    #[tokio::test]
    async fn test_compiled_workflow_is_reusable() {
        let workflow = compiled();

        let first = workflow.run(TraceState::default(), &()).await.unwrap();
        let second = workflow.run(TraceState::default(), &()).await.unwrap();

        assert_eq!(first.state, second.state);
        assert_eq!(first.state.visits, vec!["start", "finish"]);
    }
}
