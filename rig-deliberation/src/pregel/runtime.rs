//! Pregel Runtime - Core execution engine for workflow graphs
//!
//! The runtime executes a built graph through synchronized supersteps.
//! Each superstep follows the sequence: Compute → Merge → Route.
//!
//! - **Compute**: every vertex in the frontier runs concurrently against the
//!   same snapshot of the state.
//! - **Merge**: updates are applied in vertex declaration order, so a field
//!   written twice keeps the later-declared vertex's value.
//! - **Route**: direct edges, fan-in joins and conditional edges are evaluated
//!   against the merged state to build the next frontier.
//!
//! A fan-in vertex is scheduled only after every one of its sources has run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::config::RuntimeConfig;
use super::edge::Target;
use super::error::ExecutionError;
use super::state::WorkflowState;
use super::vertex::{BoxedVertex, StateUpdate, VertexId};
use crate::workflow::BuiltWorkflowGraph;

/// Result of a workflow execution
#[derive(Debug, Clone)]
pub struct WorkflowResult<S: WorkflowState> {
    /// Final workflow state
    pub state: S,
    /// Number of supersteps executed
    pub supersteps: usize,
    /// Whether an edge into END was taken
    pub completed: bool,
    /// Vertices run in each superstep, in merge order
    pub trace: Vec<Vec<VertexId>>,
}

impl<S: WorkflowState> WorkflowResult<S> {
    /// Index of the first superstep that ran `id`
    pub fn superstep_of(&self, id: &str) -> Option<usize> {
        self.trace
            .iter()
            .position(|step| step.iter().any(|v| v.as_str() == id))
    }

    /// How many times `id` ran
    pub fn run_count(&self, id: &str) -> usize {
        self.trace
            .iter()
            .flatten()
            .filter(|v| v.as_str() == id)
            .count()
    }
}

/// Pregel Runtime for executing workflow graphs
pub struct PregelRuntime<S, C>
where
    S: WorkflowState,
    C: Send + Sync + 'static,
{
    config: RuntimeConfig,
    graph: Arc<BuiltWorkflowGraph<S, C>>,
}

impl<S, C> PregelRuntime<S, C>
where
    S: WorkflowState,
    C: Send + Sync + 'static,
{
    pub fn new(graph: Arc<BuiltWorkflowGraph<S, C>>, config: RuntimeConfig) -> Self {
        Self { config, graph }
    }

    /// Get the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn graph(&self) -> &BuiltWorkflowGraph<S, C> {
        &self.graph
    }

    /// Run the workflow to completion
    ///
    /// Enforces the configured `workflow_timeout` when one is set.
    pub async fn run(&self, initial_state: S, ctx: &C) -> Result<WorkflowResult<S>, ExecutionError> {
        match self.config.workflow_timeout {
            Some(limit) => match timeout(limit, self.run_inner(initial_state, ctx)).await {
                Ok(result) => result,
                Err(_) => Err(ExecutionError::WorkflowTimeout(limit)),
            },
            None => self.run_inner(initial_state, ctx).await,
        }
    }

    async fn run_inner(&self, initial_state: S, ctx: &C) -> Result<WorkflowResult<S>, ExecutionError> {
        let graph = &self.graph;
        let mut state = initial_state;
        let mut frontier: Vec<VertexId> = graph.entry_points().to_vec();
        let mut arrivals: HashMap<VertexId, HashSet<VertexId>> = HashMap::new();
        let mut trace = Vec::new();
        let mut completed = false;
        let mut superstep = 0;

        info!(workflow = %graph.name, "Workflow starting");

        while !frontier.is_empty() {
            if superstep >= self.config.max_supersteps {
                return Err(ExecutionError::MaxSuperstepsExceeded(superstep));
            }

            frontier.sort_by_key(|id| graph.position(id));
            frontier.dedup();
            info!(superstep, vertices = ?frontier, "Superstep starting");

            let updates = self.execute_superstep(superstep, &frontier, &state, ctx).await;
            report_overlaps(&frontier, &updates);
            state = state.apply_updates(updates);
            trace.push(frontier.clone());
            superstep += 1;

            if state.is_terminal() {
                debug!(superstep, "State reported terminal");
                return Ok(WorkflowResult {
                    state,
                    supersteps: superstep,
                    completed: true,
                    trace,
                });
            }

            let mut next = Vec::new();
            for id in &frontier {
                for target in graph.successors(id, &state) {
                    match target {
                        Target::End => completed = true,
                        // Only declared sources count towards a join; any other
                        // predecessor schedules the vertex directly.
                        Target::Vertex(to) => match graph.join_sources(&to) {
                            Some(sources) if sources.contains(id) => {
                                let arrived = arrivals.entry(to.clone()).or_default();
                                arrived.insert(id.clone());
                                if sources.iter().all(|s| arrived.contains(s)) {
                                    arrivals.remove(&to);
                                    next.push(to);
                                }
                            }
                            _ => next.push(to),
                        },
                    }
                }
            }
            frontier = next;
        }

        if let Some((vertex, arrived)) = arrivals.into_iter().next() {
            let missing = graph
                .join_sources(&vertex)
                .unwrap_or(&[])
                .iter()
                .filter(|s| !arrived.contains(*s))
                .cloned()
                .collect();
            return Err(ExecutionError::UnsatisfiedJoin { vertex, missing });
        }

        info!(workflow = %graph.name, supersteps = superstep, completed, "Workflow finished");
        Ok(WorkflowResult {
            state,
            supersteps: superstep,
            completed,
            trace,
        })
    }

    /// Run every frontier vertex concurrently against one state snapshot
    async fn execute_superstep(
        &self,
        superstep: usize,
        frontier: &[VertexId],
        state: &S,
        ctx: &C,
    ) -> Vec<S::Update> {
        let computations = frontier
            .iter()
            .filter_map(|id| self.graph.vertex(id))
            .map(|vertex| self.compute_vertex(superstep, vertex, state, ctx));
        join_all(computations).await
    }

    async fn compute_vertex(
        &self,
        superstep: usize,
        vertex: &BoxedVertex<S, C>,
        state: &S,
        ctx: &C,
    ) -> S::Update {
        let span = info_span!("vertex", id = %vertex.id(), superstep);
        async {
            let started = Instant::now();
            let update = match self.config.vertex_timeout {
                Some(limit) => match timeout(limit, vertex.compute(state, ctx)).await {
                    Ok(update) => update,
                    Err(_) => {
                        warn!(
                            timeout_ms = limit.as_millis() as u64,
                            degraded = true,
                            "Vertex timed out, applying fallback"
                        );
                        vertex.fallback(state)
                    }
                },
                None => vertex.compute(state, ctx).await,
            };
            debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                fields = ?update.written_fields(),
                "Vertex finished"
            );
            update
        }
        .instrument(span)
        .await
    }
}

/// Concurrent writes to one field mean the topology's ownership declarations are wrong
fn report_overlaps<U: StateUpdate>(frontier: &[VertexId], updates: &[U]) {
    let mut owners: HashMap<&'static str, &VertexId> = HashMap::new();
    for (id, update) in frontier.iter().zip(updates) {
        for field in update.written_fields() {
            if let Some(previous) = owners.insert(field, id) {
                error!(field, first = %previous, second = %id, "Concurrent vertices wrote the same field");
            }
        }
    }
}
