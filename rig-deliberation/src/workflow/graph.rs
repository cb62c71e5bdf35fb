//! WorkflowGraph builder DSL.
//!
//! Provides a fluent API for registering vertices and wiring sequential,
//! fan-out, fan-in and conditional edges, then validates the topology and
//! produces a [`BuiltWorkflowGraph`]. Every structural defect is reported here,
//! at construction time, so a built graph cannot fail for topological reasons
//! while it runs.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::pregel::edge::{Branch, ConditionalEdge, Route, RoutePredicate, Target};
use crate::pregel::{BoxedVertex, Vertex, VertexId, WorkflowState};

/// Sentinel source for entry edges.
pub const START: &str = "START";

/// Sentinel target for terminal edges.
pub const END: &str = "END";

/// Structural defects found while building a workflow graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("workflow entry point not set")]
    NoEntryPoint,
    #[error("unknown node id: {0}")]
    UnknownNode(String),
    #[error("node registered twice: {0}")]
    DuplicateNode(String),
    #[error("node {0} has no outgoing edge")]
    MissingSuccessor(String),
    #[error("node {0} mixes conditional and direct outgoing edges")]
    ConflictingEdges(String),
    #[error("node {0} is unreachable from the entry point")]
    UnreachableNode(String),
    #[error("cycle through {0} has no conditional edge to bound it")]
    UnboundedCycle(String),
    #[error("invalid fan-in into {0}")]
    InvalidJoin(String),
    #[error("concurrent nodes {first} and {second} both write {field}")]
    OverlappingOutputs {
        field: String,
        first: String,
        second: String,
    },
}

struct PendingConditional<S> {
    from: String,
    predicate: RoutePredicate<S>,
    on_continue: (String, String),
    on_complete: (String, String),
}

/// Builder for constructing workflow graphs with fluent API.
pub struct WorkflowGraph<S: WorkflowState, C: Send + Sync + 'static> {
    name: String,
    vertices: Vec<BoxedVertex<S, C>>,
    entry: Vec<String>,
    edges: Vec<(String, String)>,
    joins: Vec<(Vec<String>, String)>,
    conditionals: Vec<PendingConditional<S>>,
}

impl<S: WorkflowState, C: Send + Sync + 'static> Default for WorkflowGraph<S, C> {
    fn default() -> Self {
        Self {
            name: String::new(),
            vertices: Vec::new(),
            entry: Vec::new(),
            edges: Vec::new(),
            joins: Vec::new(),
            conditionals: Vec::new(),
        }
    }
}

impl<S: WorkflowState, C: Send + Sync + 'static> WorkflowGraph<S, C> {
    /// Create a new workflow graph builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workflow name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Register a vertex. Declaration order is the merge order within a superstep.
    pub fn node(self, vertex: impl Vertex<S, C> + 'static) -> Self {
        self.shared_node(Arc::new(vertex))
    }

    /// Register an already shared vertex.
    pub fn shared_node(mut self, vertex: BoxedVertex<S, C>) -> Self {
        self.vertices.push(vertex);
        self
    }

    /// Add an entry point. Several entry points run concurrently in the first superstep.
    pub fn entry(mut self, id: impl Into<String>) -> Self {
        self.entry.push(id.into());
        self
    }

    /// Add a direct edge between nodes (`to` may be [`END`]).
    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Dispatch several nodes concurrently once `from` has been merged.
    pub fn fan_out<I, T>(mut self, from: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let from = from.into();
        for target in targets {
            self.edges.push((from.clone(), target.into()));
        }
        self
    }

    /// Run `to` once, after every source has completed and been merged.
    pub fn fan_in<I, T>(mut self, sources: I, to: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let sources = sources.into_iter().map(Into::into).collect();
        self.joins.push((sources, to.into()));
        self
    }

    /// Add a two-way conditional edge.
    ///
    /// Each branch is `(label, target)`; the predicate runs against the state
    /// after `from`'s update has been merged.
    pub fn conditional_edge(
        mut self,
        from: impl Into<String>,
        predicate: impl Fn(&S) -> Route + Send + Sync + 'static,
        on_continue: (&str, &str),
        on_complete: (&str, &str),
    ) -> Self {
        self.conditionals.push(PendingConditional {
            from: from.into(),
            predicate: Arc::new(predicate),
            on_continue: (on_continue.0.to_string(), on_continue.1.to_string()),
            on_complete: (on_complete.0.to_string(), on_complete.1.to_string()),
        });
        self
    }

    /// Validate and build the workflow graph.
    pub fn build(self) -> Result<BuiltWorkflowGraph<S, C>, TopologyError> {
        let mut order = Vec::with_capacity(self.vertices.len());
        let mut vertices = HashMap::new();
        for vertex in self.vertices {
            let id = vertex.id().clone();
            if vertices.insert(id.clone(), vertex).is_some() {
                return Err(TopologyError::DuplicateNode(id.0));
            }
            order.push(id);
        }

        let resolve = |name: &str| -> Result<Target, TopologyError> {
            if name == END {
                return Ok(Target::End);
            }
            let id = VertexId::from(name);
            if vertices.contains_key(&id) {
                Ok(Target::Vertex(id))
            } else {
                Err(TopologyError::UnknownNode(name.to_string()))
            }
        };
        let resolve_vertex = |name: &str| -> Result<VertexId, TopologyError> {
            match resolve(name)? {
                Target::Vertex(id) => Ok(id),
                Target::End => Err(TopologyError::UnknownNode(name.to_string())),
            }
        };

        if self.entry.is_empty() {
            return Err(TopologyError::NoEntryPoint);
        }
        let mut entry = Vec::new();
        for name in &self.entry {
            let id = resolve_vertex(name)?;
            if !entry.contains(&id) {
                entry.push(id);
            }
        }

        let mut edges: HashMap<VertexId, Vec<Target>> = HashMap::new();
        for (from, to) in &self.edges {
            let from = resolve_vertex(from)?;
            let to = resolve(to)?;
            let targets = edges.entry(from).or_default();
            if !targets.contains(&to) {
                targets.push(to);
            }
        }

        let mut joins: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
        for (sources, to) in &self.joins {
            let target = resolve_vertex(to)?;
            let mut ids = Vec::new();
            for source in sources {
                let id = resolve_vertex(source)?;
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            if ids.len() < 2 || joins.contains_key(&target) {
                return Err(TopologyError::InvalidJoin(target.0));
            }
            for source in &ids {
                let targets = edges.entry(source.clone()).or_default();
                let join_target = Target::Vertex(target.clone());
                if !targets.contains(&join_target) {
                    targets.push(join_target);
                }
            }
            joins.insert(target, ids);
        }

        let mut conditionals = HashMap::new();
        for pending in self.conditionals {
            let from = resolve_vertex(&pending.from)?;
            let edge = ConditionalEdge {
                predicate: pending.predicate,
                on_continue: Branch {
                    label: pending.on_continue.0,
                    target: resolve(&pending.on_continue.1)?,
                },
                on_complete: Branch {
                    label: pending.on_complete.0,
                    target: resolve(&pending.on_complete.1)?,
                },
            };
            if conditionals.insert(from.clone(), edge).is_some() {
                return Err(TopologyError::ConflictingEdges(from.0));
            }
        }

        let graph = BuiltWorkflowGraph {
            name: self.name,
            order,
            vertices,
            entry,
            edges,
            conditionals,
            joins,
        };
        graph.validate()?;

        debug!(
            workflow = %graph.name,
            vertices = graph.order.len(),
            "Workflow graph built"
        );
        Ok(graph)
    }
}

/// Built, validated workflow graph.
pub struct BuiltWorkflowGraph<S: WorkflowState, C: Send + Sync + 'static> {
    pub name: String,
    order: Vec<VertexId>,
    vertices: HashMap<VertexId, BoxedVertex<S, C>>,
    entry: Vec<VertexId>,
    edges: HashMap<VertexId, Vec<Target>>,
    conditionals: HashMap<VertexId, ConditionalEdge<S>>,
    joins: HashMap<VertexId, Vec<VertexId>>,
}

impl<S: WorkflowState, C: Send + Sync + 'static> BuiltWorkflowGraph<S, C> {
    /// Vertex ids in declaration order
    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.order
    }

    pub fn vertex(&self, id: &VertexId) -> Option<&BoxedVertex<S, C>> {
        self.vertices.get(id)
    }

    pub fn entry_points(&self) -> &[VertexId] {
        &self.entry
    }

    /// Direct (unconditional) targets of a vertex
    pub fn direct_targets(&self, id: &VertexId) -> &[Target] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn conditional(&self, id: &VertexId) -> Option<&ConditionalEdge<S>> {
        self.conditionals.get(id)
    }

    /// Sources a fan-in vertex waits for
    pub fn join_sources(&self, id: &VertexId) -> Option<&[VertexId]> {
        self.joins.get(id).map(Vec::as_slice)
    }

    /// Declaration index, used to order merges within a superstep
    pub fn position(&self, id: &VertexId) -> usize {
        self.order
            .iter()
            .position(|v| v == id)
            .unwrap_or(usize::MAX)
    }

    /// Successors of `id` given the merged state
    pub fn successors(&self, id: &VertexId, state: &S) -> Vec<Target> {
        match self.conditionals.get(id) {
            Some(edge) => {
                let (route, branch) = edge.select(state);
                debug!(from = %id, ?route, branch = %branch.label, to = %branch.target, "Conditional edge evaluated");
                vec![branch.target.clone()]
            }
            None => self.direct_targets(id).to_vec(),
        }
    }

    /// Mermaid flowchart of this graph
    pub fn to_mermaid(&self) -> String {
        crate::pregel::render_graph(self)
    }

    fn all_targets(&self, id: &VertexId) -> Vec<&Target> {
        let mut targets: Vec<&Target> = self.direct_targets(id).iter().collect();
        if let Some(edge) = self.conditionals.get(id) {
            targets.extend(edge.branches().into_iter().map(|b| &b.target));
        }
        targets
    }

    fn validate(&self) -> Result<(), TopologyError> {
        for id in &self.order {
            let has_direct = !self.direct_targets(id).is_empty();
            let has_conditional = self.conditionals.contains_key(id);
            if has_direct && has_conditional {
                return Err(TopologyError::ConflictingEdges(id.0.clone()));
            }
            if !has_direct && !has_conditional {
                return Err(TopologyError::MissingSuccessor(id.0.clone()));
            }
        }

        self.check_reachable()?;
        self.check_bounded_cycles()?;
        self.check_disjoint_outputs()
    }

    fn check_reachable(&self) -> Result<(), TopologyError> {
        let mut seen: HashSet<&VertexId> = self.entry.iter().collect();
        let mut queue: VecDeque<&VertexId> = self.entry.iter().collect();
        while let Some(id) = queue.pop_front() {
            for target in self.all_targets(id) {
                if let Target::Vertex(next) = target {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        match self.order.iter().find(|id| !seen.contains(id)) {
            Some(id) => Err(TopologyError::UnreachableNode(id.0.clone())),
            None => Ok(()),
        }
    }

    /// Every cycle must pass through a conditional edge, whose predicate bounds it
    fn check_bounded_cycles(&self) -> Result<(), TopologyError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit<'a, S: WorkflowState, C: Send + Sync + 'static>(
            graph: &'a BuiltWorkflowGraph<S, C>,
            id: &'a VertexId,
            marks: &mut HashMap<&'a VertexId, Mark>,
        ) -> Result<(), TopologyError> {
            marks.insert(id, Mark::InProgress);
            for target in graph.direct_targets(id) {
                if let Target::Vertex(next) = target {
                    match marks.get(next).copied().unwrap_or(Mark::Unvisited) {
                        Mark::InProgress => {
                            return Err(TopologyError::UnboundedCycle(next.0.clone()))
                        }
                        Mark::Unvisited => visit(graph, next, marks)?,
                        Mark::Done => {}
                    }
                }
            }
            marks.insert(id, Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        for id in &self.order {
            if !marks.contains_key(id) {
                visit(self, id, &mut marks)?;
            }
        }
        Ok(())
    }

    /// Vertices dispatched together must not write the same field
    fn check_disjoint_outputs(&self) -> Result<(), TopologyError> {
        let mut groups: Vec<Vec<&VertexId>> = vec![self.entry.iter().collect()];
        for id in &self.order {
            let group: Vec<&VertexId> = self
                .direct_targets(id)
                .iter()
                .filter_map(|t| match t {
                    Target::Vertex(v) => Some(v),
                    Target::End => None,
                })
                .collect();
            groups.push(group);
        }

        for group in groups.iter().filter(|g| g.len() > 1) {
            for (i, first) in group.iter().enumerate() {
                for second in &group[i + 1..] {
                    let (Some(a), Some(b)) = (self.vertices.get(*first), self.vertices.get(*second))
                    else {
                        continue;
                    };
                    if let Some(field) = a
                        .output_fields()
                        .iter()
                        .copied()
                        .find(|f| b.output_fields().contains(f))
                    {
                        return Err(TopologyError::OverlappingOutputs {
                            field: field.to_string(),
                            first: first.0.clone(),
                            second: second.0.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
