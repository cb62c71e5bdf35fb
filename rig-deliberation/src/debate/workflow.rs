//! Debate topologies
//!
//! ```text
//! standard_debate:
//!   researcher ─┬─ optimistic_initial ──┬─ optimistic_rebuttal ─ pessimistic_rebuttal ─ decider ─ END
//!               └─ pessimistic_initial ─┘
//!
//! deep_research_debate:
//!   planner ─ parallel_research ─ deep_check ─?─ continue_research ─> parallel_research
//!                                            └─ research_complete ─> optimistic_initial
//!   optimistic_initial ─ pessimistic_initial ─ optimistic_rebuttal ─ pessimistic_rebuttal ─ decider ─ END
//!
//! looping_debate:
//!   standard_debate, with decider ─?─ continue ─> optimistic_rebuttal
//!                                 └─ complete ─> END
//! ```

use crate::debate::context::NodeContext;
use crate::debate::nodes::{
    Decider, DeepCheck, ParallelResearch, PersonaInitial, PersonaRebuttal, Planner, Researcher, DECIDER,
    DEEP_CHECK, OPTIMISTIC_INITIAL, OPTIMISTIC_REBUTTAL, PARALLEL_RESEARCH, PESSIMISTIC_INITIAL,
    PESSIMISTIC_REBUTTAL, PLANNER, RESEARCHER,
};
use crate::debate::state::DebateState;
use crate::pregel::Route;
use crate::workflow::{BuiltWorkflowGraph, TopologyError, WorkflowGraph, END};

pub type DebateGraph = BuiltWorkflowGraph<DebateState, NodeContext>;

/// Which topology a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Standard,
    DeepResearch,
    Looping,
}

impl Topology {
    pub fn build(self) -> Result<DebateGraph, TopologyError> {
        match self {
            Topology::Standard => standard_debate(),
            Topology::DeepResearch => deep_research_debate(),
            Topology::Looping => looping_debate(),
        }
    }
}

/// Continue only while pending sub-tasks remain within the depth bound
pub fn research_route(state: &DebateState) -> Route {
    if state.current_depth <= state.max_depth && state.pending_sub_tasks().next().is_some() {
        Route::Continue
    } else {
        Route::Complete
    }
}

/// Another rebuttal round only if the judge asked for one and rounds remain
pub fn debate_route(state: &DebateState) -> Route {
    if state.should_continue && state.round < state.max_rounds {
        Route::Continue
    } else {
        Route::Complete
    }
}

fn debaters(graph: WorkflowGraph<DebateState, NodeContext>) -> WorkflowGraph<DebateState, NodeContext> {
    graph
        .node(PersonaInitial::optimistic())
        .node(PersonaInitial::pessimistic())
        .node(PersonaRebuttal::optimistic())
        .node(PersonaRebuttal::pessimistic())
        .node(Decider::new())
}

fn researched_openings(graph: WorkflowGraph<DebateState, NodeContext>) -> WorkflowGraph<DebateState, NodeContext> {
    debaters(graph.node(Researcher::new()))
        .entry(RESEARCHER)
        .fan_out(RESEARCHER, [OPTIMISTIC_INITIAL, PESSIMISTIC_INITIAL])
        .fan_in([OPTIMISTIC_INITIAL, PESSIMISTIC_INITIAL], OPTIMISTIC_REBUTTAL)
        .edge(OPTIMISTIC_REBUTTAL, PESSIMISTIC_REBUTTAL)
        .edge(PESSIMISTIC_REBUTTAL, DECIDER)
}

/// Research, parallel openings, one rebuttal each, one verdict
pub fn standard_debate() -> Result<DebateGraph, TopologyError> {
    researched_openings(WorkflowGraph::new().name("standard_debate"))
        .edge(DECIDER, END)
        .build()
}

/// Recursive sub-task research ahead of a sequential debate
pub fn deep_research_debate() -> Result<DebateGraph, TopologyError> {
    debaters(
        WorkflowGraph::new()
            .name("deep_research_debate")
            .node(Planner::new())
            .node(ParallelResearch::new())
            .node(DeepCheck::new()),
    )
    .entry(PLANNER)
    .edge(PLANNER, PARALLEL_RESEARCH)
    .edge(PARALLEL_RESEARCH, DEEP_CHECK)
    .conditional_edge(
        DEEP_CHECK,
        research_route,
        ("continue_research", PARALLEL_RESEARCH),
        ("research_complete", OPTIMISTIC_INITIAL),
    )
    .edge(OPTIMISTIC_INITIAL, PESSIMISTIC_INITIAL)
    .edge(PESSIMISTIC_INITIAL, OPTIMISTIC_REBUTTAL)
    .edge(OPTIMISTIC_REBUTTAL, PESSIMISTIC_REBUTTAL)
    .edge(PESSIMISTIC_REBUTTAL, DECIDER)
    .edge(DECIDER, END)
    .build()
}

/// Standard debate whose judge may send both sides back for more rebuttals
pub fn looping_debate() -> Result<DebateGraph, TopologyError> {
    researched_openings(WorkflowGraph::new().name("looping_debate"))
        .conditional_edge(
            DECIDER,
            debate_route,
            ("continue", OPTIMISTIC_REBUTTAL),
            ("complete", END),
        )
        .build()
}
