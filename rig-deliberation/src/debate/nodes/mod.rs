//! The nine debate vertices
//!
//! Every node recovers from its own failures: an exhausted model call, a
//! malformed reply or a failed search produces a degraded but well-formed
//! update, logged with `degraded = true`. The runtime applies the same
//! degraded update through `Vertex::fallback` when a node overruns its
//! deadline.
//!
//! | Node | Writes |
//! |------|--------|
//! | `researcher` | `search_results`, `research_summary`, `engine_usage` |
//! | `planner` | `research_plan`, `sub_tasks`, `current_depth` |
//! | `parallel_research` | `sub_tasks`, `all_findings` |
//! | `deep_check` | `research_summary` or `sub_tasks` + `current_depth` |
//! | `optimistic_initial` | `optimistic_thinking`, `optimistic_answer`, `round` |
//! | `pessimistic_initial` | `pessimistic_thinking`, `pessimistic_answer` |
//! | `*_rebuttal` | own `*_rebuttal`, own `*_answer` |
//! | `decider` | `should_continue`, `round`, `debate_winner`, `debate_summary` |

mod decider;
mod deep_check;
mod parallel_research;
mod persona;
mod planner;
mod researcher;

#[cfg(test)]
pub(crate) mod testing;

pub use decider::Decider;
pub use deep_check::{synthesize_findings, DeepCheck};
pub use parallel_research::ParallelResearch;
pub use persona::{PersonaInitial, PersonaRebuttal};
pub use planner::Planner;
pub use researcher::Researcher;

pub const RESEARCHER: &str = "researcher";
pub const PLANNER: &str = "planner";
pub const PARALLEL_RESEARCH: &str = "parallel_research";
pub const DEEP_CHECK: &str = "deep_check";
pub const OPTIMISTIC_INITIAL: &str = "optimistic_initial";
pub const PESSIMISTIC_INITIAL: &str = "pessimistic_initial";
pub const OPTIMISTIC_REBUTTAL: &str = "optimistic_rebuttal";
pub const PESSIMISTIC_REBUTTAL: &str = "pessimistic_rebuttal";
pub const DECIDER: &str = "decider";

/// Prefix of `research_summary.summary` when the summarizer failed
pub const SUMMARY_UNAVAILABLE: &str = "Research summary unavailable";

/// Prefix of `research_summary.summary` when no evidence was found
pub const NO_RESEARCH_DATA: &str = "No research data found";

/// Appended to an answer when a rebuttal could not be produced
pub const REBUTTAL_UNAVAILABLE: &str = "[Rebuttal unavailable]";

/// Separates an answer from each rebuttal appended to it
pub const REBUTTAL_SEPARATOR: &str = "\n\n---\n**Rebuttal:**\n";

/// Prefix of `debate_summary` when the Decider failed
pub const DECISION_UNAVAILABLE: &str = "Decision unavailable";
