//! Debate workflow state
//!
//! `DebateState` is the single record threaded through the graph. Nodes return
//! a `DebateUpdate`: every field is optional, and a written field replaces the
//! state's value wholesale. Cumulative fields (persona answers, sub-tasks,
//! findings) are read, extended and written back in full by the node that
//! owns them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::pregel::{StateUpdate, WorkflowState};
use crate::search::{SearchResult, SearchStrategy};

/// Outcome of the Decider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Optimistic,
    Pessimistic,
    #[default]
    Draw,
}

impl Winner {
    /// Lenient parse of a model's verdict; anything unrecognized is a draw
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "optimistic" | "optimist" | "乐观" | "乐观派" => Winner::Optimistic,
            "pessimistic" | "pessimist" | "悲观" | "悲观派" => Winner::Pessimistic,
            _ => Winner::Draw,
        }
    }
}

/// One side of the debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Optimistic,
    Pessimistic,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Optimistic => Side::Pessimistic,
            Side::Pessimistic => Side::Optimistic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Optimistic => "optimistic",
            Side::Pessimistic => "pessimistic",
        }
    }
}

/// One fact with where it came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub context: String,
}

/// Condensed research handed to the personas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchSummary {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_facts: Vec<String>,
    #[serde(default)]
    pub data_points: Vec<DataPoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubTaskStatus {
    #[default]
    Pending,
    Researching,
    Completed,
    Failed,
}

impl SubTaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SubTaskStatus::Completed | SubTaskStatus::Failed)
    }

    /// `pending -> researching -> {completed | failed}`; pending may also finish directly
    pub fn can_transition_to(self, next: SubTaskStatus) -> bool {
        use SubTaskStatus::*;
        matches!(
            (self, next),
            (Pending, Researching) | (Pending, Completed) | (Pending, Failed) | (Researching, Completed) | (Researching, Failed)
        )
    }
}

/// A research sub-question in the deep research loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub depth: u32,
    pub status: SubTaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl SubTask {
    pub fn pending(query: impl Into<String>, depth: u32, parent_id: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            query: query.into(),
            parent_id,
            depth,
            status: SubTaskStatus::Pending,
            result: None,
            sources: None,
        }
    }

    /// Move to `next` if allowed; returns whether the status changed
    pub fn transition(&mut self, next: SubTaskStatus) -> bool {
        if self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}

/// Evidence gathered for one sub-task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub query: String,
    pub content: String,
    pub depth: u32,
    pub sources: Vec<String>,
}

/// The record every debate node reads and writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateState {
    pub question: String,
    pub search_strategy: SearchStrategy,

    pub search_results: Vec<SearchResult>,
    pub research_summary: Option<ResearchSummary>,
    pub engine_usage: BTreeMap<String, u32>,

    pub deep_research_enabled: bool,
    pub current_depth: u32,
    pub max_depth: u32,
    pub breadth: u32,
    pub sub_tasks: Vec<SubTask>,
    pub all_findings: Vec<Finding>,
    pub research_plan: Vec<String>,

    pub optimistic_thinking: String,
    pub optimistic_answer: String,
    pub optimistic_rebuttal: String,
    pub pessimistic_thinking: String,
    pub pessimistic_answer: String,
    pub pessimistic_rebuttal: String,

    pub should_continue: bool,
    pub round: u32,
    pub max_rounds: u32,
    pub debate_winner: Winner,
    pub debate_summary: String,

    /// Bumped once per superstep that changed anything
    pub version: u64,
}

impl DebateState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            search_strategy: SearchStrategy::default(),
            search_results: Vec::new(),
            research_summary: None,
            engine_usage: BTreeMap::new(),
            deep_research_enabled: false,
            current_depth: 0,
            max_depth: 0,
            breadth: 0,
            sub_tasks: Vec::new(),
            all_findings: Vec::new(),
            research_plan: Vec::new(),
            optimistic_thinking: String::new(),
            optimistic_answer: String::new(),
            optimistic_rebuttal: String::new(),
            pessimistic_thinking: String::new(),
            pessimistic_answer: String::new(),
            pessimistic_rebuttal: String::new(),
            should_continue: false,
            round: 0,
            max_rounds: 2,
            debate_winner: Winner::Draw,
            debate_summary: String::new(),
            version: 0,
        }
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.search_strategy = strategy;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Both bounds are at least 1, so the Planner's first level fits
    pub fn with_deep_research(mut self, max_depth: u32, breadth: u32) -> Self {
        self.deep_research_enabled = true;
        self.max_depth = max_depth.max(1);
        self.breadth = breadth.max(1);
        self
    }

    pub fn answer(&self, side: Side) -> &str {
        match side {
            Side::Optimistic => &self.optimistic_answer,
            Side::Pessimistic => &self.pessimistic_answer,
        }
    }

    pub fn pending_sub_tasks(&self) -> impl Iterator<Item = &SubTask> {
        self.sub_tasks
            .iter()
            .filter(|t| t.status == SubTaskStatus::Pending)
    }
}

/// Generates `DebateUpdate` with one `Option` per writable field, plus the
/// apply/merge/field-list plumbing, so the three always agree.
macro_rules! debate_update {
    ($($field:ident: $ty:ty),* $(,)?) => {
        /// Partial write to [`DebateState`]; `None` leaves a field untouched
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct DebateUpdate {
            $(pub $field: Option<$ty>,)*
        }

        impl StateUpdate for DebateUpdate {
            fn empty() -> Self {
                Self::default()
            }

            fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }

            fn written_fields(&self) -> Vec<&'static str> {
                let mut fields = Vec::new();
                $(if self.$field.is_some() {
                    fields.push(stringify!($field));
                })*
                fields
            }
        }

        impl WorkflowState for DebateState {
            type Update = DebateUpdate;

            fn apply_update(&self, update: DebateUpdate) -> Self {
                let mut next = self.clone();
                $(if let Some(value) = update.$field {
                    next.$field = value;
                })*
                next.version += 1;
                next
            }

            fn merge_updates(updates: Vec<DebateUpdate>) -> DebateUpdate {
                updates
                    .into_iter()
                    .fold(DebateUpdate::default(), |acc, later| DebateUpdate {
                        $($field: later.$field.or(acc.$field),)*
                    })
            }
        }
    };
}

debate_update! {
    search_results: Vec<SearchResult>,
    research_summary: Option<ResearchSummary>,
    engine_usage: BTreeMap<String, u32>,
    current_depth: u32,
    sub_tasks: Vec<SubTask>,
    all_findings: Vec<Finding>,
    research_plan: Vec<String>,
    optimistic_thinking: String,
    optimistic_answer: String,
    optimistic_rebuttal: String,
    pessimistic_thinking: String,
    pessimistic_answer: String,
    pessimistic_rebuttal: String,
    should_continue: bool,
    round: u32,
    debate_winner: Winner,
    debate_summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = DebateState::new("什么是ETF");
        assert_eq!(state.debate_winner, Winner::Draw);
        assert_eq!(state.max_rounds, 2);
        assert_eq!(state.round, 0);
        assert_eq!(state.search_strategy, SearchStrategy::Smart);
        assert!(state.research_summary.is_none());
    }

    #[test]
    fn test_deep_research_bounds_are_at_least_one() {
        let state = DebateState::new("q").with_deep_research(0, 0);
        assert!(state.deep_research_enabled);
        assert_eq!(state.max_depth, 1);
        assert_eq!(state.breadth, 1);
    }

    #[test]
    fn test_untouched_fields_survive() {
        let state = DebateState::new("q");
        let next = state.apply_update(DebateUpdate {
            optimistic_answer: Some("yes".into()),
            ..Default::default()
        });

        assert_eq!(next.optimistic_answer, "yes");
        assert_eq!(next.question, "q");
        assert_eq!(next.pessimistic_answer, "");
        assert_eq!(next.version, 1);
    }

    #[test]
    fn test_last_write_wins_on_merge() {
        let merged = DebateState::merge_updates(vec![
            DebateUpdate {
                debate_summary: Some("first".into()),
                round: Some(1),
                ..Default::default()
            },
            DebateUpdate {
                debate_summary: Some("second".into()),
                ..Default::default()
            },
        ]);

        assert_eq!(merged.debate_summary.as_deref(), Some("second"));
        assert_eq!(merged.round, Some(1));
    }

    #[test]
    fn test_summary_can_be_written_as_present() {
        let update = DebateUpdate {
            research_summary: Some(Some(ResearchSummary::default())),
            ..Default::default()
        };
        assert_eq!(update.written_fields(), vec!["research_summary"]);
        assert!(!update.is_empty());
        assert!(DebateUpdate::empty().is_empty());
    }

    #[test]
    fn test_empty_updates_do_not_bump_version() {
        let state = DebateState::new("q");
        let next = state.apply_updates(vec![DebateUpdate::empty(), DebateUpdate::empty()]);
        assert_eq!(next.version, 0);
    }

    #[test]
    fn test_sub_task_transitions() {
        let mut task = SubTask::pending("q", 1, None);
        assert!(task.transition(SubTaskStatus::Researching));
        assert!(!task.transition(SubTaskStatus::Pending));
        assert!(task.transition(SubTaskStatus::Completed));
        assert!(!task.transition(SubTaskStatus::Failed));
        assert_eq!(task.status, SubTaskStatus::Completed);
    }

    #[test]
    fn test_winner_parse_lenient() {
        assert_eq!(Winner::parse_lenient("Optimistic"), Winner::Optimistic);
        assert_eq!(Winner::parse_lenient(" pessimistic "), Winner::Pessimistic);
        assert_eq!(Winner::parse_lenient("both"), Winner::Draw);
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_value(DebateState::new("q")).unwrap();
        assert!(json.get("debateWinner").is_some());
        assert!(json.get("optimisticAnswer").is_some());
        assert_eq!(json["debateWinner"], "draw");
    }
}
