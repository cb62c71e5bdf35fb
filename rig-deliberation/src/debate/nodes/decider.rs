use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::{DECIDER, DECISION_UNAVAILABLE};
use crate::debate::context::NodeContext;
use crate::debate::prompts;
use crate::debate::state::{DebateState, DebateUpdate, Winner};
use crate::llm::extract_as;
use crate::pregel::{Vertex, VertexId};

#[derive(Debug, Deserialize)]
struct Verdict {
    #[serde(default, alias = "shouldContinue")]
    should_continue: bool,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    winner: String,
    #[serde(default)]
    summary: String,
}

/// Judges the debate and advances the round counter
pub struct Decider {
    id: VertexId,
}

impl Decider {
    pub fn new() -> Self {
        Self {
            id: VertexId::from(DECIDER),
        }
    }

    fn degraded(state: &DebateState, reason: &str) -> DebateUpdate {
        DebateUpdate {
            should_continue: Some(false),
            round: Some(state.round + 1),
            debate_winner: Some(Winner::Draw),
            debate_summary: Some(format!(
                "{DECISION_UNAVAILABLE}: the judge could not reach a verdict ({reason}). \
                 The debate is recorded as a draw."
            )),
            ..Default::default()
        }
    }
}

impl Default for Decider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Vertex<DebateState, NodeContext> for Decider {
    fn id(&self) -> &VertexId {
        &self.id
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &["should_continue", "round", "debate_winner", "debate_summary"]
    }

    async fn compute(&self, state: &DebateState, ctx: &NodeContext) -> DebateUpdate {
        let prompt = prompts::decider(
            &state.question,
            &state.optimistic_answer,
            &state.pessimistic_answer,
            state.round,
            state.max_rounds,
            ctx.settings.decider_answer_chars,
        );
        let verdict = match ctx.invoke(&prompt).await {
            Ok(response) => extract_as::<Verdict>(&response.content).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let verdict = match verdict {
            Ok(v) => v,
            Err(e) => {
                warn!(node = DECIDER, degraded = true, error = %e, "Decision failed, declaring a draw");
                return Self::degraded(state, &e);
            }
        };

        let winner = Winner::parse_lenient(&verdict.winner);
        let summary = if verdict.summary.trim().is_empty() {
            verdict.reason.clone()
        } else {
            verdict.summary
        };
        info!(
            node = DECIDER,
            round = state.round,
            ?winner,
            should_continue = verdict.should_continue,
            reason = %verdict.reason,
            "Verdict reached"
        );

        DebateUpdate {
            should_continue: Some(verdict.should_continue),
            round: Some(state.round + 1),
            debate_winner: Some(winner),
            debate_summary: Some(summary),
            ..Default::default()
        }
    }

    fn fallback(&self, state: &DebateState) -> DebateUpdate {
        Self::degraded(state, "timed out")
    }
}
