use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::{
    OPTIMISTIC_INITIAL, OPTIMISTIC_REBUTTAL, PESSIMISTIC_INITIAL, PESSIMISTIC_REBUTTAL, REBUTTAL_SEPARATOR,
    REBUTTAL_UNAVAILABLE,
};
use crate::debate::context::NodeContext;
use crate::debate::prompts;
use crate::debate::state::{DebateState, DebateUpdate, Side};
use crate::llm::extract_as;
use crate::pregel::{Vertex, VertexId};

#[derive(Debug, Deserialize)]
struct Position {
    #[serde(default)]
    thinking: String,
    #[serde(default)]
    answer: String,
}

#[derive(Debug, Deserialize)]
struct Rebuttal {
    #[serde(default)]
    rebuttal: String,
}

fn fallback_answer(side: Side) -> &'static str {
    match side {
        Side::Optimistic => {
            "[Optimistic view unavailable] The optimistic analysis could not be generated. \
             On balance the available information leaves room for a favourable outcome."
        }
        Side::Pessimistic => {
            "[Pessimistic view unavailable] The pessimistic analysis could not be generated. \
             On balance the available information warrants caution."
        }
    }
}

/// Opening statement for one side
pub struct PersonaInitial {
    id: VertexId,
    side: Side,
}

impl PersonaInitial {
    pub fn optimistic() -> Self {
        Self {
            id: VertexId::from(OPTIMISTIC_INITIAL),
            side: Side::Optimistic,
        }
    }

    pub fn pessimistic() -> Self {
        Self {
            id: VertexId::from(PESSIMISTIC_INITIAL),
            side: Side::Pessimistic,
        }
    }

    fn update(&self, state: &DebateState, thinking: String, answer: String) -> DebateUpdate {
        match self.side {
            Side::Optimistic => DebateUpdate {
                optimistic_thinking: Some(thinking),
                optimistic_answer: Some(answer),
                round: (state.round == 0).then_some(1),
                ..Default::default()
            },
            Side::Pessimistic => DebateUpdate {
                pessimistic_thinking: Some(thinking),
                pessimistic_answer: Some(answer),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl Vertex<DebateState, NodeContext> for PersonaInitial {
    fn id(&self) -> &VertexId {
        &self.id
    }

    fn output_fields(&self) -> &'static [&'static str] {
        match self.side {
            Side::Optimistic => &["optimistic_thinking", "optimistic_answer", "round"],
            Side::Pessimistic => &["pessimistic_thinking", "pessimistic_answer"],
        }
    }

    async fn compute(&self, state: &DebateState, ctx: &NodeContext) -> DebateUpdate {
        let prompt = prompts::persona_initial(self.side, &state.question, state.research_summary.as_ref());
        let position = match ctx.invoke(&prompt).await {
            Ok(response) => extract_as::<Position>(&response.content).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match position {
            Ok(p) if !p.answer.trim().is_empty() => {
                info!(node = %self.id, chars = p.answer.len(), "Position drafted");
                self.update(state, p.thinking, p.answer)
            }
            Ok(_) => {
                warn!(node = %self.id, degraded = true, "Empty answer, using fallback");
                self.fallback(state)
            }
            Err(e) => {
                warn!(node = %self.id, degraded = true, error = %e, "Position failed, using fallback");
                self.fallback(state)
            }
        }
    }

    fn fallback(&self, state: &DebateState) -> DebateUpdate {
        self.update(state, String::new(), fallback_answer(self.side).to_string())
    }
}

/// Reply to the opponent's latest answer, appended to one's own
pub struct PersonaRebuttal {
    id: VertexId,
    side: Side,
}

impl PersonaRebuttal {
    pub fn optimistic() -> Self {
        Self {
            id: VertexId::from(OPTIMISTIC_REBUTTAL),
            side: Side::Optimistic,
        }
    }

    pub fn pessimistic() -> Self {
        Self {
            id: VertexId::from(PESSIMISTIC_REBUTTAL),
            side: Side::Pessimistic,
        }
    }

    fn update(&self, state: &DebateState, rebuttal: String) -> DebateUpdate {
        let answer = format!("{}{}{}", state.answer(self.side), REBUTTAL_SEPARATOR, rebuttal);
        match self.side {
            Side::Optimistic => DebateUpdate {
                optimistic_rebuttal: Some(rebuttal),
                optimistic_answer: Some(answer),
                ..Default::default()
            },
            Side::Pessimistic => DebateUpdate {
                pessimistic_rebuttal: Some(rebuttal),
                pessimistic_answer: Some(answer),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl Vertex<DebateState, NodeContext> for PersonaRebuttal {
    fn id(&self) -> &VertexId {
        &self.id
    }

    fn output_fields(&self) -> &'static [&'static str] {
        match self.side {
            Side::Optimistic => &["optimistic_rebuttal", "optimistic_answer"],
            Side::Pessimistic => &["pessimistic_rebuttal", "pessimistic_answer"],
        }
    }

    async fn compute(&self, state: &DebateState, ctx: &NodeContext) -> DebateUpdate {
        let prompt = prompts::persona_rebuttal(
            self.side,
            &state.question,
            state.answer(self.side),
            state.answer(self.side.opponent()),
        );
        let rebuttal = match ctx.invoke(&prompt).await {
            Ok(response) => extract_as::<Rebuttal>(&response.content).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match rebuttal {
            Ok(r) if !r.rebuttal.trim().is_empty() => self.update(state, r.rebuttal),
            Ok(_) => {
                warn!(node = %self.id, degraded = true, "Empty rebuttal");
                self.fallback(state)
            }
            Err(e) => {
                warn!(node = %self.id, degraded = true, error = %e, "Rebuttal failed");
                self.fallback(state)
            }
        }
    }

    fn fallback(&self, state: &DebateState) -> DebateUpdate {
        self.update(state, REBUTTAL_UNAVAILABLE.to_string())
    }
}
