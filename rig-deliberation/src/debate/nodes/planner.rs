use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::PLANNER;
use crate::debate::context::NodeContext;
use crate::debate::prompts;
use crate::debate::state::{DebateState, DebateUpdate, SubTask};
use crate::llm::extract_as;
use crate::pregel::{Vertex, VertexId};

#[derive(Debug, Deserialize)]
struct SubQuery {
    query: String,
    #[serde(default)]
    rationale: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResearchPlan {
    #[serde(default)]
    sub_queries: Vec<SubQuery>,
}

/// Splits the question into `breadth` pending sub-tasks at depth 1
pub struct Planner {
    id: VertexId,
}

impl Planner {
    pub fn new() -> Self {
        Self {
            id: VertexId::from(PLANNER),
        }
    }

    fn plan_update(queries: Vec<String>) -> DebateUpdate {
        let sub_tasks = queries
            .iter()
            .map(|q| SubTask::pending(q.clone(), 1, None))
            .collect();
        DebateUpdate {
            research_plan: Some(queries),
            sub_tasks: Some(sub_tasks),
            current_depth: Some(1),
            ..Default::default()
        }
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Vertex<DebateState, NodeContext> for Planner {
    fn id(&self) -> &VertexId {
        &self.id
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &["research_plan", "sub_tasks", "current_depth"]
    }

    async fn compute(&self, state: &DebateState, ctx: &NodeContext) -> DebateUpdate {
        let breadth = state.breadth.max(1);
        let prompt = prompts::research_plan(&state.question, breadth);

        let parsed = match ctx.invoke(&prompt).await {
            Ok(response) => extract_as::<ResearchPlan>(&response.content).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let queries: Vec<String> = match parsed {
            Ok(plan) => plan
                .sub_queries
                .into_iter()
                .filter(|s| !s.query.trim().is_empty())
                .take(breadth as usize)
                .map(|s| {
                    debug!(query = %s.query, rationale = %s.rationale, "Planned sub-query");
                    s.query.trim().to_string()
                })
                .collect(),
            Err(e) => {
                warn!(node = PLANNER, degraded = true, error = %e, "Planning failed, researching the question itself");
                Vec::new()
            }
        };

        if queries.is_empty() {
            return self.fallback(state);
        }
        info!(node = PLANNER, sub_tasks = queries.len(), "Research plan ready");
        Self::plan_update(queries)
    }

    fn fallback(&self, state: &DebateState) -> DebateUpdate {
        Self::plan_update(vec![state.question.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::nodes::testing::{context, failing_model, ScriptedModel, StaticSearch};
    use crate::debate::state::SubTaskStatus;

    fn deep_state() -> DebateState {
        DebateState::new("Test question").with_deep_research(2, 3)
    }

    #[tokio::test]
    async fn test_planner_creates_pending_sub_tasks() {
        let model = ScriptedModel::new().reply_when(
            "Break the question",
            r#"{"subQueries": [{"query": "Sub 1", "rationale": "r1"}, {"query": "Sub 2", "rationale": "r2"}]}"#,
        );
        let ctx = context(model, StaticSearch::with_items(1));

        let update = Planner::new().compute(&deep_state(), &ctx).await;

        assert_eq!(update.research_plan.unwrap(), vec!["Sub 1", "Sub 2"]);
        let tasks = update.sub_tasks.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.status == SubTaskStatus::Pending && t.depth == 1));
        assert_eq!(update.current_depth, Some(1));
    }

    #[tokio::test]
    async fn test_planner_caps_at_breadth() {
        let model = ScriptedModel::new().reply_when(
            "Break the question",
            r#"{"subQueries": [{"query": "a"}, {"query": "b"}, {"query": "c"}, {"query": "d"}]}"#,
        );
        let ctx = context(model, StaticSearch::with_items(1));

        let update = Planner::new().compute(&deep_state(), &ctx).await;
        assert_eq!(update.sub_tasks.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_planner_model_failure_uses_question() {
        let ctx = context(failing_model(), StaticSearch::with_items(1));

        let update = Planner::new().compute(&deep_state(), &ctx).await;

        assert_eq!(update.research_plan.unwrap(), vec!["Test question"]);
        assert_eq!(update.sub_tasks.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_planner_invalid_json_uses_question() {
        let model = ScriptedModel::new().reply_when("Break the question", "invalid json");
        let ctx = context(model, StaticSearch::with_items(1));

        let update = Planner::new().compute(&deep_state(), &ctx).await;

        assert_eq!(update.research_plan.unwrap(), vec!["Test question"]);
    }
}
