use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

use super::PARALLEL_RESEARCH;
use crate::debate::context::NodeContext;
use crate::debate::state::{DebateState, DebateUpdate, Finding, SubTaskStatus};
use crate::pregel::{Vertex, VertexId};
use crate::search::SearchResult;

/// Searches every pending sub-task concurrently
///
/// Sub-task `i` starts after `i * parallel_stagger` so a burst of queries does
/// not hit the provider at the same instant.
pub struct ParallelResearch {
    id: VertexId,
}

impl ParallelResearch {
    pub fn new() -> Self {
        Self {
            id: VertexId::from(PARALLEL_RESEARCH),
        }
    }
}

impl Default for ParallelResearch {
    fn default() -> Self {
        Self::new()
    }
}

fn finding_from(result: &SearchResult, depth: u32, limit: usize) -> Finding {
    let items = &result.items[..result.items.len().min(limit)];
    Finding {
        query: result.query.clone(),
        content: items
            .iter()
            .map(|i| format!("{}: {}", i.title, i.description))
            .collect::<Vec<_>>()
            .join("\n"),
        depth,
        sources: items.iter().map(|i| i.url.clone()).collect(),
    }
}

#[async_trait]
impl Vertex<DebateState, NodeContext> for ParallelResearch {
    fn id(&self) -> &VertexId {
        &self.id
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &["sub_tasks", "all_findings"]
    }

    async fn compute(&self, state: &DebateState, ctx: &NodeContext) -> DebateUpdate {
        let pending: Vec<usize> = state
            .sub_tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status == SubTaskStatus::Pending)
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return DebateUpdate::default();
        }

        let mut sub_tasks = state.sub_tasks.clone();
        for &i in &pending {
            sub_tasks[i].transition(SubTaskStatus::Researching);
        }
        info!(node = PARALLEL_RESEARCH, count = pending.len(), depth = state.current_depth, "Researching sub-tasks");

        let stagger = ctx.settings.parallel_stagger;
        let searches = pending.iter().enumerate().map(|(n, &i)| {
            let query = sub_tasks[i].query.clone();
            async move {
                let delay = stagger * n as u32;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                ctx.search.route(&query, Some(state.search_strategy), None).await
            }
        });
        let results = join_all(searches).await;

        let limit = ctx.settings.subtask_results;
        let mut all_findings = state.all_findings.clone();
        for (&i, result) in pending.iter().zip(results) {
            let task = &mut sub_tasks[i];
            if result.error {
                warn!(node = PARALLEL_RESEARCH, query = %task.query, reasoning = %result.reasoning, "Sub-task search failed");
                task.transition(SubTaskStatus::Failed);
                continue;
            }

            let finding = finding_from(&result, task.depth, limit);
            task.result = Some(finding.content.clone());
            task.sources = Some(finding.sources.clone());
            task.transition(SubTaskStatus::Completed);
            if !finding.sources.is_empty() {
                all_findings.push(finding);
            }
        }

        DebateUpdate {
            sub_tasks: Some(sub_tasks),
            all_findings: Some(all_findings),
            ..Default::default()
        }
    }

    fn fallback(&self, state: &DebateState) -> DebateUpdate {
        let mut sub_tasks = state.sub_tasks.clone();
        let mut changed = false;
        for task in sub_tasks.iter_mut() {
            changed |= task.transition(SubTaskStatus::Failed);
        }
        if !changed {
            return DebateUpdate::default();
        }
        DebateUpdate {
            sub_tasks: Some(sub_tasks),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::nodes::testing::{context, failing_model, StaticSearch};
    use crate::debate::state::SubTask;
    use crate::pregel::StateUpdate;

    fn state_with(queries: &[&str]) -> DebateState {
        let mut state = DebateState::new("q").with_deep_research(2, 3);
        state.current_depth = 1;
        state.sub_tasks = queries.iter().map(|q| SubTask::pending(*q, 1, None)).collect();
        state
    }

    #[tokio::test]
    async fn test_no_pending_is_noop() {
        let ctx = context(failing_model(), StaticSearch::with_items(1));
        let update = ParallelResearch::new().compute(&DebateState::new("q"), &ctx).await;
        assert!(update.is_empty());
    }

    #[tokio::test]
    async fn test_pending_tasks_complete_with_findings() {
        let search = StaticSearch::with_items(8);
        let ctx = context(failing_model(), search.clone());

        let update = ParallelResearch::new()
            .compute(&state_with(&["Task 1", "Task 2"]), &ctx)
            .await;

        let tasks = update.sub_tasks.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.status == SubTaskStatus::Completed));
        let findings = update.all_findings.unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].query, "Task 1");
        assert_eq!(findings[0].sources.len(), 5);
        assert_eq!(search.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_search_marks_task_failed() {
        let ctx = context(failing_model(), StaticSearch::failing());

        let update = ParallelResearch::new().compute(&state_with(&["Task 1"]), &ctx).await;

        assert_eq!(update.sub_tasks.unwrap()[0].status, SubTaskStatus::Failed);
        assert!(update.all_findings.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_primary_with_failing_fallback_marks_task_failed() {
        // the context's secondary provider always fails
        let ctx = context(failing_model(), StaticSearch::with_items(0));

        let update = ParallelResearch::new().compute(&state_with(&["Task 1"]), &ctx).await;

        let task = &update.sub_tasks.unwrap()[0];
        assert_eq!(task.status, SubTaskStatus::Failed);
        assert!(task.result.is_none());
        assert!(update.all_findings.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finished_tasks_are_not_searched_again() {
        let search = StaticSearch::with_items(1);
        let ctx = context(failing_model(), search.clone());
        let mut state = state_with(&["done", "new"]);
        state.sub_tasks[0].transition(SubTaskStatus::Completed);

        ParallelResearch::new().compute(&state, &ctx).await;

        assert_eq!(search.queries(), vec!["new"]);
    }

    #[test]
    fn test_fallback_fails_pending_tasks() {
        let update = ParallelResearch::new().fallback(&state_with(&["a"]));
        assert_eq!(update.sub_tasks.unwrap()[0].status, SubTaskStatus::Failed);
    }
}
