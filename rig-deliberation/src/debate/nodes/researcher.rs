use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{NO_RESEARCH_DATA, RESEARCHER, SUMMARY_UNAVAILABLE};
use crate::debate::context::NodeContext;
use crate::debate::prompts;
use crate::debate::state::{DebateState, DebateUpdate, ResearchSummary};
use crate::llm::extract_as;
use crate::pregel::{Vertex, VertexId};
use crate::search::SearchResult;

#[derive(Debug, Deserialize)]
struct QueryPlan {
    #[serde(default)]
    queries: Vec<String>,
}

/// Proposes queries, runs them through the router and summarizes the results
pub struct Researcher {
    id: VertexId,
}

impl Researcher {
    pub fn new() -> Self {
        Self {
            id: VertexId::from(RESEARCHER),
        }
    }

    async fn plan_queries(&self, state: &DebateState, ctx: &NodeContext) -> Vec<String> {
        let max_queries = ctx.settings.max_queries.max(1);
        let prompt = prompts::research_queries(&state.question, max_queries);

        let planned = match ctx.invoke(&prompt).await {
            Ok(response) => extract_as::<QueryPlan>(&response.content)
                .map(|plan| plan.queries)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let queries: Vec<String> = match planned {
            Ok(queries) => queries
                .into_iter()
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty())
                .take(max_queries)
                .collect(),
            Err(e) => {
                warn!(node = RESEARCHER, degraded = true, error = %e, "Query planning failed, searching the question itself");
                Vec::new()
            }
        };

        if queries.is_empty() {
            vec![state.question.clone()]
        } else {
            queries
        }
    }

    async fn summarize(&self, state: &DebateState, results: &[SearchResult], ctx: &NodeContext) -> ResearchSummary {
        if results.iter().all(SearchResult::is_empty) {
            return ResearchSummary {
                summary: format!("{NO_RESEARCH_DATA} for this question."),
                ..Default::default()
            };
        }

        let compact: Vec<_> = results
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| {
                json!({
                    "query": r.query,
                    "results": r.items.iter().map(|i| json!({
                        "title": i.title,
                        "url": i.url,
                        "description": i.description,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();
        let serialized = serde_json::to_string(&compact).unwrap_or_default();
        let prompt = prompts::research_summary(&state.question, &serialized, ctx.settings.summary_input_chars);

        let parsed = match ctx.invoke(&prompt).await {
            Ok(response) => extract_as::<ResearchSummary>(&response.content).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match parsed {
            Ok(summary) => summary,
            Err(e) => {
                warn!(node = RESEARCHER, degraded = true, error = %e, "Summarization failed, keeping raw results");
                unavailable(&e)
            }
        }
    }
}

impl Default for Researcher {
    fn default() -> Self {
        Self::new()
    }
}

fn unavailable(reason: &str) -> ResearchSummary {
    ResearchSummary {
        summary: format!("{SUMMARY_UNAVAILABLE}: {reason}"),
        ..Default::default()
    }
}

#[async_trait]
impl Vertex<DebateState, NodeContext> for Researcher {
    fn id(&self) -> &VertexId {
        &self.id
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &["search_results", "research_summary", "engine_usage"]
    }

    async fn compute(&self, state: &DebateState, ctx: &NodeContext) -> DebateUpdate {
        let queries = self.plan_queries(state, ctx).await;
        info!(node = RESEARCHER, queries = ?queries, "Researching");

        let results = ctx
            .search
            .batch(&queries, Some(state.search_strategy), ctx.settings.search_delay)
            .await;

        let mut engine_usage = state.engine_usage.clone();
        for result in results.iter().filter(|r| !r.error) {
            *engine_usage.entry(result.provider.to_string()).or_insert(0) += 1;
        }
        debug!(node = RESEARCHER, usage = ?engine_usage, "Engine usage");

        let summary = self.summarize(state, &results, ctx).await;

        let mut search_results = state.search_results.clone();
        search_results.extend(results);

        DebateUpdate {
            search_results: Some(search_results),
            research_summary: Some(Some(summary)),
            engine_usage: Some(engine_usage),
            ..Default::default()
        }
    }

    fn fallback(&self, _state: &DebateState) -> DebateUpdate {
        DebateUpdate {
            research_summary: Some(Some(unavailable("research timed out"))),
            ..Default::default()
        }
    }
}
