use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

use super::{DEEP_CHECK, NO_RESEARCH_DATA};
use crate::debate::context::NodeContext;
use crate::debate::prompts;
use crate::debate::state::{DataPoint, DebateState, DebateUpdate, Finding, ResearchSummary, SubTask};
use crate::llm::{extract_as, truncate_chars};
use crate::pregel::{Vertex, VertexId};

const FACT_CHARS: usize = 300;
const POINT_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepthVerdict {
    #[serde(default)]
    should_continue: bool,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    new_angles: Vec<String>,
}

/// Build the research summary straight from findings, without the model
pub fn synthesize_findings(findings: &[Finding]) -> ResearchSummary {
    if findings.is_empty() {
        return ResearchSummary {
            summary: format!("{NO_RESEARCH_DATA}: deep research returned no usable results."),
            ..Default::default()
        };
    }

    let depth = findings.iter().map(|f| f.depth).max().unwrap_or(0);
    let sources: BTreeSet<&str> = findings
        .iter()
        .flat_map(|f| f.sources.iter().map(String::as_str))
        .collect();

    ResearchSummary {
        summary: format!(
            "Deep research collected {} findings over {} levels from {} sources.",
            findings.len(),
            depth,
            sources.len()
        ),
        key_facts: findings
            .iter()
            .map(|f| format!("{}: {}", f.query, truncate_chars(&f.content, FACT_CHARS)))
            .collect(),
        data_points: findings
            .iter()
            .filter_map(|f| {
                f.sources.first().map(|source| DataPoint {
                    source: source.clone(),
                    value: truncate_chars(&f.content, POINT_CHARS).to_string(),
                    context: f.query.clone(),
                })
            })
            .collect(),
    }
}

/// Decides between another research level and the final summary
pub struct DeepCheck {
    id: VertexId,
}

impl DeepCheck {
    pub fn new() -> Self {
        Self {
            id: VertexId::from(DEEP_CHECK),
        }
    }

    fn synthesize(state: &DebateState) -> DebateUpdate {
        info!(node = DEEP_CHECK, findings = state.all_findings.len(), depth = state.current_depth, "Synthesizing research");
        DebateUpdate {
            research_summary: Some(Some(synthesize_findings(&state.all_findings))),
            ..Default::default()
        }
    }
}

impl Default for DeepCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Vertex<DebateState, NodeContext> for DeepCheck {
    fn id(&self) -> &VertexId {
        &self.id
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &["research_summary", "sub_tasks", "current_depth"]
    }

    async fn compute(&self, state: &DebateState, ctx: &NodeContext) -> DebateUpdate {
        if state.all_findings.is_empty() || state.current_depth >= state.max_depth {
            return Self::synthesize(state);
        }

        let breadth = state.breadth.max(1);
        let prompt = prompts::deep_check(
            &state.question,
            &state.all_findings,
            state.current_depth,
            state.max_depth,
            breadth,
        );
        let verdict = match ctx.invoke(&prompt).await {
            Ok(response) => extract_as::<DepthVerdict>(&response.content).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let verdict = match verdict {
            Ok(v) => v,
            Err(e) => {
                warn!(node = DEEP_CHECK, degraded = true, error = %e, "Depth check failed, stopping research");
                return Self::synthesize(state);
            }
        };

        let angles: Vec<String> = verdict
            .new_angles
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .take(breadth as usize)
            .collect();
        if !verdict.should_continue || angles.is_empty() {
            info!(node = DEEP_CHECK, reason = %verdict.reason, "Research complete");
            return Self::synthesize(state);
        }

        let next_depth = state.current_depth + 1;
        info!(node = DEEP_CHECK, depth = next_depth, angles = angles.len(), reason = %verdict.reason, "Continuing research");
        let mut sub_tasks = state.sub_tasks.clone();
        sub_tasks.extend(angles.into_iter().map(|a| SubTask::pending(a, next_depth, None)));

        DebateUpdate {
            sub_tasks: Some(sub_tasks),
            current_depth: Some(next_depth),
            ..Default::default()
        }
    }

    fn fallback(&self, state: &DebateState) -> DebateUpdate {
        Self::synthesize(state)
    }
}
