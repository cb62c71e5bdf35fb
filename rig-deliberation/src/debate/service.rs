//! Deliberation service: request in, debate outcome out
//!
//! The transport layer (HTTP, CLI) hands a [`DebateRequest`] to
//! [`Deliberation::run`] and renders the [`DebateOutcome`]. Failures come back
//! as [`DeliberationError`], convertible to the `{error, details}` body.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::config::DebateSettings;
use crate::debate::context::NodeContext;
use crate::debate::state::{DebateState, Finding, ResearchSummary, Winner};
use crate::debate::workflow::{DebateGraph, Topology};
use crate::error::{DeliberationError, InputError};
use crate::llm::{ModelClient, ModelConfig, OpenAiCompatClient};
use crate::pregel::render_trace;
use crate::search::{SearchResult, SearchRouter, SearchStrategy};
use crate::workflow::{CompiledWorkflow, TopologyError};

/// Bounds for the deep research phase; unset fields use the service defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepResearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadth: Option<u32>,
}

/// One incoming question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_config: Option<ModelConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_strategy_override: Option<SearchStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_research: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_research_config: Option<DeepResearchConfig>,
}

impl DebateRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            model_config: None,
            search_strategy_override: None,
            deep_research: None,
            deep_research_config: None,
        }
    }

    pub fn with_model_config(mut self, config: ModelConfig) -> Self {
        self.model_config = Some(config);
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.search_strategy_override = Some(strategy);
        self
    }

    pub fn with_deep_research(mut self, config: DeepResearchConfig) -> Self {
        self.deep_research = Some(true);
        self.deep_research_config = Some(config);
        self
    }

    pub fn is_deep(&self) -> bool {
        self.deep_research.unwrap_or(false)
    }

    /// Reject requests that must not start a workflow
    pub fn validate(&self) -> Result<(), InputError> {
        if self.question.trim().is_empty() {
            return Err(InputError::EmptyQuestion);
        }
        if let Some(config) = &self.model_config {
            config.validate()?;
        }
        if let Some(deep) = &self.deep_research_config {
            if deep.max_depth == Some(0) {
                return Err(InputError::InvalidDeepResearch("maxDepth must be at least 1".into()));
            }
            if deep.breadth == Some(0) {
                return Err(InputError::InvalidDeepResearch("breadth must be at least 1".into()));
            }
        }
        Ok(())
    }
}

/// Final state fields a client renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateOutcome {
    pub question: String,
    pub search_results: Vec<SearchResult>,
    pub research_summary: Option<ResearchSummary>,
    pub engine_usage: BTreeMap<String, u32>,
    pub optimistic_answer: String,
    pub optimistic_rebuttal: String,
    pub pessimistic_answer: String,
    pub pessimistic_rebuttal: String,
    pub debate_winner: Winner,
    pub debate_summary: String,
    pub round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_findings: Option<Vec<Finding>>,
}

impl DebateOutcome {
    pub fn from_state(state: DebateState) -> Self {
        let all_findings = state.deep_research_enabled.then_some(state.all_findings);
        Self {
            question: state.question,
            search_results: state.search_results,
            research_summary: state.research_summary,
            engine_usage: state.engine_usage,
            optimistic_answer: state.optimistic_answer,
            optimistic_rebuttal: state.optimistic_rebuttal,
            pessimistic_answer: state.pessimistic_answer,
            pessimistic_rebuttal: state.pessimistic_rebuttal,
            debate_winner: state.debate_winner,
            debate_summary: state.debate_summary,
            round: state.round,
            all_findings,
        }
    }
}

/// Runs debates over compiled topologies, shared across requests
pub struct Deliberation {
    model: Arc<dyn ModelClient>,
    search: Arc<SearchRouter>,
    settings: DebateSettings,
    debate: CompiledWorkflow<DebateState, NodeContext>,
    deep: CompiledWorkflow<DebateState, NodeContext>,
}

impl Deliberation {
    /// Compile the standard and deep research topologies
    pub fn new(
        model: Arc<dyn ModelClient>,
        search: Arc<SearchRouter>,
        settings: DebateSettings,
    ) -> Result<Self, TopologyError> {
        Self::with_topology(model, search, settings, Topology::Standard)
    }

    /// Use `topology` for requests without deep research
    pub fn with_topology(
        model: Arc<dyn ModelClient>,
        search: Arc<SearchRouter>,
        settings: DebateSettings,
        topology: Topology,
    ) -> Result<Self, TopologyError> {
        let runtime = settings.runtime_config();
        let debate = CompiledWorkflow::compile(topology.build()?, runtime.clone());
        let deep = CompiledWorkflow::compile(Topology::DeepResearch.build()?, runtime);
        Ok(Self {
            model,
            search,
            settings,
            debate,
            deep,
        })
    }

    pub fn settings(&self) -> &DebateSettings {
        &self.settings
    }

    /// Graph used for `request`
    pub fn graph_for(&self, request: &DebateRequest) -> &DebateGraph {
        self.workflow_for(request).graph()
    }

    fn workflow_for(&self, request: &DebateRequest) -> &CompiledWorkflow<DebateState, NodeContext> {
        if request.is_deep() {
            &self.deep
        } else {
            &self.debate
        }
    }

    fn initial_state(&self, request: &DebateRequest) -> DebateState {
        let strategy = request
            .search_strategy_override
            .unwrap_or(self.settings.default_strategy);
        let state = DebateState::new(request.question.trim())
            .with_strategy(strategy)
            .with_max_rounds(self.settings.max_rounds);
        if !request.is_deep() {
            return state;
        }
        let config = request.deep_research_config.clone().unwrap_or_default();
        state.with_deep_research(
            config.max_depth.unwrap_or(self.settings.max_depth),
            config.breadth.unwrap_or(self.settings.breadth),
        )
    }

    /// Per-request model, which also takes over model classification
    fn context_for(&self, request: &DebateRequest) -> Result<NodeContext, InputError> {
        let Some(config) = &request.model_config else {
            return Ok(NodeContext::new(
                Arc::clone(&self.model),
                Arc::clone(&self.search),
                self.settings.clone(),
            ));
        };
        let model: Arc<dyn ModelClient> = Arc::new(OpenAiCompatClient::new(config.clone())?);
        let search = if self.search.has_classifier() {
            Arc::new(self.search.with_classifier_model(Arc::clone(&model)))
        } else {
            Arc::clone(&self.search)
        };
        Ok(NodeContext::new(model, search, self.settings.clone()))
    }

    /// Validate, run one workflow and project the final state
    pub async fn run(&self, request: DebateRequest) -> Result<DebateOutcome, DeliberationError> {
        request.validate()?;
        let ctx = self.context_for(&request)?;
        let state = self.initial_state(&request);
        let workflow = self.workflow_for(&request);

        let span = info_span!("debate", workflow = %workflow.name(), model = %ctx.model.name());
        let result = workflow.run(state, &ctx).instrument(span).await?;

        info!(
            supersteps = result.supersteps,
            winner = ?result.state.debate_winner,
            round = result.state.round,
            trace = %render_trace(&result.trace),
            "Debate finished"
        );
        Ok(DebateOutcome::from_state(result.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::nodes::testing::{context, failing_model, StaticSearch};
    use crate::search::QueryClassifier;

    fn service(settings: DebateSettings, classify_with_model: bool) -> Deliberation {
        let ctx = context(failing_model(), StaticSearch::with_items(1));
        let mut router = (*ctx.search).clone();
        if classify_with_model {
            router = router.with_classifier(QueryClassifier::new(Arc::clone(&ctx.model)));
        }
        Deliberation::new(ctx.model, Arc::new(router), settings).unwrap()
    }

    #[test]
    fn test_validate_rejects_blank_question() {
        assert_eq!(DebateRequest::new("   ").validate(), Err(InputError::EmptyQuestion));
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let request = DebateRequest::new("q").with_deep_research(DeepResearchConfig {
            max_depth: Some(0),
            breadth: None,
        });
        assert!(matches!(request.validate(), Err(InputError::InvalidDeepResearch(_))));
    }

    #[test]
    fn test_validate_rejects_incomplete_model_config() {
        let request = DebateRequest::new("q").with_model_config(ModelConfig::new("http://m", "", "k"));
        assert_eq!(
            request.validate(),
            Err(InputError::IncompleteModelConfig("modelName"))
        );
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: DebateRequest = serde_json::from_str(
            r#"{"question": "什么是ETF", "searchStrategyOverride": "duckduckgo",
                "deepResearch": true, "deepResearchConfig": {"maxDepth": 3}}"#,
        )
        .unwrap();
        assert_eq!(request.search_strategy_override, Some(SearchStrategy::DuckDuckGo));
        assert!(request.is_deep());
        assert_eq!(request.deep_research_config.unwrap().max_depth, Some(3));
    }

    #[test]
    fn test_outcome_hides_findings_without_deep_research() {
        let outcome = DebateOutcome::from_state(DebateState::new("q"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("allFindings").is_none());
        assert_eq!(json["debateWinner"], "draw");

        let deep = DebateOutcome::from_state(DebateState::new("q").with_deep_research(1, 1));
        assert_eq!(deep.all_findings, Some(Vec::new()));
    }

    #[test]
    fn test_zero_depth_settings_still_allow_one_level() {
        let settings: DebateSettings = serde_json::from_str(r#"{"max_depth": 0, "breadth": 0}"#).unwrap();
        let service = service(settings, false);
        let request = DebateRequest::new("q").with_deep_research(DeepResearchConfig::default());

        let state = service.initial_state(&request);

        assert_eq!(state.max_depth, 1);
        assert_eq!(state.breadth, 1);
    }

    #[test]
    fn test_request_model_takes_over_classification() {
        let service = service(DebateSettings::instant(), true);
        let request = DebateRequest::new("q").with_model_config(ModelConfig::new("http://localhost:9", "m", "k"));

        let ctx = service.context_for(&request).unwrap();

        assert!(!Arc::ptr_eq(&ctx.search, &service.search));
        assert!(ctx.search.has_classifier());
        assert!(!Arc::ptr_eq(&ctx.model, &service.model));
    }

    #[test]
    fn test_default_model_shares_router() {
        let service = service(DebateSettings::instant(), true);

        let ctx = service.context_for(&DebateRequest::new("q")).unwrap();

        assert!(Arc::ptr_eq(&ctx.search, &service.search));
        assert!(Arc::ptr_eq(&ctx.model, &service.model));
    }
}
