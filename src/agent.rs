//! # Agent Module
//!
//! Wires concrete clients into the deliberation service:
//! - the model: an OpenAI-compatible endpoint if configured, otherwise a Rig
//!   agent on a local Ollama server
//! - the search router: MCP web search first, DuckDuckGo as fallback, Tavily
//!   when a key is present

use anyhow::{Context, Result};
use rig::client::{CompletionClient, ProviderClient};
use rig::providers::ollama;
use std::sync::Arc;
use tracing::{debug, info};

use rig_deliberation::search::QueryClassifier;
use rig_deliberation::{
    DebateSettings, Deliberation, DuckDuckGoProvider, McpWebSearchProvider, ModelClient, OpenAiCompatClient,
    RigModelClient, SearchRouter, TavilyProvider, Topology,
};

use crate::config::Config;

/// Results requested from the DuckDuckGo fallback
const DUCKDUCKGO_MAX_RESULTS: usize = 10;

// =============================================================================
// SYSTEM PROMPT
// =============================================================================
/// Preamble for the Ollama-backed agent. Every node asks for a JSON object, so
/// the agent is told to answer with nothing else.
const DEBATE_PREAMBLE: &str = r#"
You are a careful analyst taking part in a structured debate workflow.
Each request describes the role you play and the JSON object to return.
Reply with that JSON object only, without commentary or markdown outside it.
"#;

// =============================================================================
// MODEL CLIENT
// =============================================================================
/// Build the process-wide default model client.
pub fn build_model(config: &Config) -> Result<Arc<dyn ModelClient>> {
    if let Some(model_config) = config.model_config() {
        info!(endpoint = %model_config.endpoint, model = %model_config.model_name, "Using OpenAI-compatible model");
        let client = OpenAiCompatClient::new(model_config).context("Invalid model endpoint configuration")?;
        return Ok(Arc::new(client));
    }

    // ollama::Client::from_env() reads OLLAMA_API_BASE_URL
    std::env::set_var("OLLAMA_API_BASE_URL", &config.ollama_host);
    let ollama_client = ollama::Client::from_env();

    debug!(
        host = %config.ollama_host,
        model = %config.ollama_model,
        "Connected to Ollama"
    );

    let agent = ollama_client
        .agent(&config.ollama_model)
        .preamble(DEBATE_PREAMBLE)
        .build();

    Ok(Arc::new(RigModelClient::with_name(agent, config.ollama_model.clone())))
}

// =============================================================================
// SEARCH ROUTER
// =============================================================================
/// Build the search router from the configured providers.
pub fn build_router(config: &Config, model: Arc<dyn ModelClient>, settings: &DebateSettings) -> SearchRouter {
    let primary = McpWebSearchProvider::new(&config.mcp_websearch_url, config.mcp_websearch_api_key.clone());
    let secondary = DuckDuckGoProvider::new(DUCKDUCKGO_MAX_RESULTS);

    let mut router = SearchRouter::new(Arc::new(primary), Arc::new(secondary))
        .with_retry(settings.search_retry.clone())
        .with_default_strategy(settings.default_strategy);

    if let Some(key) = &config.tavily_api_key {
        router = router.with_premium(Arc::new(TavilyProvider::new(key)));
    }
    if settings.llm_classification {
        router = router.with_classifier(QueryClassifier::new(model));
    }

    info!(
        strategy = %settings.default_strategy,
        premium = router.has_premium(),
        llm_classification = settings.llm_classification,
        "Search router configured"
    );
    router
}

// =============================================================================
// SERVICE
// =============================================================================
/// Assemble the deliberation service.
pub fn build_service(config: &Config, settings: DebateSettings, topology: Topology) -> Result<Deliberation> {
    let model = build_model(config)?;
    let router = build_router(config, Arc::clone(&model), &settings);
    Deliberation::with_topology(model, Arc::new(router), settings, topology)
        .context("Debate topology failed validation")
}
