//! # Configuration Module
//!
//! Loads the debate agent's configuration from `.env` and the environment.
//! Command-line flags are applied on top in `main.rs`.

use anyhow::{Context, Result};
use std::env;

use rig_deliberation::llm::ModelConfig;
use rig_deliberation::SearchStrategy;

/// Default MCP-style web search endpoint
pub const DEFAULT_MCP_WEBSEARCH_URL: &str = "https://dashscope.aliyuncs.com/api/v1/mcps/WebSearch";

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Main configuration for the debate agent.
#[derive(Debug, Clone)]
pub struct Config {
    /// The Ollama model used when no OpenAI-compatible endpoint is configured
    pub ollama_model: String,

    /// Ollama server URL (default: http://localhost:11434)
    pub ollama_host: String,

    /// OpenAI-compatible endpoint; when set together with name and key it
    /// replaces Ollama
    pub model_endpoint: Option<String>,
    pub model_name: Option<String>,
    pub model_api_key: Option<String>,

    /// Primary search provider
    pub mcp_websearch_url: String,
    pub mcp_websearch_api_key: Option<String>,

    /// Premium search provider credential
    pub tavily_api_key: Option<String>,

    pub search_strategy: SearchStrategy,

    /// Decider passes allowed in the looping topology
    pub max_rounds: u32,

    /// Classify search queries with the model instead of keyword rules
    pub llm_classification: bool,

    /// Log level for the application
    pub log_level: String,
}

// =============================================================================
// DEFAULT IMPLEMENTATION
// =============================================================================
impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_model: "llama3.2".to_string(),
            ollama_host: "http://localhost:11434".to_string(),
            model_endpoint: None,
            model_name: None,
            model_api_key: None,
            mcp_websearch_url: DEFAULT_MCP_WEBSEARCH_URL.to_string(),
            mcp_websearch_api_key: None,
            tavily_api_key: None,
            search_strategy: SearchStrategy::Smart,
            max_rounds: 2,
            llm_classification: false,
            log_level: "info".to_string(),
        }
    }
}

/// Non-blank value of an environment variable
fn non_blank(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Config::default();

        if let Some(val) = non_blank("OLLAMA_MODEL") {
            config.ollama_model = val;
        }

        if let Some(val) = non_blank("OLLAMA_API_BASE_URL") {
            config.ollama_host = val;
        }

        config.model_endpoint = non_blank("MODEL_ENDPOINT");
        config.model_name = non_blank("MODEL_NAME");
        config.model_api_key = non_blank("MODEL_API_KEY");

        if let Some(val) = non_blank("MCP_WEBSEARCH_URL") {
            config.mcp_websearch_url = val;
        }
        config.mcp_websearch_api_key = non_blank("MCP_WEBSEARCH_API_KEY");
        config.tavily_api_key = non_blank("TAVILY_API_KEY");

        if let Some(val) = non_blank("SEARCH_STRATEGY") {
            config.search_strategy = val
                .parse::<SearchStrategy>()
                .map_err(anyhow::Error::msg)
                .context("SEARCH_STRATEGY must be one of smart, duckduckgo, tavily, mcp-websearch")?;
        }

        if let Some(val) = non_blank("MAX_ROUNDS") {
            config.max_rounds = val
                .parse()
                .context("MAX_ROUNDS must be a valid positive integer")?;
        }

        if let Some(val) = non_blank("LLM_CLASSIFICATION") {
            config.llm_classification = val
                .parse()
                .context("LLM_CLASSIFICATION must be true or false")?;
        }

        if let Some(val) = non_blank("RUST_LOG") {
            config.log_level = val;
        }

        Ok(config)
    }

    /// OpenAI-compatible model settings, if all three parts are present
    pub fn model_config(&self) -> Option<ModelConfig> {
        match (&self.model_endpoint, &self.model_name, &self.model_api_key) {
            (Some(endpoint), Some(name), Some(key)) => Some(ModelConfig::new(endpoint, name, key)),
            _ => None,
        }
    }

    /// Validate the configuration before any client is built.
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            anyhow::bail!("MAX_ROUNDS must be at least 1");
        }

        let parts = [&self.model_endpoint, &self.model_name, &self.model_api_key];
        let set = parts.iter().filter(|p| p.is_some()).count();
        if set != 0 && set != parts.len() {
            anyhow::bail!("MODEL_ENDPOINT, MODEL_NAME and MODEL_API_KEY must be set together");
        }

        if self.model_config().is_none() && self.ollama_model.is_empty() {
            anyhow::bail!("OLLAMA_MODEL cannot be empty");
        }

        if self.search_strategy == SearchStrategy::Tavily && self.tavily_api_key.is_none() {
            tracing::warn!("SEARCH_STRATEGY is tavily but TAVILY_API_KEY is not set; using smart routing");
        }

        Ok(())
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.ollama_model, "llama3.2");
        assert_eq!(config.ollama_host, "http://localhost:11434");
        assert_eq!(config.search_strategy, SearchStrategy::Smart);
        assert_eq!(config.max_rounds, 2);
        assert!(config.model_config().is_none());
    }

    #[test]
    fn test_config_validation_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_rounds() {
        let config = Config {
            max_rounds: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_model_endpoint_rejected() {
        let config = Config {
            model_endpoint: Some("https://api.example.com/v1".into()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_complete_model_endpoint() {
        let config = Config {
            model_endpoint: Some("https://api.example.com/v1".into()),
            model_name: Some("qwen-plus".into()),
            model_api_key: Some("sk-test".into()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.model_config().unwrap().model_name, "qwen-plus");
    }
}
