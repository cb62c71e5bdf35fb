//! Per-request model configuration
//!
//! A request may bring its own endpoint, model name and credential. The
//! service turns it into a dedicated client for that request only, so two
//! concurrent requests never share a mutable client handle.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::InputError;

/// Default request timeout for model calls
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(120);

/// Model endpoint configuration
///
/// # Example
///
/// ```
/// use rig_deliberation::llm::ModelConfig;
///
/// let config = ModelConfig::new("https://api.example.com/v1", "qwen-plus", "sk-test")
///     .with_temperature(0.3);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.temperature, Some(0.3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub endpoint: String,

    /// Model identifier
    pub model_name: String,

    /// Bearer credential
    pub credential: String,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_MODEL_TIMEOUT
}

impl ModelConfig {
    pub fn new(
        endpoint: impl Into<String>,
        model_name: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model_name: model_name.into(),
            credential: credential.into(),
            temperature: None,
            timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject configs that cannot possibly reach a model
    pub fn validate(&self) -> Result<(), InputError> {
        if self.endpoint.trim().is_empty() {
            return Err(InputError::IncompleteModelConfig("endpoint"));
        }
        if self.model_name.trim().is_empty() {
            return Err(InputError::IncompleteModelConfig("modelName"));
        }
        if self.credential.trim().is_empty() {
            return Err(InputError::IncompleteModelConfig("credential"));
        }
        Ok(())
    }
}
