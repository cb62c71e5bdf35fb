//! Adapter for using Rig Agents as a `ModelClient`
//!
//! Any provider Rig supports (Ollama, OpenAI, Anthropic, ...) can back the
//! debate workflow: build an `Agent<M>` with the provider's client and wrap it.
//!
//! ```rust,ignore
//! use rig::providers::ollama;
//! use rig::client::{CompletionClient, ProviderClient};
//! use rig_deliberation::compat::RigModelClient;
//!
//! let client = ollama::Client::from_env();
//! let agent = client.agent("llama3.2").preamble("Answer in JSON when asked.").build();
//! let model = RigModelClient::with_name(agent, "llama3.2");
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use rig::agent::Agent;
use rig::completion::{CompletionModel, Prompt};

use crate::error::ModelError;
use crate::llm::{ModelClient, ModelResponse};

/// Wraps a Rig `Agent<M>` so nodes can call it through [`ModelClient`]
pub struct RigModelClient<M>
where
    M: CompletionModel + Send + Sync,
{
    agent: Arc<Agent<M>>,
    model_name: String,
}

impl<M> RigModelClient<M>
where
    M: CompletionModel + Send + Sync,
{
    pub fn new(agent: Agent<M>) -> Self {
        Self::with_name(agent, "rig-agent")
    }

    /// Create adapter with a model name for logging
    pub fn with_name(agent: Agent<M>, model_name: impl Into<String>) -> Self {
        Self {
            agent: Arc::new(agent),
            model_name: model_name.into(),
        }
    }

    /// Get a reference to the inner Rig agent
    pub fn agent(&self) -> &Agent<M> {
        &self.agent
    }
}

#[async_trait]
impl<M> ModelClient for RigModelClient<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    async fn invoke(&self, prompt: &str) -> Result<ModelResponse, ModelError> {
        let content = self
            .agent
            .prompt(prompt)
            .await
            .map_err(|e| ModelError::Completion(format!("Rig agent error: {}", e)))?;

        if content.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(ModelResponse::new(content))
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_adapter_is_model_client<M: CompletionModel + Send + Sync + 'static>() {
        fn assert_client<T: ModelClient>() {}
        assert_client::<RigModelClient<M>>();
    }
}
