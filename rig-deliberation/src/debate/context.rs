//! Per-run context handed to every debate node

use std::sync::Arc;

use crate::config::DebateSettings;
use crate::error::ModelError;
use crate::llm::{ModelClient, ModelResponse};
use crate::retry::{with_retry_if, RetryError};
use crate::search::SearchRouter;

/// Model handle, search router and tunables for one workflow run
///
/// Built per request, so concurrent runs never share a mutable client slot.
#[derive(Clone)]
pub struct NodeContext {
    pub model: Arc<dyn ModelClient>,
    pub search: Arc<SearchRouter>,
    pub settings: DebateSettings,
}

impl NodeContext {
    pub fn new(model: Arc<dyn ModelClient>, search: Arc<SearchRouter>, settings: DebateSettings) -> Self {
        Self {
            model,
            search,
            settings,
        }
    }

    /// Same search and settings, different model
    pub fn with_model(&self, model: Arc<dyn ModelClient>) -> Self {
        Self {
            model,
            search: Arc::clone(&self.search),
            settings: self.settings.clone(),
        }
    }

    /// Invoke the model under the configured retry policy
    pub async fn invoke(&self, prompt: &str) -> Result<ModelResponse, RetryError<ModelError>> {
        with_retry_if(
            &self.settings.model_retry,
            || self.model.invoke(prompt),
            ModelError::is_retryable,
        )
        .await
    }
}

impl std::fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeContext")
            .field("model", &self.model.name())
            .field("settings", &self.settings)
            .finish()
    }
}
