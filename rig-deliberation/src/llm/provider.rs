//! Model client trait definition
//!
//! The workflow needs exactly one capability from a language model: send a
//! prompt, get text back. Anything richer (tools, streaming, history) stays
//! outside the engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Model completion response
///
/// `content` is untrusted text: it may or may not contain well-formed JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub content: String,
}

impl ModelResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Stateless completion call shared by every node
///
/// Implementations must be safe for concurrent use: fan-out siblings invoke
/// the same client at the same time.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use rig_deliberation::llm::{ModelClient, ModelResponse};
/// use rig_deliberation::error::ModelError;
///
/// struct EchoModel;
///
/// #[async_trait]
/// impl ModelClient for EchoModel {
///     async fn invoke(&self, prompt: &str) -> Result<ModelResponse, ModelError> {
///         Ok(ModelResponse::new(prompt))
///     }
///
///     fn name(&self) -> &str { "echo" }
/// }
/// ```
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run a single completion for `prompt`
    async fn invoke(&self, prompt: &str) -> Result<ModelResponse, ModelError>;

    /// Client name for logging
    fn name(&self) -> &str;
}
