//! OpenAI-compatible chat completion client
//!
//! Speaks the `/chat/completions` dialect most hosted and self-hosted model
//! servers accept. Built from a [`ModelConfig`] so each request can target its
//! own endpoint and credential.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::config::ModelConfig;
use super::extract::content_to_string;
use super::provider::{ModelClient, ModelResponse};
use crate::error::{InputError, ModelError};

/// Chat completion client for OpenAI-compatible endpoints
pub struct OpenAiCompatClient {
    client: Client,
    config: ModelConfig,
}

impl OpenAiCompatClient {
    /// Create a client, validating the config first
    pub fn new(config: ModelConfig) -> Result<Self, InputError> {
        config.validate()?;
        Ok(Self {
            client: Client::new(),
            config,
        })
    }

    /// Reuse an existing connection pool
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Value,
}

#[async_trait]
impl ModelClient for OpenAiCompatClient {
    async fn invoke(&self, prompt: &str) -> Result<ModelResponse, ModelError> {
        let request = ChatRequest {
            model: &self.config.model_name,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model_name, prompt_chars = prompt.len(), "Invoking model");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.credential)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => ModelError::Unauthorized,
                429 => ModelError::RateLimited,
                code => ModelError::Http(code, error_text),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Completion(format!("invalid response body: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| content_to_string(&choice.message.content))
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }

        Ok(ModelResponse::new(content))
    }

    fn name(&self) -> &str {
        &self.config.model_name
    }
}


/// HTTP tests with a mocked endpoint
#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> OpenAiCompatClient {
        OpenAiCompatClient::new(ModelConfig::new(server.uri(), "test-model", "sk-test")).unwrap()
    }

    #[tokio::test]
    async fn test_http_successful_completion() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"answer\": \"x\"}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server).await.invoke("hi").await.unwrap();
        assert_eq!(response.content, r#"{"answer": "x"}"#);
    }

    #[tokio::test]
    async fn test_http_content_parts_flattened() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": [
                    {"type": "text", "text": "part one "},
                    {"type": "text", "text": "part two"}
                ]}}]
            })))
            .mount(&server)
            .await;

        let response = client_for(&server).await.invoke("hi").await.unwrap();
        assert_eq!(response.content, "part one part two");
    }

    #[tokio::test]
    async fn test_http_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let result = client_for(&server).await.invoke("hi").await;
        assert!(matches!(result, Err(ModelError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_http_server_error_is_retryable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.invoke("hi").await.unwrap_err();
        assert!(matches!(err, ModelError::Http(503, _)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_http_empty_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let result = client_for(&server).await.invoke("hi").await;
        assert!(matches!(result, Err(ModelError::EmptyResponse)));
    }
}
