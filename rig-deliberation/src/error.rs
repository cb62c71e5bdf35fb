// src/error.rs
//! Error types shared across the crate
//!
//! Node-local failures (`ParseError`, `ModelError`, `SearchError`) are recovered
//! inside the issuing node. Only `InputError` and engine defects reach the caller,
//! wrapped in `DeliberationError`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pregel::ExecutionError;
use crate::workflow::TopologyError;

/// Invalid request, rejected before a workflow starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("model config is missing {0}")]
    IncompleteModelConfig(&'static str),

    #[error("invalid deep research config: {0}")]
    InvalidDeepResearch(String),
}

/// Model output could not be read as the expected structure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no structured content found in model output")]
    NoStructuredContent,

    #[error("structured content has unexpected shape: {0}")]
    InvalidShape(String),
}

/// Failure of a single model invocation
#[derive(Error, Debug, Clone)]
pub enum ModelError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check credential")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("HTTP error ({0}): {1}")]
    Http(u16, String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Completion failed: {0}")]
    Completion(String),
}

impl ModelError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Unauthorized => false,
            ModelError::Http(status, _) => *status >= 500,
            _ => true,
        }
    }
}

/// Failure of a single search provider call
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Missing credential for {0}")]
    MissingCredential(&'static str),

    #[error("Unauthorized - check API key")]
    Unauthorized,

    #[error("Rate limited by search provider")]
    RateLimited,

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl SearchError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::Timeout
                | SearchError::Connection(_)
                | SearchError::Network(_)
                | SearchError::RateLimited
                | SearchError::ServerError(_, _)
        )
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if e.is_connect() {
            SearchError::Connection(e.to_string())
        } else {
            SearchError::Network(e.to_string())
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ModelError::Timeout
        } else if e.is_connect() {
            ModelError::Connection(e.to_string())
        } else {
            ModelError::Network(e.to_string())
        }
    }
}

/// Top-level error returned by [`crate::debate::Deliberation::run`]
#[derive(Error, Debug)]
pub enum DeliberationError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Invalid workflow topology: {0}")]
    Topology(#[from] TopologyError),

    #[error("Workflow execution failed: {0}")]
    Execution(#[from] ExecutionError),
}

impl DeliberationError {
    /// True when the caller sent a bad request rather than hitting a defect
    pub fn is_client_error(&self) -> bool {
        matches!(self, DeliberationError::Input(_))
    }

    /// Structured failure body for the transport layer
    pub fn to_body(&self) -> ErrorBody {
        match self {
            DeliberationError::Input(e) => ErrorBody {
                error: "Invalid request".to_string(),
                details: Some(e.to_string()),
            },
            other => ErrorBody {
                error: "Internal workflow error".to_string(),
                details: Some(other.to_string()),
            },
        }
    }
}

/// Failure output: `{error, details?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types_are_send_sync() {
        static_assertions::assert_impl_all!(InputError: Send, Sync);
        static_assertions::assert_impl_all!(ParseError: Send, Sync);
        static_assertions::assert_impl_all!(ModelError: Send, Sync);
        static_assertions::assert_impl_all!(SearchError: Send, Sync);
        static_assertions::assert_impl_all!(DeliberationError: Send, Sync);
    }

    #[test]
    fn test_search_error_retryable() {
        assert!(SearchError::Timeout.is_retryable());
        assert!(SearchError::RateLimited.is_retryable());
        assert!(SearchError::ServerError(502, String::new()).is_retryable());

        assert!(!SearchError::Unauthorized.is_retryable());
        assert!(!SearchError::MissingCredential("tavily").is_retryable());
        assert!(!SearchError::ParseError("bad".into()).is_retryable());
    }

    #[test]
    fn test_model_error_retryable() {
        assert!(ModelError::Timeout.is_retryable());
        assert!(ModelError::Http(503, String::new()).is_retryable());
        assert!(!ModelError::Http(404, String::new()).is_retryable());
        assert!(!ModelError::Unauthorized.is_retryable());
    }

    #[test]
    fn test_error_body_mapping() {
        let input: DeliberationError = InputError::EmptyQuestion.into();
        assert!(input.is_client_error());
        let body = input.to_body();
        assert_eq!(body.error, "Invalid request");
        assert!(body.details.unwrap().contains("question"));

        let exec: DeliberationError = ExecutionError::MaxSuperstepsExceeded(3).into();
        assert!(!exec.is_client_error());
        assert_eq!(exec.to_body().error, "Internal workflow error");
    }

    #[test]
    fn test_error_body_serialization_skips_empty_details() {
        let body = ErrorBody {
            error: "boom".into(),
            details: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }
}
