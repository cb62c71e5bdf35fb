//! Pregel runtime configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Maximum supersteps before forced termination
    pub max_supersteps: usize,

    /// Timeout for an individual vertex computation (None = unbounded)
    #[serde(default, with = "humantime_serde")]
    pub vertex_timeout: Option<Duration>,

    /// Timeout for the entire workflow (None = unbounded)
    #[serde(default, with = "humantime_serde")]
    pub workflow_timeout: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_supersteps: 64,
            vertex_timeout: Some(Duration::from_secs(180)),
            workflow_timeout: None,
        }
    }
}

impl RuntimeConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum supersteps
    pub fn with_max_supersteps(mut self, max: usize) -> Self {
        self.max_supersteps = max.max(1);
        self
    }

    /// Set vertex timeout
    pub fn with_vertex_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.vertex_timeout = timeout;
        self
    }

    /// Set workflow timeout
    pub fn with_workflow_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.workflow_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_supersteps, 64);
        assert_eq!(config.vertex_timeout, Some(Duration::from_secs(180)));
        assert!(config.workflow_timeout.is_none());
    }

    #[test]
    fn test_max_supersteps_minimum() {
        let config = RuntimeConfig::default().with_max_supersteps(0);
        assert_eq!(config.max_supersteps, 1);
    }

    #[test]
    fn test_deserialize_humantime() {
        let config: RuntimeConfig = serde_json::from_str(
            r#"{"max_supersteps": 8, "vertex_timeout": "2s", "workflow_timeout": null}"#,
        )
        .unwrap();
        assert_eq!(config.vertex_timeout, Some(Duration::from_secs(2)));
        assert!(config.workflow_timeout.is_none());
    }
}
