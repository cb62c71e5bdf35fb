//! Debate tunables
//!
//! `DebateSettings` is plain data; the binary fills it from CLI flags and
//! environment variables, tests zero out every delay.
//!
//! # Example
//!
//! ```
//! use rig_deliberation::config::DebateSettings;
//! use std::time::Duration;
//!
//! let settings = DebateSettings::default()
//!     .with_max_rounds(3)
//!     .with_search_delay(Duration::ZERO);
//! assert_eq!(settings.max_rounds, 3);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::pregel::RuntimeConfig;
use crate::retry::RetryPolicy;
use crate::search::SearchStrategy;

/// Library-level configuration for one debate service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateSettings {
    /// Decider passes allowed in looping topologies
    pub max_rounds: u32,

    /// Pause between Researcher queries
    #[serde(with = "humantime_serde")]
    pub search_delay: Duration,

    /// Start offset per sub-task index in ParallelResearch
    #[serde(with = "humantime_serde")]
    pub parallel_stagger: Duration,

    /// Character budget for serialized results sent to the summarizer
    pub summary_input_chars: usize,

    /// Character cap for each side's answer in the Decider prompt
    pub decider_answer_chars: usize,

    /// Upper bound on queries the Researcher will run
    pub max_queries: usize,

    /// Items kept per sub-task in ParallelResearch
    pub subtask_results: usize,

    pub model_retry: RetryPolicy,

    pub search_retry: RetryPolicy,

    /// Per-vertex deadline; a vertex that overruns degrades to its fallback
    #[serde(with = "humantime_serde")]
    pub node_timeout: Option<Duration>,

    pub max_supersteps: usize,

    pub default_strategy: SearchStrategy,

    /// Classify queries with the model instead of keyword rules
    pub llm_classification: bool,

    pub max_depth: u32,

    pub breadth: u32,
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            max_rounds: 2,
            search_delay: Duration::from_millis(1500),
            parallel_stagger: Duration::from_millis(100),
            summary_input_chars: 8000,
            decider_answer_chars: 6000,
            max_queries: 3,
            subtask_results: 5,
            model_retry: RetryPolicy::new(2).with_backoff_base(Duration::from_secs(1)),
            search_retry: RetryPolicy::new(1)
                .with_backoff_base(Duration::from_millis(500))
                .with_jitter(Duration::from_millis(500)),
            node_timeout: Some(Duration::from_secs(180)),
            max_supersteps: 64,
            default_strategy: SearchStrategy::Smart,
            llm_classification: false,
            max_depth: 2,
            breadth: 3,
        }
    }
}

impl DebateSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn with_parallel_stagger(mut self, stagger: Duration) -> Self {
        self.parallel_stagger = stagger;
        self
    }

    pub fn with_model_retry(mut self, policy: RetryPolicy) -> Self {
        self.model_retry = policy;
        self
    }

    pub fn with_search_retry(mut self, policy: RetryPolicy) -> Self {
        self.search_retry = policy;
        self
    }

    pub fn with_node_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.node_timeout = timeout;
        self
    }

    pub fn with_default_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    pub fn with_llm_classification(mut self, enabled: bool) -> Self {
        self.llm_classification = enabled;
        self
    }

    pub fn with_deep_research(mut self, max_depth: u32, breadth: u32) -> Self {
        self.max_depth = max_depth.max(1);
        self.breadth = breadth.max(1);
        self
    }

    /// No sleeps anywhere: zero pacing, zero backoff, no node deadline
    pub fn instant() -> Self {
        let no_wait = |policy: RetryPolicy| policy.with_backoff_base(Duration::ZERO).with_jitter(Duration::ZERO);
        let defaults = Self::default();
        Self {
            search_delay: Duration::ZERO,
            parallel_stagger: Duration::ZERO,
            model_retry: no_wait(defaults.model_retry.clone()),
            search_retry: no_wait(defaults.search_retry.clone()),
            node_timeout: None,
            ..defaults
        }
    }

    /// Executor configuration derived from these settings
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::default()
            .with_max_supersteps(self.max_supersteps)
            .with_vertex_timeout(self.node_timeout)
    }
}
