//! Retry executor with exponential backoff
//!
//! `with_retry` runs an async operation up to `max_retries + 1` times. Before
//! attempt `n` (n >= 1) it sleeps `backoff_base * 2^(n-1)`, capped at
//! `backoff_max`, plus a random share of the policy's jitter window. Model calls
//! use a zero jitter window; search calls spread their retries out so that
//! parallel sub-tasks do not hammer a scraping-sensitive provider in lockstep.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Retry policy for fallible external calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Base delay for exponential backoff
    #[serde(with = "humantime_serde")]
    pub backoff_base: Duration,

    /// Maximum delay between retries (before jitter)
    #[serde(with = "humantime_serde")]
    pub backoff_max: Duration,

    /// Upper bound of the random delay added to each backoff
    #[serde(with = "humantime_serde")]
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base: Duration::from_millis(1000),
            backoff_max: Duration::from_secs(30),
            jitter: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Set backoff base duration
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Set maximum backoff duration
    pub fn with_backoff_max(mut self, max: Duration) -> Self {
        self.backoff_max = max;
        self
    }

    /// Set the jitter window
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Create a no-retry policy
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Total attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Deterministic part of the delay before `attempt` (1-based retry index)
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let multiplier = 2u32.saturating_pow(attempt - 1);
        self.backoff_base
            .saturating_mul(multiplier)
            .min(self.backoff_max)
    }

    /// Delay before `attempt`, including jitter
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let backoff = self.backoff_for_attempt(attempt);
        if self.jitter.is_zero() || attempt == 0 {
            return backoff;
        }
        backoff + self.jitter.mul_f64(rand::random::<f64>())
    }
}

/// Uniform failure after the retry budget is spent
#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("Failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: E },
}

impl<E> RetryError<E> {
    /// Number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// The error returned by the final attempt
    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Exhausted { last_error, .. } => last_error,
        }
    }

    pub fn into_last_error(self) -> E {
        match self {
            RetryError::Exhausted { last_error, .. } => last_error,
        }
    }
}

/// Retry `operation` on every error
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    with_retry_if(policy, operation, |_| true).await
}

/// Retry `operation` while `should_retry` accepts the error
///
/// A rejected error ends the loop immediately and is reported as exhausted
/// with the attempts made so far.
pub async fn with_retry_if<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut operation: F,
    should_retry: P,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt: u32 = 0;

    loop {
        if attempt > 0 {
            let delay = policy.delay_for_attempt(attempt);
            debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying operation");
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= policy.max_retries || !should_retry(&e) => {
                return Err(RetryError::Exhausted {
                    attempts: attempt + 1,
                    last_error: e,
                });
            }
            Err(e) => {
                warn!(attempt, error = %e, "Attempt failed, will retry");
                attempt += 1;
            }
        }
    }
}
