//! `Retry` — re-invokes the inner handler with exponential backoff and
//! jitter on retryable failures.

use crate::error::ResilienceError;
use agentkit_core::{AgentError, AgentHandler, AgentResult, ErrorKind, Event, State};
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Backoff and retry-eligibility policy.
#[derive(Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try (0 disables
    /// retrying entirely).
    pub max_attempts: u32,
    /// Base delay for the first retry.
    pub base_delay_ms: u64,
    /// Delay ceiling; backoff never exceeds this.
    pub max_delay_ms: u64,
    /// Whether a given failure should be retried. Defaults to matching
    /// `Timeout` and `Transient`.
    pub retryable: Arc<dyn Fn(&AgentError) -> bool + Send + Sync>,
}

impl std::fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay_ms", &self.base_delay_ms)
            .field("max_delay_ms", &self.max_delay_ms)
            .finish_non_exhaustive()
    }
}

fn default_retryable(err: &AgentError) -> bool {
    matches!(err.kind(), ErrorKind::Timeout | ErrorKind::Transient)
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 10_000,
            retryable: Arc::new(default_retryable),
        }
    }
}

impl RetryConfig {
    /// No retries: the wrapper becomes a transparent pass-through.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exp = self.base_delay_ms as f64 * 2f64.powi(attempt as i32 - 1);
        let capped = exp.min(self.max_delay_ms as f64);
        let jitter = rand::thread_rng().gen_range(0.9..=1.1); // +/-10%
        Duration::from_millis((capped * jitter).max(0.0) as u64)
    }
}

/// Wraps an inner handler, retrying retryable failures with exponential
/// backoff up to `config.max_attempts` additional attempts.
pub struct Retry {
    inner: Arc<dyn AgentHandler>,
    config: RetryConfig,
}

impl Retry {
    /// Wrap `inner` with the given retry policy.
    pub fn new(inner: Arc<dyn AgentHandler>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl AgentHandler for Retry {
    async fn run(&self, event: &Event, state: &State) -> Result<AgentResult, AgentError> {
        let mut last_error = None;
        for attempt in 0..=self.config.max_attempts {
            match self.inner.run(event, state).await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    if !(self.config.retryable)(&err) {
                        return Err(err);
                    }
                    last_error = Some(err);
                    if attempt < self.config.max_attempts {
                        tokio::time::sleep(self.config.delay_for_attempt(attempt + 1)).await;
                    }
                }
            }
        }
        Err(last_error
            .map(|e| ResilienceError::RetriesExhausted(e.to_string()).into_agent_error())
            .unwrap_or_else(|| ResilienceError::RetriesExhausted("no attempts made".into()).into_agent_error()))
    }
}
