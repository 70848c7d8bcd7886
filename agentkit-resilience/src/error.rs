//! Errors the resilience decorators can return, and how they fold an
//! inner [`AgentError`] through.

use agentkit_core::{AgentError, ErrorKind};
use thiserror::Error;

/// Failures a resilience wrapper can produce on top of (or instead of)
/// the inner handler's own errors.
#[non_exhaustive]
#[derive(Debug, Error, Clone)]
pub enum ResilienceError {
    /// The inner handler did not complete within the configured timeout.
    #[error("agent timed out after {0}ms")]
    Timeout(u64),

    /// All retry attempts were exhausted; carries the last inner error.
    #[error("retries exhausted: {0}")]
    RetriesExhausted(String),

    /// The circuit is open and is rejecting calls.
    #[error("circuit breaker open")]
    CircuitOpen,

    /// The circuit's `max_concurrent_calls` semaphore is exhausted.
    #[error("circuit breaker busy: max concurrent calls reached")]
    CircuitBusy,

    /// The inner handler failed directly (no retry/circuit transformation
    /// applied, e.g. a non-retryable error passed straight through).
    #[error(transparent)]
    Inner(#[from] AgentError),
}

impl ResilienceError {
    /// Classify into the shared [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResilienceError::Timeout(_) => ErrorKind::Timeout,
            ResilienceError::RetriesExhausted(_) => ErrorKind::Transient,
            ResilienceError::CircuitOpen => ErrorKind::CircuitOpen,
            ResilienceError::CircuitBusy => ErrorKind::CircuitBusy,
            ResilienceError::Inner(e) => e.kind(),
        }
    }

    /// Convert into an [`AgentError`] for handlers further up the
    /// decorator stack (every wrapper implements `AgentHandler`, whose
    /// `run` returns `Result<AgentResult, AgentError>`).
    pub fn into_agent_error(self) -> AgentError {
        match self {
            ResilienceError::Inner(e) => e,
            other => AgentError::classified(other.kind(), other.to_string()),
        }
    }
}
