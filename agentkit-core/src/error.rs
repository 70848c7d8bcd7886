//! The error taxonomy shared across the core, and the agent-facing error type.
//!
//! [`ErrorKind`] is the closed set of failure categories every wrapper and
//! orchestrator in the workspace classifies into. Each crate downstream
//! (`agentkit-resilience`, `agentkit-orch`, `agentkit-runtime`) defines its
//! own `thiserror` error enum for its own failure modes, but every one of
//! them exposes a `kind() -> ErrorKind` so the route orchestrator's
//! `error_routing` table can dispatch on a single vocabulary regardless of
//! which layer produced the failure.

use thiserror::Error;

/// The closed set of failure categories.
///
/// Not a language type per agent — a classification every agent error,
/// wrapper error, and orchestrator error collapses into for the purposes
/// of error routing and retry/circuit-breaker policy.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No target could be resolved for an event.
    Routing,
    /// Event or state failed a precondition.
    Validation,
    /// A deadline was exceeded at some wrapper or orchestrator.
    Timeout,
    /// A network-like or rate-limited failure deemed safe to retry.
    Transient,
    /// A circuit breaker rejected the call because it is open.
    CircuitOpen,
    /// A circuit breaker rejected the call because concurrency is saturated.
    CircuitBusy,
    /// The intake queue rejected the event.
    QueueFull,
    /// An unknown agent, tool, or session was referenced.
    NotFound,
    /// An irrecoverable invariant violation. Bypasses error routing.
    Critical,
    /// Anything else.
    Unknown,
}

/// The error type returned by [`crate::agent::AgentHandler::run`].
///
/// Agents are free to return any variant; resilience wrappers classify
/// failures via [`AgentError::kind`] to decide whether to retry, and the
/// route orchestrator consults the same classification to pick an error
/// handler.
#[non_exhaustive]
#[derive(Debug, Error, Clone)]
pub enum AgentError {
    /// The event or state failed a precondition the agent requires.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The agent's work did not complete within its deadline.
    #[error("timed out: {0}")]
    Timeout(String),

    /// A transient, retry-safe failure (network blip, rate limit, ...).
    #[error("transient failure: {0}")]
    Transient(String),

    /// A referenced agent, tool, or session does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An irrecoverable invariant violation. Should escalate outside the
    /// normal error-routing flow.
    #[error("critical: {0}")]
    Critical(String),

    /// A pre-classified failure, used by wrappers (timeout/retry/circuit
    /// breaker) and orchestrators that need to report a specific
    /// [`ErrorKind`] without shoehorning it into one of the named variants
    /// above (e.g. `CircuitOpen`, `CircuitBusy`, `QueueFull`).
    #[error("{message}")]
    Classified {
        /// The classified failure kind.
        kind: ErrorKind,
        /// Human-readable detail.
        message: String,
    },

    /// Catch-all for anything that doesn't fit the named variants.
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Classify this error into the shared [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Validation(_) => ErrorKind::Validation,
            AgentError::Timeout(_) => ErrorKind::Timeout,
            AgentError::Transient(_) => ErrorKind::Transient,
            AgentError::NotFound(_) => ErrorKind::NotFound,
            AgentError::Critical(_) => ErrorKind::Critical,
            AgentError::Classified { kind, .. } => *kind,
            AgentError::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Construct a pre-classified error with an explicit kind.
    pub fn classified(kind: ErrorKind, message: impl Into<String>) -> Self {
        AgentError::Classified {
            kind,
            message: message.into(),
        }
    }
}
