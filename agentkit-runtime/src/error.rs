//! Errors the [`crate::Runner`] itself can return (lifecycle and intake
//! failures — never an agent's or orchestrator's own errors, which are
//! captured in the trace instead, per §7's propagation policy).

use agentkit_core::ErrorKind;
use thiserror::Error;

/// Lifecycle and intake failures.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// `start` was called on an already-started runner.
    #[error("runner already started")]
    AlreadyStarted,

    /// `emit` was called before `start`.
    #[error("runner not started")]
    NotStarted,

    /// The bounded intake queue is at capacity.
    #[error("intake queue is full")]
    QueueFull,
}

impl RunnerError {
    /// Classify into the shared [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunnerError::AlreadyStarted | RunnerError::NotStarted => ErrorKind::Validation,
            RunnerError::QueueFull => ErrorKind::QueueFull,
        }
    }
}
