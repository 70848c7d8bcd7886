//! Errors `TraceLogger` implementations can return.

use agentkit_core::ErrorKind;
use thiserror::Error;

/// Failures appending to or reading a session's trace.
#[non_exhaustive]
#[derive(Debug, Error, Clone)]
pub enum TraceError {
    /// The file-based logger failed to write or flush.
    #[error("trace io error: {0}")]
    Io(String),

    /// A session was appended to after `close` was called on it.
    #[error("trace closed for session {0}")]
    Closed(String),
}

impl TraceError {
    /// Classify into the shared [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TraceError::Io(_) => ErrorKind::Transient,
            TraceError::Closed(_) => ErrorKind::Validation,
        }
    }
}
