#![deny(missing_docs)]
//! Trace recording for the AgenticGoKit runtime.
//!
//! A [`TraceLogger`] records one session's execution timeline as an
//! append-only sequence of [`TraceEntry`] rows, and lets a caller dump
//! the timeline back out (for debugging, a transcript viewer, or a test
//! assertion). Two implementations ship here: [`InMemoryTraceLogger`], a
//! bounded per-session ring suitable for tests and short-lived processes,
//! and [`FileTraceLogger`], which persists one newline-delimited JSON
//! file per session.

pub mod error;
pub mod file;
pub mod memory;

pub use error::TraceError;
pub use file::FileTraceLogger;
pub use memory::InMemoryTraceLogger;

use agentkit_core::{SessionId, TraceEntry};
use async_trait::async_trait;

/// Append-only execution trace, keyed by session.
#[async_trait]
pub trait TraceLogger: Send + Sync {
    /// Append one entry to `entry.session_id`'s timeline.
    async fn append(&self, entry: TraceEntry) -> Result<(), TraceError>;

    /// Return the full timeline for `session`, in append order. An
    /// unknown session returns an empty vec, not an error.
    async fn dump(&self, session: &SessionId) -> Result<Vec<TraceEntry>, TraceError>;
}
