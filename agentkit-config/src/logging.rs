//! `[logging]` — §6.5's logging options, plus the trace sink choice.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Minimum `tracing` severity to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Verbose diagnostic output.
    Debug,
    /// Normal operational messages.
    Info,
    /// Recoverable problems worth a human's attention.
    Warn,
    /// Failures.
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    /// The `tracing::Level` equivalent, for wiring into a subscriber
    /// filter at the caller's discretion (this crate does not install a
    /// subscriber itself — §9's "explicit init-once, no globals in hot
    /// paths" redesign note).
    pub fn as_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Newline-delimited JSON.
    Json,
    /// Human-readable text.
    Text,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Text
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum severity to emit.
    pub level: LogLevel,
    /// Output encoding.
    pub format: LogFormat,
    /// Directory for a `FileTraceLogger`. Mutually exclusive with
    /// `trace_memory` in intent (both set ⇒ the caller decides which
    /// wins; this crate doesn't enforce exclusivity since it only
    /// carries configuration, not wiring).
    pub trace_dir: Option<PathBuf>,
    /// Use an `InMemoryTraceLogger` instead of a file-backed one.
    pub trace_memory: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            trace_dir: None,
            trace_memory: true,
        }
    }
}

impl LoggingConfig {
    pub(crate) fn merge(&mut self, other: Self) {
        *self = other;
    }
}
