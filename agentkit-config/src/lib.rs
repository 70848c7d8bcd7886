#![deny(missing_docs)]
//! Typed configuration and TOML convenience loader for the AgenticGoKit
//! runtime (§6.5).
//!
//! A typed [`Config`] struct is the canonical input to construct a
//! `Runner`; the TOML loader here is a convenience on top of it, not a
//! requirement — callers are free to build a `Config` by hand (or skip
//! it entirely and wire `agentkit-runtime` types directly).
//!
//! Grounded on `ediblackk-mylm`'s `AgentConfig::{from_file, to_file, merge}`
//! idiom: every sub-table derives `Deserialize` with `#[serde(default)]`
//! so a partial TOML file only needs to name what it overrides, and
//! `merge` takes `other` wholesale per table (matching the teacher's
//! "other wins" semantics) rather than a field-by-field diff.

mod error;
mod error_routing;
mod logging;
mod orchestration;
mod resilience;
mod runtime;

pub use error::ConfigError;
pub use error_routing::{parse_error_kind, ErrorRoutingConfig};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use orchestration::{OrchestrationConfig, OrchestrationMode};
pub use resilience::{CircuitBreakerSettings, CircuitBreakerTargets, RetrySettings, RetryTargets};
pub use runtime::RuntimeConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The canonical configuration struct for constructing a `Runner` (§6.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[runtime]`.
    pub runtime: RuntimeConfig,
    /// `[orchestration]`.
    pub orchestration: OrchestrationConfig,
    /// `[logging]`.
    pub logging: LoggingConfig,
    /// `[error_routing]`.
    pub error_routing: ErrorRoutingConfig,
    /// `[circuit_breaker.*]`, one table per logical target.
    pub circuit_breaker: CircuitBreakerTargets,
    /// `[retry.*]`, one table per logical target.
    pub retry: RetryTargets,
}

impl Config {
    /// Parse a `Config` from a TOML document's contents.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a `Config` from a TOML file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Serialize this `Config` to a pretty-printed TOML file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Merge `other` into `self`, table by table, `other` winning on
    /// every table it's present in (matching `ediblackk-mylm::AgentConfig::merge`'s
    /// "other wins wholesale" semantics rather than a per-field diff,
    /// except for `error_routing`/`circuit_breaker`/`retry`, whose
    /// per-target maps are extended so a caller can layer
    /// target-specific overrides without restating every target).
    pub fn merge(mut self, other: Config) -> Config {
        self.runtime.merge(other.runtime);
        self.orchestration.merge(other.orchestration);
        self.logging.merge(other.logging);
        self.error_routing.merge(other.error_routing);
        self.circuit_breaker.merge(other.circuit_breaker);
        self.retry.merge(other.retry);
        self
    }
}
