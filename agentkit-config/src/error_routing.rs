//! `[error_routing]` — §4.6/§7's mapping from an [`ErrorKind`] name to the
//! agent that should handle failures of that kind.

use crate::error::ConfigError;
use agentkit_core::ErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `error_routing` table: `ErrorKind` name (snake_case) → handler agent
/// name. Kept as plain strings at the config layer since `ErrorKind` is
/// `#[non_exhaustive]` and not itself `Deserialize` — [`ErrorRoutingConfig::resolve`]
/// does the parsing, surfacing an unknown kind as [`ConfigError::UnknownErrorKind`]
/// rather than silently dropping the entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorRoutingConfig(pub HashMap<String, String>);

impl ErrorRoutingConfig {
    /// Parse every entry into `(ErrorKind, handler name)` pairs.
    pub fn resolve(&self) -> Result<Vec<(ErrorKind, String)>, ConfigError> {
        self.0
            .iter()
            .map(|(kind, handler)| Ok((parse_error_kind(kind)?, handler.clone())))
            .collect()
    }

    pub(crate) fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }
}

/// Parse a snake_case error kind name into an [`ErrorKind`].
pub fn parse_error_kind(name: &str) -> Result<ErrorKind, ConfigError> {
    match name {
        "routing" => Ok(ErrorKind::Routing),
        "validation" => Ok(ErrorKind::Validation),
        "timeout" => Ok(ErrorKind::Timeout),
        "transient" => Ok(ErrorKind::Transient),
        "circuit_open" => Ok(ErrorKind::CircuitOpen),
        "circuit_busy" => Ok(ErrorKind::CircuitBusy),
        "queue_full" => Ok(ErrorKind::QueueFull),
        "not_found" => Ok(ErrorKind::NotFound),
        "critical" => Ok(ErrorKind::Critical),
        "unknown" => Ok(ErrorKind::Unknown),
        other => Err(ConfigError::UnknownErrorKind(other.to_string())),
    }
}
