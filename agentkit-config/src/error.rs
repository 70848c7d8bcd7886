//! Errors loading or parsing a [`crate::Config`].

use thiserror::Error;

/// Failures reading, parsing, or writing a configuration file.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML contents did not parse into a [`crate::Config`].
    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized back to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An `error_routing` key did not name a known [`agentkit_core::ErrorKind`].
    #[error("unknown error kind in error_routing: {0}")]
    UnknownErrorKind(String),
}
