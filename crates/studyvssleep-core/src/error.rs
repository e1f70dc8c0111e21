//! Core error types for studyvssleep-core.
//!
//! Engine misuse (unknown difficulty names, driving a run that was never
//! started) surfaces as [`CoreError::InvalidArgument`]. Input arriving after
//! a run has ended is not an error; the engine ignores it.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyvssleep-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A value outside the accepted domain was supplied
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// `tap`, `on_tick` or `restart` called before any `start`.
    pub(crate) fn not_started() -> Self {
        CoreError::InvalidArgument(NOT_STARTED.to_string())
    }

    pub fn is_not_started(&self) -> bool {
        matches!(self, CoreError::InvalidArgument(message) if message == NOT_STARTED)
    }
}

const NOT_STARTED: &str = "no run has been started";

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
