//! Error types for the simulation host.

use brainz_core::error::BrainzError;
use thiserror::Error;

/// Errors surfaced by the host: configuration, decision logs, and anything
/// bubbling up from the core.
#[derive(Error, Debug)]
pub enum SimError {
    /// Invalid host configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record encoding failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decision log or config file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Core library failure.
    #[error(transparent)]
    Core(#[from] BrainzError),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, SimError>;
