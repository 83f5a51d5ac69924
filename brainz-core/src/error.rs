//! Error types for the brainz core library.
//!
//! Decision-time operations (`decide`, `on_outcome`, pathfinding, recall) are
//! infallible and degrade to valid values. Errors only surface at the
//! edges: loading configuration, loading a policy model, and reading or
//! writing persisted brain state.

use thiserror::Error;

/// Top-level error type for all brainz operations.
#[derive(Error, Debug)]
pub enum BrainzError {
    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A policy backend (model file, runtime) could not be brought up.
    #[error("Inference backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The policy model failed while evaluating an input.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Model input or weights had an unexpected dimensionality.
    #[error("Model shape mismatch: expected {expected}, got {actual}")]
    ModelShape {
        /// Expected length.
        expected: usize,
        /// Observed length.
        actual: usize,
    },

    /// A persisted snapshot is not a structured brain document.
    #[error("Unsupported snapshot: {0}")]
    UnsupportedSnapshot(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for BrainzError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, BrainzError>;
