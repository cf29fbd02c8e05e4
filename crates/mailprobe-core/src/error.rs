//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
///
/// Probe failures never surface here; they are folded into an
/// [`OutcomeReport`](crate::OutcomeReport). This covers the setup around it.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
