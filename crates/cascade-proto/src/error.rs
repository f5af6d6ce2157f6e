//! Payload error types.

use thiserror::Error;

/// Payload-level errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A payload could not be converted into an entity or value.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
