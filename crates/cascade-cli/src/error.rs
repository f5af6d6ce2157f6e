//! CLI error types.

use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Cascade engine error.
    #[error("cascade error: {0}")]
    Cascade(#[from] cascade_core::Error),

    /// Schema registration error.
    #[error("schema error: {0}")]
    Schema(#[from] cascade_core::SchemaError),

    /// Payload error.
    #[error("payload error: {0}")]
    Payload(#[from] cascade_proto::Error),

    /// Report serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
