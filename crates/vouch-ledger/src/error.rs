//! Error types for the vouch ledger.

use crate::models::UserId;
use thiserror::Error;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ledger operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Actor tried to vouch for themselves
    #[error("user {0} cannot vouch for themselves")]
    SelfVouch(UserId),

    /// Attached proof is not an image
    #[error("invalid proof: expected an image, got {content_type:?}")]
    InvalidProof { content_type: String },

    /// Stored snapshot missing or malformed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A role or channel the operation depends on is not configured
    #[error("{0} is not configured")]
    ConfigMissing(&'static str),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
