//! Error types for the vouch node.

use thiserror::Error;

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in node operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Ledger or engine error
    #[error(transparent)]
    Ledger(#[from] vouch_ledger::Error),

    /// Bad node configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A platform collaborator failed
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Message suitable for the user that issued a command.
    pub fn user_message(&self) -> String {
        match self {
            Error::Ledger(vouch_ledger::Error::SelfVouch(_)) => {
                "You can't vouch yourself.".to_string()
            }
            Error::Ledger(vouch_ledger::Error::InvalidProof { .. }) => {
                "Please attach a valid image.".to_string()
            }
            other => other.to_string(),
        }
    }
}
