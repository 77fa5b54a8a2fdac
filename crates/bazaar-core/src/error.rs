//! Error types for bazaar-core

use thiserror::Error;

use crate::remote::RemoteError;

/// Result type alias using bazaar-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bazaar-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote store reported a failure
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Current user does not own the record it tried to modify
    #[error("Not allowed to modify record {record_id}")]
    Unauthorized { record_id: String },

    /// Index past the end of the held records
    #[error("Index {index} out of range for {len} records")]
    OutOfRange { index: usize, len: usize },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Profile is missing data needed for the operation
    #[error("Incomplete profile: {0}")]
    IncompleteProfile(String),

    /// Image processing error
    #[error("Media error: {0}")]
    Media(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
