//! Error types for ID parsing and derivation.

use thiserror::Error;

/// Errors that can occur when parsing or deriving IDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID string is empty.
    #[error("ID cannot be empty")]
    Empty,

    /// The string is not a valid UUID.
    #[error("invalid UUID '{input}': {reason}")]
    InvalidUuid { input: String, reason: String },

    /// The string is not a valid decimal handle.
    #[error("invalid numeric ID '{0}'")]
    InvalidNumber(String),
}

impl IdError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, IdError::Empty)
    }
}
