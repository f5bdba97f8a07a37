//! Error types for Calluna.

use thiserror::Error;

/// The error type for all Calluna operations.
#[derive(Debug, Error)]
pub enum CallunaError {
    /// A query could not be parsed (malformed boolean, wildcard, or
    /// proximity syntax). Terminal for the single query, not the run.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The index could not be built or accessed.
    #[error("Index error: {0}")]
    Index(String),

    /// An invalid argument was supplied.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CallunaError {
    /// Create a parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        CallunaError::Parse(message.into())
    }

    /// Create an index error.
    pub fn index<S: Into<String>>(message: S) -> Self {
        CallunaError::Index(message.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        CallunaError::InvalidArgument(message.into())
    }

    /// Create an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        CallunaError::Internal(message.into())
    }
}

/// A specialized `Result` type for Calluna operations.
pub type Result<T> = std::result::Result<T, CallunaError>;
