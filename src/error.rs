use thiserror::Error;

/// Errors surfaced by the classifier, stores and service
#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied input was rejected; fixing the input fixes the call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The persistence backend could not be reached, read or written
    #[error("Storage unavailable ({operation}): {message}")]
    StorageUnavailable {
        operation: &'static str,
        message: String,
    },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn storage(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable {
            operation,
            message: err.to_string(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
