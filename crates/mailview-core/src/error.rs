//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A stored record could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single load stage, delivered to the coordinator as data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The message or body is absent from the store.
    #[error("not found")]
    NotFound,

    /// The store failed while reading.
    #[error("store error: {0}")]
    Store(String),
}

impl From<Error> for LoadError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(_) => Self::NotFound,
            other => Self::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_load_not_found() {
        let err = Error::NotFound("message 7".to_string());
        assert_eq!(LoadError::from(err), LoadError::NotFound);
    }

    #[test]
    fn test_other_errors_keep_their_message() {
        let err = Error::Config("bad path".to_string());
        assert_eq!(
            LoadError::from(err),
            LoadError::Store("Configuration error: bad path".to_string())
        );
    }
}
