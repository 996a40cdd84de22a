//! Store error types
//!
//! Errors from the persistence layer. Write failures are fatal to the
//! ingestion call; read-side parse failures never surface here, they are
//! handled by skipping the offending line.

use thiserror::Error;

/// Errors that can occur in the record store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed (append or snapshot write)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized for the log line
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
        assert_eq!(store_err.to_string(), "IO error: file not found");
    }
}
