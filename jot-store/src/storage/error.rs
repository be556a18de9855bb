//! Storage errors
//!
//! TigerStyle: one error enum per boundary, explicit constructors.

/// Errors raised by an [`OrderedStore`](super::OrderedStore) backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// A put or delete did not complete
    #[error("write failed: {0}")]
    Write(String),

    /// A get or scan did not complete
    #[error("read failed: {0}")]
    Read(String),

    /// The backend could not be opened
    #[error("connection failed: {0}")]
    Connection(String),

    /// The store was closed before the operation started
    #[error("store is closed")]
    Closed,

    /// Schema setup or row decoding went wrong
    #[error("internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Build a [`StorageError::Write`].
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    /// Build a [`StorageError::Read`].
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read(message.into())
    }

    /// Build a [`StorageError::Connection`].
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Build a [`StorageError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for failures of a mutating operation.
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write(_))
    }
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(StorageError::write("disk full").to_string(), "write failed: disk full");
        assert_eq!(StorageError::read("io").to_string(), "read failed: io");
        assert_eq!(StorageError::Closed.to_string(), "store is closed");
    }

    #[test]
    fn test_is_write() {
        assert!(StorageError::write("x").is_write());
        assert!(!StorageError::read("x").is_write());
        assert!(!StorageError::Closed.is_write());
    }
}
