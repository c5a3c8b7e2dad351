//! Gateway layer error types
//!
//! All errors that can surface from the two remote stores are defined here.
//! We use `thiserror` for ergonomic error definition and better error messages.

use thiserror::Error;

use crate::gateway::types::{DocumentId, InvalidKeyError};

/// the main error type for gateway operations
///
/// Both the object store and the record store report through this type so the
/// coordinator has a single boundary to catch at.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// the requested blob was not found in the object store
    #[error("blob not found: {0}")]
    BlobNotFound(String),

    /// the requested record was not found in the record store
    #[error("record not found: id={0}")]
    RecordNotFound(DocumentId),

    /// a blob already exists at the key and overwrite was not allowed
    #[error("blob already exists: {0}")]
    BlobAlreadyExists(String),

    /// the store rejected the caller's credentials or policy
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// the store could not be reached or answered with a transport failure
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// invalid storage key
    #[error("invalid storage key: {0}")]
    InvalidKey(#[from] InvalidKeyError),

    /// JSON serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GatewayError::BlobNotFound(_) | GatewayError::RecordNotFound(_)
        )
    }

    /// check if this error is a conflict with existing state
    pub fn is_conflict(&self) -> bool {
        matches!(self, GatewayError::BlobAlreadyExists(_))
    }

    /// check if this error is recoverable by retry
    pub fn is_retriable(&self) -> bool {
        matches!(self, GatewayError::Unavailable(_))
    }
}

/// result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_found = GatewayError::BlobNotFound("abc/notes.md".into());
        assert!(not_found.is_not_found());
        assert!(!not_found.is_conflict());

        let conflict = GatewayError::BlobAlreadyExists("abc/notes.md".into());
        assert!(!conflict.is_not_found());
        assert!(conflict.is_conflict());

        let transient = GatewayError::Unavailable("connection reset".into());
        assert!(transient.is_retriable());
        assert!(!transient.is_not_found());
    }
}
