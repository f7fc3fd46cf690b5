//! Custom error types for Ortomat
//!
//! This module defines the error hierarchy for the backup subsystem using
//! thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::models::EntityKind;

/// The main error type for Ortomat operations
#[derive(Error, Debug)]
pub enum OrtomatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// A backup document that does not have the snapshot shape
    #[error("Invalid backup format: {0}")]
    Format(String),

    /// A backup document written by a version this build cannot read
    #[error("Unsupported backup version '{found}' (supported: {supported})")]
    UnsupportedVersion { found: String, supported: String },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Key or referential integrity violations raised by the store
    #[error("Constraint violation on {kind}: {detail}")]
    Constraint { kind: EntityKind, detail: String },

    /// Password hashing failures
    #[error("Credential error: {0}")]
    Credential(String),

    /// Caller lacks the privileges for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl OrtomatError {
    /// Create a constraint violation for the given kind
    pub fn constraint(kind: EntityKind, detail: impl Into<String>) -> Self {
        Self::Constraint {
            kind,
            detail: detail.into(),
        }
    }

    /// Create a "not found" error for backup files
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Check if the document was rejected before any work was done
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_) | Self::UnsupportedVersion { .. })
    }

    /// Check if this error came from the persistence layer
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Constraint { .. })
    }

    /// Check if this is a privilege error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}

impl From<std::io::Error> for OrtomatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for OrtomatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Ortomat operations
pub type OrtomatResult<T> = Result<T, OrtomatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrtomatError::Format("missing data field".into());
        assert_eq!(err.to_string(), "Invalid backup format: missing data field");
        assert!(err.is_format());
    }

    #[test]
    fn test_constraint_display() {
        let err = OrtomatError::constraint(EntityKind::Cells, "machineId 'm-9' does not exist");
        assert_eq!(
            err.to_string(),
            "Constraint violation on cells: machineId 'm-9' does not exist"
        );
        assert!(err.is_storage());
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = OrtomatError::UnsupportedVersion {
            found: "0.1".into(),
            supported: "1.0".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported backup version '0.1' (supported: 1.0)"
        );
        assert!(err.is_format());
        assert!(!err.is_storage());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: OrtomatError = io_err.into();
        assert!(matches!(err, OrtomatError::Io(_)));
    }
}
