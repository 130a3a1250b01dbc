//! Error types for the cantrip store
//!
//! Every failure the store can report is a variant of [`Error`]. We use
//! `thiserror` for `Display`/`Error` and keep each variant structured so the
//! transport boundary can map it to a status code without string matching.
//!
//! | Category | Variants | Status |
//! |----------|----------|--------|
//! | Not Found | `NotFound` | 404 |
//! | Shape | `InvalidOperation` | 400 |
//! | Identity | `Conflict` | 400 |
//! | Metadata | `Forbidden` | 400 |
//! | Input | `MalformedInput`, `ValidationFailed` | 400 |
//! | Gates | `AccessDenied` | 403 |
//! | Protocol | `UnsupportedMethod` | 405 |
//! | System | `CorruptDocument`, `InvalidConfig`, `Io`, `Serialization` | 500 |

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the cantrip store
#[derive(Debug, Error)]
pub enum Error {
    /// A path segment matched neither a key nor a member identifier
    #[error("Requested node doesn't exist: {path}")]
    NotFound {
        /// The request path that failed to resolve
        path: String,
    },

    /// Verb does not fit the shape of the target node
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Why the operation was rejected
        reason: String,
    },

    /// Identifier already taken within the target collection
    #[error("Conflict: {reason}")]
    Conflict {
        /// Which identifier collided
        reason: String,
    },

    /// Attempt to remove reserved metadata
    #[error("Forbidden: {reason}")]
    Forbidden {
        /// Which key was protected
        reason: String,
    },

    /// Request body or query parameter could not be understood
    #[error("Malformed input: {reason}")]
    MalformedInput {
        /// What was malformed
        reason: String,
    },

    /// The access-control gate refused the request
    #[error("Access denied: {reason}")]
    AccessDenied {
        /// Gate-provided reason
        reason: String,
    },

    /// The schema validator refused the request body
    #[error("Validation failed: {reason}")]
    ValidationFailed {
        /// Validator-provided reason
        reason: String,
    },

    /// Verb outside GET/POST/PUT/PATCH/DELETE
    #[error("Unsupported method: {method}")]
    UnsupportedMethod {
        /// The verb as received
        method: String,
    },

    /// The backing file is not a usable JSON document
    #[error("Not a valid JSON document file {}: {reason}", path.display())]
    CorruptDocument {
        /// Backing file path
        path: PathBuf,
        /// Parser or shape error
        reason: String,
    },

    /// Configuration could not be read or parsed
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong
        reason: String,
    },

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization {
        /// Encoder message
        reason: String,
    },
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unresolvable path
    NotFound,
    /// Verb/shape mismatch
    InvalidOperation,
    /// Duplicate identifier
    Conflict,
    /// Metadata deletion
    Forbidden,
    /// Bad body or query
    MalformedInput,
    /// Gate denial
    AccessDenied,
    /// Validator rejection
    ValidationFailed,
    /// Unknown verb
    UnsupportedMethod,
    /// Infrastructure failure
    Internal,
}

impl Error {
    /// Build a [`Error::NotFound`] for a path
    pub fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound { path: path.into() }
    }

    /// Build a [`Error::InvalidOperation`]
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Error::InvalidOperation {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::Conflict`]
    pub fn conflict(reason: impl Into<String>) -> Self {
        Error::Conflict {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::Forbidden`]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Error::Forbidden {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::MalformedInput`]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::AccessDenied`]
    pub fn access_denied(reason: impl Into<String>) -> Self {
        Error::AccessDenied {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::ValidationFailed`]
    pub fn validation(reason: impl Into<String>) -> Self {
        Error::ValidationFailed {
            reason: reason.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::InvalidOperation { .. } => ErrorKind::InvalidOperation,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::Forbidden { .. } => ErrorKind::Forbidden,
            Error::MalformedInput { .. } => ErrorKind::MalformedInput,
            Error::AccessDenied { .. } => ErrorKind::AccessDenied,
            Error::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            Error::UnsupportedMethod { .. } => ErrorKind::UnsupportedMethod,
            Error::CorruptDocument { .. }
            | Error::InvalidConfig { .. }
            | Error::Io(_)
            | Error::Serialization { .. } => ErrorKind::Internal,
        }
    }

    /// HTTP-style status code for the transport boundary
    pub fn status(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::AccessDenied => 403,
            ErrorKind::UnsupportedMethod => 405,
            ErrorKind::Internal => 500,
            ErrorKind::InvalidOperation
            | ErrorKind::Conflict
            | ErrorKind::Forbidden
            | ErrorKind::MalformedInput
            | ErrorKind::ValidationFailed => 400,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::not_found("/users/42");
        let msg = err.to_string();
        assert!(msg.contains("doesn't exist"));
        assert!(msg.contains("/users/42"));
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::conflict("_id 'abc' already exists");
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_error_display_corrupt_document() {
        let err = Error::CorruptDocument {
            path: PathBuf::from("data.json"),
            reason: "expected value at line 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("data.json"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::not_found("/").status(), 404);
        assert_eq!(Error::invalid_operation("x").status(), 400);
        assert_eq!(Error::conflict("x").status(), 400);
        assert_eq!(Error::forbidden("x").status(), 400);
        assert_eq!(Error::malformed("x").status(), 400);
        assert_eq!(Error::validation("x").status(), 400);
        assert_eq!(Error::access_denied("x").status(), 403);
        assert_eq!(
            Error::UnsupportedMethod {
                method: "TRACE".into()
            }
            .status(),
            405
        );
        assert_eq!(
            Error::Io(io::Error::new(io::ErrorKind::Other, "disk")).status(),
            500
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_error_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn test_error_pattern_matching() {
        match Error::forbidden("_id") {
            Error::Forbidden { reason } => assert_eq!(reason, "_id"),
            _ => panic!("Wrong error variant"),
        }
    }
}
