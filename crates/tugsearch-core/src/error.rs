//! Error types and error code constants for tugsearch.
//!
//! This module provides the unified error type (`SearchError`) that the
//! loaders, query validation and refactor seam report through, and the
//! stable integer codes used for CLI exit status and JSON error output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad CLI input, malformed query)
//! - `3`: Resolution errors (snapshot file not found or unreadable)
//! - `4`: Refactor errors (a refactorer rejected its targets)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Resolution inside the analysis itself never fails: an unresolvable name
//! or call is an absent result, not an error. Only the edges of the system
//! (loading, validating, refactoring) produce a `SearchError`.

use std::fmt;

use thiserror::Error;

use crate::expr::ExprError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed query).
    InvalidArguments = 2,
    /// Resolution errors (file not found, snapshot unreadable).
    ResolutionError = 3,
    /// Refactor errors (the refactorer failed to apply a directive).
    RefactorError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI and library callers.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// The query is structurally valid JSON but cannot be executed.
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// Invalid identifier supplied to a refactor directive.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// A code snapshot or query file could not be decoded.
    #[error("malformed input {path}: {message}")]
    MalformedInput { path: String, message: String },

    /// The refactorer failed to apply a directive.
    #[error("refactor error: {message}")]
    RefactorFailed {
        message: String,
        file: Option<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&SearchError> for OutputErrorCode {
    fn from(err: &SearchError) -> Self {
        match err {
            SearchError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            SearchError::InvalidQuery { .. } => OutputErrorCode::InvalidArguments,
            SearchError::InvalidIdentifier { .. } => OutputErrorCode::InvalidArguments,
            SearchError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            SearchError::MalformedInput { .. } => OutputErrorCode::ResolutionError,
            SearchError::RefactorFailed { .. } => OutputErrorCode::RefactorError,
            SearchError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<SearchError> for OutputErrorCode {
    fn from(err: SearchError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<ExprError> for SearchError {
    fn from(err: ExprError) -> Self {
        SearchError::InvalidQuery {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SearchError {
    fn from(err: std::io::Error) -> Self {
        SearchError::InternalError {
            message: format!("IO error: {}", err),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl SearchError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        SearchError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        SearchError::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        SearchError::FileNotFound { path: path.into() }
    }

    /// Create a malformed input error.
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        SearchError::MalformedInput {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a refactor error, optionally naming the file it failed on.
    pub fn refactor_failed(message: impl Into<String>, file: Option<String>) -> Self {
        SearchError::RefactorFailed {
            message: message.into(),
            file,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        SearchError::InternalError {
            message: message.into(),
        }
    }

    /// The output code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_have_stable_values() {
        assert_eq!(OutputErrorCode::InvalidArguments.code(), 2);
        assert_eq!(OutputErrorCode::ResolutionError.code(), 3);
        assert_eq!(OutputErrorCode::RefactorError.code(), 4);
        assert_eq!(OutputErrorCode::InternalError.code(), 10);
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(
            SearchError::invalid_query("bad").error_code(),
            OutputErrorCode::InvalidArguments
        );
        assert_eq!(
            SearchError::file_not_found("A.json").error_code(),
            OutputErrorCode::ResolutionError
        );
        assert_eq!(
            SearchError::malformed("A.json", "eof").error_code(),
            OutputErrorCode::ResolutionError
        );
        assert_eq!(
            SearchError::refactor_failed("nope", None).error_code(),
            OutputErrorCode::RefactorError
        );
        assert_eq!(
            SearchError::internal("bug").error_code(),
            OutputErrorCode::InternalError
        );
    }

    #[test]
    fn test_error_display() {
        let err = SearchError::InvalidIdentifier {
            name: "1abc".to_string(),
            reason: "must not start with a digit".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid identifier '1abc': must not start with a digit"
        );
        assert_eq!(OutputErrorCode::RefactorError.to_string(), "4");
    }

    #[test]
    fn test_expr_error_bridges_to_invalid_query() {
        let err: SearchError = ExprError::EmptyExpression.into();
        assert!(matches!(err, SearchError::InvalidQuery { .. }));
    }
}
