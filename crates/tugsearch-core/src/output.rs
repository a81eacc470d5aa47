//! JSON output types and serialization for CLI responses.
//!
//! Every response carries `status` first and a `schema_version`, so callers
//! can branch on success before reading anything else.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (field order, array ordering)
//! 3. **Absent vs empty:** An absent field means "not applicable"; an empty list means "none found"

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, SearchError};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Search results
// ============================================================================

/// One reported match.
///
/// `code` is the first line of the node's pseudocode rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Path of the file the match lives in.
    pub file: String,
    /// 1-based source line.
    pub line: u32,
    /// Single-line pseudocode summary.
    pub code: String,
}

impl SearchResult {
    /// Create a new result.
    pub fn new(file: impl Into<String>, line: u32, code: impl Into<String>) -> Self {
        SearchResult {
            file: file.into(),
            line,
            code: code.into(),
        }
    }

    /// `file:line: code`, the text output format.
    pub fn to_text(&self) -> String {
        format!("{}:{}: {}", self.file, self.line, self.code)
    }
}

/// Response for `tugsearch search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// Matches in deterministic order.
    pub results: Vec<SearchResult>,
    /// Number of nodes a refactor directive would receive.
    pub refactor_targets: usize,
    /// Per-file results of an applied refactor, when one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refactored: Option<Vec<SearchResult>>,
}

impl SearchResponse {
    /// Create a successful search response.
    pub fn new(results: Vec<SearchResult>, refactor_targets: usize) -> Self {
        SearchResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            results,
            refactor_targets,
            refactored: None,
        }
    }

    /// Attach refactor output.
    pub fn with_refactored(mut self, refactored: Vec<SearchResult>) -> Self {
        self.refactored = Some(refactored);
        self
    }
}

/// Response for `tugsearch stats`.
///
/// Counters are keyed by name so new counters do not change the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// Code base size counters (files, types, methods, ...).
    pub code_base: BTreeMap<String, u64>,
    /// Name-resolution strategy counters.
    pub name_resolution: BTreeMap<String, u64>,
}

impl StatsResponse {
    /// Create a successful stats response.
    pub fn new(code_base: BTreeMap<String, u64>, name_resolution: BTreeMap<String, u64>) -> Self {
        StatsResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            code_base,
            name_resolution,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// File the error concerns, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// Error details.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a code and message.
    pub fn new(code: OutputErrorCode, message: impl Into<String>) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo {
                code: code.code(),
                message: message.into(),
                file: None,
            },
        }
    }
}

impl From<&SearchError> for ErrorResponse {
    fn from(err: &SearchError) -> Self {
        let mut response = ErrorResponse::new(OutputErrorCode::from(err), err.to_string());
        response.error.file = match err {
            SearchError::FileNotFound { path } | SearchError::MalformedInput { path, .. } => {
                Some(path.clone())
            }
            SearchError::RefactorFailed { file, .. } => file.clone(),
            _ => None,
        };
        response
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit results one per line as `file:line: code`.
pub fn emit_results_text(results: &[SearchResult], writer: &mut impl Write) -> io::Result<()> {
    for result in results {
        writeln!(writer, "{}", result.to_text())?;
    }
    Ok(())
}
