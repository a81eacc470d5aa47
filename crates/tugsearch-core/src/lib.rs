//! Core infrastructure for tugsearch.
//!
//! This crate provides language-agnostic pieces shared by the analysis
//! crates and the CLI:
//!
//! - `error`: the unified `SearchError` and stable output codes
//! - `output`: JSON response types and emission
//! - `lenient`: descriptor values that are either unspecified or exact
//! - `expr`: boolean match expressions with NOT > AND > OR assembly
//! - `typename`: type-name text parsing and generic erasure

pub mod error;
pub mod expr;
pub mod lenient;
pub mod output;
pub mod typename;

pub use error::{OutputErrorCode, SearchError};
pub use expr::{ExprError, ExprSource, ExprToken, MatchExpr};
pub use lenient::Lenient;
pub use output::{ErrorResponse, SearchResponse, SearchResult, StatsResponse};
