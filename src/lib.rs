//! tugsearch: structural search and refactor targeting for Java-like code.
//!
//! This package ties the analysis crates to the command line:
//! - `snapshot`: loading code-base snapshots and queries from JSON
//! - `cli`: running queries and stats over a loaded code base
//!
//! Language-agnostic infrastructure lives in `tugsearch-core`; resolution
//! and search live in `tugsearch-java`.

pub mod cli;
pub mod snapshot;

pub use cli::{run_query, run_query_with, run_stats};
pub use snapshot::{load_code_base, load_query};
pub use tugsearch_core::{SearchError, SearchResponse, StatsResponse};
pub use tugsearch_java::{AnalysisOptions, CodeBase, Query};
