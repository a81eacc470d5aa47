//! Library front door for the `tugsearch` binary.
//!
//! - `run_query` - analyze a code base, search it, and preview a refactor
//! - `run_stats` - analyze a code base and report counts
//!
//! The caller (typically `main.rs`) loads the code base and query via
//! [`crate::snapshot`] and owns output formatting.

use tracing::info;
use tugsearch_core::{SearchError, SearchResponse, StatsResponse};
use tugsearch_java::{
    apply_refactor, Analysis, AnalysisOptions, CodeBase, PreviewRefactorer, Query, Refactorer,
    Searcher,
};

/// Search a code base, previewing any refactor directive.
///
/// # Arguments
///
/// * `code` - The loaded code base
/// * `query` - Query to answer
/// * `options` - Analysis options
///
/// # Returns
///
/// The search response. When the query carries a directive, `refactored`
/// holds one preview record per target.
pub fn run_query(
    code: &CodeBase,
    query: &Query,
    options: &AnalysisOptions,
) -> Result<SearchResponse, SearchError> {
    run_query_with(code, query, options, &mut PreviewRefactorer)
}

/// Like [`run_query`], with a caller-supplied refactor executor.
pub fn run_query_with(
    code: &CodeBase,
    query: &Query,
    options: &AnalysisOptions,
    refactorer: &mut dyn Refactorer,
) -> Result<SearchResponse, SearchError> {
    // Validate before paying for the analysis.
    query.validate()?;

    let analysis = Analysis::run(code, options);
    let outcome = Searcher::new(&analysis).search(query)?;
    info!(
        results = outcome.results.len(),
        targets = outcome.targets.len(),
        "search finished"
    );

    let response = SearchResponse::new(outcome.results, outcome.targets.len());
    match &query.refactor {
        Some(directive) => {
            let refactored = apply_refactor(refactorer, directive, &outcome.targets)?;
            Ok(response.with_refactored(refactored))
        }
        None => Ok(response),
    }
}

/// Node counts, pass statistics and name-resolution statistics.
pub fn run_stats(code: &CodeBase, options: &AnalysisOptions) -> StatsResponse {
    let analysis = Analysis::run(code, options);
    StatsResponse::new(analysis.stats(), analysis.names().stats())
}
