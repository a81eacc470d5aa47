//! Binary entry point for the tugsearch CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Run a query against a snapshot directory
//! tugsearch search --code snapshot/ --query find_bar.json
//!
//! # Plain `file:line: code` lines instead of JSON
//! tugsearch search --code snapshot/ --query find_bar.json --format text
//!
//! # Code base and name-resolution counters
//! tugsearch stats --code snapshot/ --parallel
//! ```
//!
//! Results go to stdout. Errors are emitted as JSON on stdout and the
//! process exits with the error's output code. Logs go to stderr.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tugsearch::{load_code_base, load_query, run_query, run_stats};
use tugsearch_core::output::{emit_response, emit_response_compact, emit_results_text, ErrorResponse};
use tugsearch_core::{OutputErrorCode, SearchError};
use tugsearch_java::AnalysisOptions;

// ============================================================================
// CLI Structure
// ============================================================================

/// Structural code search for Java-like code bases.
#[derive(Parser, Debug)]
#[command(name = "tugsearch", version, about = "Structural code search for Java-like code bases")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for search results.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum SearchFormat {
    /// Pretty-printed JSON response.
    #[default]
    Json,
    /// Single-line JSON response.
    Compact,
    /// One `file:line: code` line per result.
    Text,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a structural query.
    Search {
        /// Snapshot file or directory of `*.json` snapshots.
        #[arg(long)]
        code: PathBuf,
        /// JSON query file.
        #[arg(long)]
        query: PathBuf,
        /// Run the per-method and usage passes on the rayon pool.
        #[arg(long)]
        parallel: bool,
        /// Output format.
        #[arg(long, value_enum, default_value_t = SearchFormat::default())]
        format: SearchFormat,
    },
    /// Report code base and name-resolution counters.
    Stats {
        /// Snapshot file or directory of `*.json` snapshots.
        #[arg(long)]
        code: PathBuf,
        /// Run the per-method and usage passes on the rayon pool.
        #[arg(long)]
        parallel: bool,
    },
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<(), SearchError> {
    match cli.command {
        Command::Search {
            code,
            query,
            parallel,
            format,
        } => execute_search(&code, &query, parallel, format),
        Command::Stats { code, parallel } => execute_stats(&code, parallel),
    }
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_search(
    code: &Path,
    query: &Path,
    parallel: bool,
    format: SearchFormat,
) -> Result<(), SearchError> {
    let code = load_code_base(code)?;
    let query = load_query(query)?;
    let options = AnalysisOptions::default().with_parallel(parallel);
    let response = run_query(&code, &query, &options)?;

    let mut stdout = io::stdout();
    match format {
        SearchFormat::Json => emit_response(&response, &mut stdout)?,
        SearchFormat::Compact => emit_response_compact(&response, &mut stdout)?,
        SearchFormat::Text => emit_results_text(&response.results, &mut stdout)?,
    }
    let _ = stdout.flush();
    Ok(())
}

fn execute_stats(code: &Path, parallel: bool) -> Result<(), SearchError> {
    let code = load_code_base(code)?;
    let options = AnalysisOptions::default().with_parallel(parallel);
    let response = run_stats(&code, &options);

    let mut stdout = io::stdout();
    emit_response(&response, &mut stdout)?;
    let _ = stdout.flush();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_defaults() {
        let cli = Cli::try_parse_from([
            "tugsearch", "search", "--code", "snap", "--query", "q.json",
        ])
        .unwrap();
        match cli.command {
            Command::Search {
                parallel, format, ..
            } => {
                assert!(!parallel);
                assert!(matches!(format, SearchFormat::Json));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(matches!(cli.global.log_level, LogLevel::Warn));
    }

    #[test]
    fn test_parse_stats_with_global_log_level() {
        let cli = Cli::try_parse_from([
            "tugsearch", "stats", "--code", "snap", "--parallel", "--log-level", "debug",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Stats { parallel: true, .. }));
        assert!(matches!(cli.global.log_level, LogLevel::Debug));
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["tugsearch", "search", "--code", "snap"]).is_err());
    }
}
