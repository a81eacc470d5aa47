//! Java semantic resolution and structural search for tugsearch.
//!
//! This crate turns syntax-only compilation units into a cross-file model
//! and answers structural queries against it:
//! - `ast`: node model, ids, indexed arena, visitor, pseudocode rendering
//! - `qualified_name`: type-name resolution with per-strategy statistics
//! - `hierarchy`: the global supertype/subtype forest
//! - `method_types`: resolved return, parameter and variable types
//! - `context`: per-file lexical scope stack
//! - `usage`: call resolution and the usage pass
//! - `expr_types`: static types of argument and receiver expressions
//! - `analysis`: the ordered pipeline of passes
//! - `query`, `matcher`, `search`: query objects, lenient matching, search
//! - `refactor`: the refactor executor seam
//! - `validation`: identifier checks for refactor directives

pub mod analysis;
pub mod ast;
pub mod context;
pub mod expr_types;
pub mod hierarchy;
pub mod matcher;
pub mod method_types;
pub mod qualified_name;
pub mod query;
pub mod refactor;
pub mod search;
pub mod usage;
pub mod validation;

pub use analysis::{Analysis, AnalysisOptions};
pub use ast::{CodeBase, CompilationUnit};
pub use query::{Descriptor, Query, SearchType};
pub use refactor::{apply_refactor, PreviewRefactorer, Refactorer};
pub use search::{RefactorTarget, SearchOutcome, Searcher, TargetNode};
