//! Code-base snapshot loading.
//!
//! A snapshot is the JSON form of parsed compilation units. The external
//! front end may write it in any of these shapes:
//!
//! - a list of `{ "path": ..., "unit": ... }` entries
//! - a single `{ "path": ..., "unit": ... }` entry
//! - a bare `CompilationUnit`; its path is the snapshot file's path with
//!   the extension replaced by `.java`
//! - an object mapping paths to units
//!
//! `--code` may name one snapshot file or a directory; directories are
//! walked for `*.json` files in sorted order.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, info_span};
use tugsearch_core::SearchError;
use tugsearch_java::{CodeBase, CompilationUnit, Query};
use walkdir::WalkDir;

/// One `{ path, unit }` record.
#[derive(Debug, Deserialize)]
struct SnapshotEntry {
    path: PathBuf,
    unit: CompilationUnit,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Entries(Vec<SnapshotEntry>),
    Entry(SnapshotEntry),
    Unit(CompilationUnit),
    Map(BTreeMap<PathBuf, CompilationUnit>),
}

impl SnapshotFile {
    fn into_units(self, fallback: &Path) -> Vec<(PathBuf, CompilationUnit)> {
        match self {
            SnapshotFile::Entries(entries) => {
                entries.into_iter().map(|e| (e.path, e.unit)).collect()
            }
            SnapshotFile::Entry(entry) => vec![(entry.path, entry.unit)],
            SnapshotFile::Unit(unit) => vec![(fallback.with_extension("java"), unit)],
            SnapshotFile::Map(map) => map.into_iter().collect(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a code base from a snapshot file or directory.
///
/// # Arguments
///
/// * `path` - A `.json` snapshot file, or a directory of them
///
/// # Errors
///
/// - `FileNotFound` if `path` does not exist
/// - `MalformedInput` if a snapshot file is not valid JSON in one of the
///   accepted shapes
pub fn load_code_base(path: &Path) -> Result<CodeBase, SearchError> {
    let _span = info_span!("load_code_base", path = %path.display()).entered();

    if !path.exists() {
        return Err(SearchError::file_not_found(path.display().to_string()));
    }

    let mut units = Vec::new();
    if path.is_dir() {
        for file in snapshot_files(path)? {
            let relative = file.strip_prefix(path).unwrap_or(&file).to_path_buf();
            units.extend(read_snapshot(&file)?.into_units(&relative));
        }
    } else {
        let fallback = PathBuf::from(path.file_name().unwrap_or(path.as_os_str()));
        units.extend(read_snapshot(path)?.into_units(&fallback));
    }

    let code = CodeBase::new(units);
    info!(files = code.len(), "loaded code base");
    Ok(code)
}

/// Load a JSON query.
///
/// The query is only parsed here; `Searcher::search` validates it.
pub fn load_query(path: &Path) -> Result<Query, SearchError> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .map_err(|err| SearchError::malformed(path.display().to_string(), err.to_string()))
}

/// All `*.json` files under `root`, sorted.
fn snapshot_files(root: &Path) -> Result<Vec<PathBuf>, SearchError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            SearchError::malformed(root.display().to_string(), err.to_string())
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some("json")
        {
            files.push(entry.into_path());
        }
    }
    debug!(count = files.len(), "found snapshot files");
    Ok(files)
}

fn read_snapshot(path: &Path) -> Result<SnapshotFile, SearchError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|err| {
        SearchError::malformed(
            path.display().to_string(),
            format!("not a compilation-unit snapshot: {}", err),
        )
    })
}

fn read_text(path: &Path) -> Result<String, SearchError> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => SearchError::file_not_found(path.display().to_string()),
        _ => SearchError::malformed(path.display().to_string(), err.to_string()),
    })
}
