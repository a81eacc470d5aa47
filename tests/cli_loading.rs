//! Snapshot loading and the CLI end to end.
//!
//! # Organization
//!
//! - loading: snapshot files, directories, malformed input
//! - queries: query files through `run_query`
//! - binary: the `tugsearch` executable's output and exit codes
//!
//! Snapshots are written by serializing ASTs into a temp directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

use tugsearch::{load_code_base, load_query, run_query, AnalysisOptions, SearchError};
use tugsearch_core::Lenient;
use tugsearch_java::ast::{CompilationUnit, Expr, MethodCall, MethodDeclaration, Stmt, TypeDeclaration};
use tugsearch_java::query::{Descriptor, MethodDescriptor, Query, RefactorDirective};

fn class_a() -> CompilationUnit {
    CompilationUnit::new(
        TypeDeclaration::class("A").with_method(
            MethodDeclaration::new("bar", "void")
                .with_parameter("String", "s")
                .at_line(2),
        ),
    )
    .in_package("p")
}

fn class_b() -> CompilationUnit {
    CompilationUnit::new(
        TypeDeclaration::class("B").extends("A").with_method(
            MethodDeclaration::new("call", "void").with_body(vec![Stmt::expression(
                MethodCall::new("bar", vec![Expr::string("x")])
                    .at_line(4)
                    .into(),
            )]),
        ),
    )
    .in_package("p")
}

fn write_json(path: &Path, value: &impl serde::Serialize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// A snapshot directory with one bare unit per file.
fn snapshot_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_json(&temp.path().join("p/A.json"), &class_a());
    write_json(&temp.path().join("p/B.json"), &class_b());
    fs::write(temp.path().join("README.txt"), "not a snapshot").unwrap();
    temp
}

fn bar() -> MethodDescriptor {
    MethodDescriptor {
        name: Lenient::exact("bar"),
        ..Default::default()
    }
}

// ============================================================================
// Loading
// ============================================================================

mod loading {
    use super::*;

    #[test]
    fn directory_of_bare_units() {
        let temp = snapshot_dir();
        let code = load_code_base(temp.path()).unwrap();
        let paths: Vec<&Path> = code.files().iter().map(|f| f.path.as_path()).collect();
        assert_eq!(paths, vec![Path::new("p/A.java"), Path::new("p/B.java")]);
    }

    #[test]
    fn single_file_with_entry_list() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("snapshot.json");
        let entries = serde_json::json!([
            { "path": "src/p/B.java", "unit": class_b() },
            { "path": "src/p/A.java", "unit": class_a() },
        ]);
        write_json(&file, &entries);

        let code = load_code_base(&file).unwrap();
        assert_eq!(code.len(), 2);
        assert_eq!(code.files()[0].path, PathBuf::from("src/p/A.java"));
        assert_eq!(code.counts().methods, 2);
    }

    #[test]
    fn malformed_snapshot_names_the_file() {
        let temp = snapshot_dir();
        fs::write(temp.path().join("p/C.json"), "{ \"type_decl\": 7 }").unwrap();

        let err = load_code_base(temp.path()).unwrap_err();
        match &err {
            SearchError::MalformedInput { path, .. } => assert!(path.ends_with("C.json")),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(err.error_code().code(), 3);
    }

    #[test]
    fn missing_query_file() {
        let temp = TempDir::new().unwrap();
        let err = load_query(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SearchError::FileNotFound { .. }));
    }
}

// ============================================================================
// Queries
// ============================================================================

mod queries {
    use super::*;

    #[test]
    fn usage_query_from_files() {
        let temp = snapshot_dir();
        let query_file = temp.path().join("queries/bar.query");
        write_json(&query_file, &Query::usages(bar()));

        let code = load_code_base(temp.path()).unwrap();
        let query = load_query(&query_file).unwrap();
        let response = run_query(&code, &query, &AnalysisOptions::default()).unwrap();

        let shown: Vec<(&str, u32)> = response
            .results
            .iter()
            .map(|r| (r.file.as_str(), r.line))
            .collect();
        assert_eq!(shown, vec![("p/B.java", 4)]);
        // The declaration plus its one call.
        assert_eq!(response.refactor_targets, 2);
    }

    #[test]
    fn rename_preview_covers_every_target() {
        let code = load_code_base(snapshot_dir().path()).unwrap();
        let query = Query::usages(bar()).with_refactor(RefactorDirective::Rename {
            new_name: "baz".to_string(),
        });
        let response = run_query(&code, &query, &AnalysisOptions::default()).unwrap();
        let refactored = response.refactored.unwrap();
        let files: Vec<&str> = refactored.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, vec!["p/A.java", "p/B.java"]);
        assert!(refactored.iter().all(|r| r.code.contains("baz(")));
    }

    #[test]
    fn query_json_is_parsed_from_text() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("q.json");
        fs::write(
            &file,
            r#"{ "search_type": "definition", "target": { "target": "method", "name": "bar" } }"#,
        )
        .unwrap();
        let query = load_query(&file).unwrap();
        assert_eq!(query, Query::definitions(Descriptor::Method(bar())));
    }
}

// ============================================================================
// Binary
// ============================================================================

mod binary {
    use super::*;

    fn tugsearch() -> Command {
        Command::new(env!("CARGO_BIN_EXE_tugsearch"))
    }

    #[test]
    fn search_prints_json_response() {
        let temp = snapshot_dir();
        let query_file = temp.path().join("q.query");
        write_json(&query_file, &Query::definitions(Descriptor::Method(bar())));

        let output = tugsearch()
            .args(["search", "--code"])
            .arg(temp.path())
            .arg("--query")
            .arg(&query_file)
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["results"][0]["file"], "p/A.java");
        assert_eq!(json["results"][0]["line"], 2);
    }

    #[test]
    fn search_text_format() {
        let temp = snapshot_dir();
        let query_file = temp.path().join("q.query");
        write_json(&query_file, &Query::usages(bar()));

        let output = tugsearch()
            .args(["search", "--format", "text", "--code"])
            .arg(temp.path())
            .arg("--query")
            .arg(&query_file)
            .output()
            .unwrap();
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(stdout.starts_with("p/B.java:4: "));
    }

    #[test]
    fn missing_code_base_exits_with_resolution_code() {
        let temp = TempDir::new().unwrap();
        let output = tugsearch()
            .args(["stats", "--code"])
            .arg(temp.path().join("missing"))
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(3));

        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["status"], "error");
    }

    #[test]
    fn stats_reports_counts() {
        let temp = snapshot_dir();
        let output = tugsearch()
            .args(["stats", "--parallel", "--code"])
            .arg(temp.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["code_base"]["files"], 2);
        assert_eq!(json["code_base"]["calls"], 1);
        assert_eq!(json["code_base"]["resolved_calls"], 1);
    }
}
