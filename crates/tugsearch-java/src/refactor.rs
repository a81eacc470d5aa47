//! The refactor executor seam.
//!
//! Searching produces [`RefactorTarget`]s that borrow the analyzed AST.
//! Rewriting source text is the job of a [`Refactorer`]; this module only
//! groups the targets by file and drives the executor.
//!
//! [`PreviewRefactorer`] is the executor the CLI uses: it leaves files alone
//! and reports the one-line pseudocode each target would read as afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info_span};
use tugsearch_core::{SearchError, SearchResult};

use crate::ast::{Expr, MethodCall, Pseudocode, VariableDeclaration};
use crate::matcher::Candidate;
use crate::query::RefactorDirective;
use crate::search::{RefactorTarget, TargetNode};

/// An executor for refactor directives.
pub trait Refactorer {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Apply `directive` to the targets of one file.
    ///
    /// # Arguments
    ///
    /// * `path` - The file being rewritten
    /// * `directive` - What to do
    /// * `targets` - Targets in this file, in search order
    ///
    /// # Returns
    ///
    /// One record per rewritten site.
    fn apply_file(
        &mut self,
        path: &Path,
        directive: &RefactorDirective,
        targets: &[RefactorTarget<'_>],
    ) -> Result<Vec<SearchResult>, SearchError>;
}

/// Run `refactorer` over `targets`, once per file in path order.
///
/// Stops at the first file the executor fails on.
pub fn apply_refactor<R: Refactorer + ?Sized>(
    refactorer: &mut R,
    directive: &RefactorDirective,
    targets: &[RefactorTarget<'_>],
) -> Result<Vec<SearchResult>, SearchError> {
    let _span = info_span!("refactor", executor = refactorer.name(), targets = targets.len()).entered();

    let mut by_file: BTreeMap<&Path, Vec<RefactorTarget<'_>>> = BTreeMap::new();
    for target in targets {
        by_file.entry(target.path).or_default().push(*target);
    }

    let mut records = Vec::new();
    for (path, file_targets) in &by_file {
        debug!(file = %path.display(), targets = file_targets.len(), "applying directive");
        records.extend(refactorer.apply_file(path, directive, file_targets)?);
    }
    Ok(records)
}

// ============================================================================
// Preview
// ============================================================================

/// Reports rewritten pseudocode without touching any file.
///
/// Change-parameters keeps existing call arguments by position; positions
/// beyond the old arity are filled with the new parameter names.
#[derive(Debug, Default, Clone, Copy)]
pub struct PreviewRefactorer;

impl Refactorer for PreviewRefactorer {
    fn name(&self) -> &str {
        "preview"
    }

    fn apply_file(
        &mut self,
        path: &Path,
        directive: &RefactorDirective,
        targets: &[RefactorTarget<'_>],
    ) -> Result<Vec<SearchResult>, SearchError> {
        targets
            .iter()
            .map(|target| {
                let code = preview(directive, &target.node).ok_or_else(|| {
                    SearchError::refactor_failed(
                        format!("cannot apply directive to '{}'", target.node.summary()),
                        Some(path.display().to_string()),
                    )
                })?;
                Ok(SearchResult::new(
                    path.display().to_string(),
                    target.node.line().unwrap_or(0),
                    code,
                ))
            })
            .collect()
    }
}

fn preview(directive: &RefactorDirective, node: &TargetNode<'_>) -> Option<String> {
    match directive {
        RefactorDirective::Rename { new_name } => rename(node, new_name),
        RefactorDirective::ChangeParameters { parameters } => match *node {
            TargetNode::Node(Candidate::Method { decl, .. }) => {
                let mut changed = decl.clone();
                changed.parameters = parameters
                    .iter()
                    .map(|p| VariableDeclaration::parameter(p.type_name.clone(), p.name.clone()))
                    .collect();
                Some(changed.summary())
            }
            TargetNode::Call(call) => {
                let arguments = parameters
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        call.arguments
                            .get(i)
                            .cloned()
                            .unwrap_or_else(|| Expr::name(p.name.clone()))
                    })
                    .collect();
                Some(MethodCall { arguments, ..call.clone() }.summary())
            }
            TargetNode::Node(_) => None,
        },
    }
}

fn rename(node: &TargetNode<'_>, new_name: &str) -> Option<String> {
    Some(match *node {
        TargetNode::Call(call) => MethodCall {
            name: new_name.to_string(),
            ..call.clone()
        }
        .summary(),
        TargetNode::Node(Candidate::Method { decl, .. }) => {
            let mut renamed = decl.clone();
            renamed.name = new_name.to_string();
            renamed.summary()
        }
        TargetNode::Node(Candidate::Type(decl)) => {
            let mut renamed = decl.clone();
            renamed.name = new_name.to_string();
            renamed.summary()
        }
        TargetNode::Node(Candidate::Variable(decl)) => {
            let mut renamed = decl.clone();
            renamed.name = new_name.to_string();
            renamed.summary()
        }
        TargetNode::Node(
            Candidate::Statement(_) | Candidate::Conditional(_) | Candidate::Comment(_),
        ) => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Comment, FileId, MethodDeclaration};
    use crate::query::NewParameter;

    struct Recording {
        files: Vec<String>,
        fail_on: Option<&'static str>,
    }

    impl Refactorer for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn apply_file(
            &mut self,
            path: &Path,
            _directive: &RefactorDirective,
            targets: &[RefactorTarget<'_>],
        ) -> Result<Vec<SearchResult>, SearchError> {
            let file = path.display().to_string();
            if self.fail_on == Some(file.as_str()) {
                return Err(SearchError::refactor_failed("disk full", Some(file)));
            }
            self.files.push(format!("{}:{}", file, targets.len()));
            Ok(vec![SearchResult::new(file, 0, "")])
        }
    }

    fn rename_to(name: &str) -> RefactorDirective {
        RefactorDirective::Rename {
            new_name: name.to_string(),
        }
    }

    #[test]
    fn test_groups_by_file_in_path_order() {
        let a = MethodCall::new("bar", vec![]);
        let targets = vec![
            RefactorTarget {
                file: FileId::new(1),
                path: Path::new("b/B.java"),
                node: TargetNode::Call(&a),
            },
            RefactorTarget {
                file: FileId::new(0),
                path: Path::new("a/A.java"),
                node: TargetNode::Call(&a),
            },
            RefactorTarget {
                file: FileId::new(1),
                path: Path::new("b/B.java"),
                node: TargetNode::Call(&a),
            },
        ];
        let mut recording = Recording {
            files: Vec::new(),
            fail_on: None,
        };
        let records = apply_refactor(&mut recording, &rename_to("baz"), &targets).unwrap();
        assert_eq!(recording.files, vec!["a/A.java:1", "b/B.java:2"]);
        assert_eq!(records.len(), 2);

        let mut failing = Recording {
            files: Vec::new(),
            fail_on: Some("a/A.java"),
        };
        let err = apply_refactor(&mut failing, &rename_to("baz"), &targets).unwrap_err();
        assert!(matches!(err, SearchError::RefactorFailed { .. }));
        assert!(failing.files.is_empty());
    }

    #[test]
    fn test_preview_rename() {
        let decl = MethodDeclaration::new("bar", "void")
            .with_parameter("String", "s")
            .with_body(vec![]);
        let owner = crate::ast::TypeDeclaration::class("A");
        let call = MethodCall::new("bar", vec![Expr::string("x")]).on(Expr::name("a"));
        let targets = [
            RefactorTarget {
                file: FileId::new(0),
                path: Path::new("A.java"),
                node: TargetNode::Node(Candidate::Method {
                    decl: &decl,
                    constructor: false,
                    owner: &owner,
                }),
            },
            RefactorTarget {
                file: FileId::new(0),
                path: Path::new("A.java"),
                node: TargetNode::Call(&call),
            },
        ];
        let records =
            apply_refactor(&mut PreviewRefactorer, &rename_to("baz"), &targets).unwrap();
        let code: Vec<&str> = records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(code, vec!["void baz(String s) {}", "a.baz(\"x\")"]);
    }

    #[test]
    fn test_preview_change_parameters() {
        let call = MethodCall::new("bar", vec![Expr::string("x")]);
        let directive = RefactorDirective::ChangeParameters {
            parameters: vec![
                NewParameter {
                    type_name: "String".to_string(),
                    name: "s".to_string(),
                },
                NewParameter {
                    type_name: "int".to_string(),
                    name: "count".to_string(),
                },
            ],
        };
        let target = RefactorTarget {
            file: FileId::new(0),
            path: Path::new("B.java"),
            node: TargetNode::Call(&call),
        };
        let records = apply_refactor(&mut PreviewRefactorer, &directive, &[target]).unwrap();
        assert_eq!(records[0].code, "bar(\"x\", count)");
    }

    #[test]
    fn test_preview_rejects_comments() {
        let comment = Comment::line_comment("note");
        let target = RefactorTarget {
            file: FileId::new(0),
            path: Path::new("A.java"),
            node: TargetNode::Node(Candidate::Comment(&comment)),
        };
        let err = apply_refactor(&mut PreviewRefactorer, &rename_to("x"), &[target]).unwrap_err();
        assert_eq!(err.error_code().code(), 4);
    }
}
