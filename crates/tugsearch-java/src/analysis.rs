//! The resolution pipeline.
//!
//! [`Analysis::run`] executes the passes over a code base in their fixed
//! order. Each pass only reads what earlier passes finished:
//!
//! 1. index: ids to nodes, qualified names
//! 2. hierarchy: supertype names resolved, forest grafted
//! 3. signature types: return, parameter and variable types
//! 4. usages: every call site resolved and recorded
//!
//! The result is read-only and serves any number of queries.

use std::collections::BTreeMap;

use tracing::{debug, info, info_span};

use crate::ast::{CodeBase, CodeIndex};
use crate::hierarchy::{TypeHierarchy, UNIVERSAL_ROOT};
use crate::method_types::SignatureTypes;
use crate::qualified_name::NameResolver;
use crate::usage::{resolve_usages, CallResolver, Usages};

/// Options for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Process files of the signature and usage passes on the rayon pool.
    pub parallel: bool,
    /// Name of the implicit root of the type forest.
    pub universal_root: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            parallel: false,
            universal_root: UNIVERSAL_ROOT.to_string(),
        }
    }
}

impl AnalysisOptions {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_universal_root(mut self, root: impl Into<String>) -> Self {
        self.universal_root = root.into();
        self
    }
}

/// The fully enriched model of a code base.
#[derive(Debug)]
pub struct Analysis<'a> {
    index: CodeIndex<'a>,
    names: NameResolver,
    hierarchy: TypeHierarchy,
    signatures: SignatureTypes,
    usages: Usages,
}

impl<'a> Analysis<'a> {
    /// Run every pass over `code`.
    pub fn run(code: &'a CodeBase, options: &AnalysisOptions) -> Self {
        let _span = info_span!("analysis", files = code.len(), parallel = options.parallel).entered();

        let index = CodeIndex::build(code);
        let names = NameResolver::new();
        let hierarchy = TypeHierarchy::build(&index, &names, &options.universal_root);
        debug!(stats = ?names.stats(), "name resolution after hierarchy");
        let signatures = SignatureTypes::build(&index, &names, options.parallel);
        let usages = {
            let resolver = CallResolver::new(&index, &names, &hierarchy, &signatures);
            resolve_usages(&resolver, options.parallel)
        };

        let counts = code.counts();
        info!(
            files = counts.files,
            types = counts.types,
            methods = counts.methods,
            calls = counts.calls,
            resolved = usages.resolved_count(),
            "analysis complete"
        );

        Analysis {
            index,
            names,
            hierarchy,
            signatures,
            usages,
        }
    }

    pub fn index(&self) -> &CodeIndex<'a> {
        &self.index
    }

    pub fn code(&self) -> &'a CodeBase {
        self.index.code()
    }

    pub fn names(&self) -> &NameResolver {
        &self.names
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    pub fn signatures(&self) -> &SignatureTypes {
        &self.signatures
    }

    pub fn usages(&self) -> &Usages {
        &self.usages
    }

    /// A call resolver over the finished passes.
    pub fn resolver(&self) -> CallResolver<'_, 'a> {
        CallResolver::new(&self.index, &self.names, &self.hierarchy, &self.signatures)
    }

    /// Node and resolution counts of the code base.
    pub fn stats(&self) -> BTreeMap<String, u64> {
        let counts = self.code().counts();
        let mut stats = BTreeMap::new();
        stats.insert("files".to_string(), counts.files as u64);
        stats.insert("types".to_string(), counts.types as u64);
        stats.insert("methods".to_string(), counts.methods as u64);
        stats.insert("variables".to_string(), counts.variables as u64);
        stats.insert("calls".to_string(), counts.calls as u64);
        stats.insert(
            "resolved_calls".to_string(),
            self.usages.resolved_count() as u64,
        );
        stats.insert(
            "hierarchy_nodes".to_string(),
            self.hierarchy.node_count() as u64,
        );
        stats.insert(
            "partial_hierarchies".to_string(),
            self.hierarchy.partial_count() as u64,
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompilationUnit, Expr, MethodDeclaration, Stmt, TypeDeclaration};
    use std::path::PathBuf;

    fn code() -> CodeBase {
        CodeBase::new(vec![
            (
                PathBuf::from("A.java"),
                CompilationUnit::new(
                    TypeDeclaration::class("A")
                        .with_method(MethodDeclaration::new("bar", "void").with_parameter("String", "s")),
                ),
            ),
            (
                PathBuf::from("B.java"),
                CompilationUnit::new(TypeDeclaration::class("B").extends("A").with_method(
                    MethodDeclaration::new("call", "void").with_body(vec![
                        Stmt::expression(Expr::call("bar", vec![Expr::string("x")])),
                        Stmt::expression(Expr::call("missing", vec![])),
                    ]),
                )),
            ),
        ])
    }

    #[test]
    fn test_options_builders() {
        let options = AnalysisOptions::default()
            .with_parallel(true)
            .with_universal_root("Root");
        assert!(options.parallel);
        assert_eq!(options.universal_root, "Root");
        assert_eq!(AnalysisOptions::default().universal_root, UNIVERSAL_ROOT);
    }

    #[test]
    fn test_run_and_stats() {
        let code = code();
        let analysis = Analysis::run(&code, &AnalysisOptions::default());
        let stats = analysis.stats();
        assert_eq!(stats["files"], 2);
        assert_eq!(stats["types"], 2);
        assert_eq!(stats["calls"], 2);
        assert_eq!(stats["resolved_calls"], 1);
        assert_eq!(analysis.hierarchy().root_name(), UNIVERSAL_ROOT);

        let bar = analysis
            .index()
            .methods()
            .find(|m| m.decl.name == "bar")
            .unwrap();
        assert_eq!(analysis.usages().usages(bar.id).len(), 1);
    }
}
