//! The code base: every compilation unit of one analysis run.
//!
//! `CodeBase::new` takes ownership of the parsed units, orders them by path
//! and assigns ids in one pre-order walk. After that the tree is immutable;
//! all resolution results live in side tables keyed by id.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ids::{CallId, FileId, MethodId, TypeId, VarId};
use super::nodes::{
    Block, CompilationUnit, Expr, LambdaBody, Member, MethodDeclaration, Stmt, TypeDeclaration,
    VariableDeclaration, VariableKind,
};

/// One file: its path and parsed unit.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub unit: CompilationUnit,
}

impl SourceFile {
    /// File name without directory or extension: `src/p/B.java` is `B`.
    pub fn stem(&self) -> &str {
        file_stem(&self.path)
    }
}

/// The base name of a path without its extension.
pub fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

/// Number of nodes of each id kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeCounts {
    pub files: usize,
    pub types: usize,
    pub methods: usize,
    pub variables: usize,
    pub calls: usize,
}

/// All compilation units of a run, in path order.
#[derive(Debug, Clone)]
pub struct CodeBase {
    files: Vec<SourceFile>,
    counts: NodeCounts,
}

impl CodeBase {
    /// Build a code base, assigning ids.
    ///
    /// Units are ordered by path; a path given twice keeps its last unit.
    /// Variable kinds are normalized by position (type members are fields,
    /// method and catch parameters are parameters, everything else local),
    /// so a front end does not have to get them right.
    pub fn new(units: impl IntoIterator<Item = (PathBuf, CompilationUnit)>) -> Self {
        let ordered: BTreeMap<PathBuf, CompilationUnit> = units.into_iter().collect();
        let mut numbering = Numbering::default();
        let files: Vec<SourceFile> = ordered
            .into_iter()
            .map(|(path, mut unit)| {
                numbering.number_type(&mut unit.type_decl);
                SourceFile { path, unit }
            })
            .collect();
        let counts = NodeCounts {
            files: files.len(),
            types: numbering.types as usize,
            methods: numbering.methods as usize,
            variables: numbering.variables as usize,
            calls: numbering.calls as usize,
        };
        CodeBase { files, counts }
    }

    /// Files in path order; the position is the `FileId`.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// `(FileId, unit)` pairs in path order.
    pub fn units(&self) -> impl Iterator<Item = (FileId, &CompilationUnit)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, f)| (FileId::new(i as u32), &f.unit))
    }

    /// Look up a file.
    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// Path of a file, empty if the id is unknown.
    pub fn path(&self, id: FileId) -> &Path {
        self.file(id).map(|f| f.path.as_path()).unwrap_or(Path::new(""))
    }

    /// Node counts per id kind.
    pub fn counts(&self) -> NodeCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// ============================================================================
// Id assignment
// ============================================================================

#[derive(Default)]
struct Numbering {
    types: u32,
    methods: u32,
    variables: u32,
    calls: u32,
}

impl Numbering {
    fn number_type(&mut self, decl: &mut TypeDeclaration) {
        decl.id = TypeId::new(self.types);
        self.types += 1;
        for member in &mut decl.members {
            match member {
                Member::Field(field) => self.number_variable(field, VariableKind::Field),
                Member::Method(method) | Member::Constructor(method) => self.number_method(method),
                Member::Initializer(init) => self.number_block(&mut init.body),
                Member::Type(nested) => self.number_type(nested),
                Member::EnumConstant(constant) => {
                    for arg in &mut constant.arguments {
                        self.number_expr(arg);
                    }
                }
                Member::Comment(_) => {}
            }
        }
    }

    fn number_method(&mut self, decl: &mut MethodDeclaration) {
        decl.id = MethodId::new(self.methods);
        self.methods += 1;
        for param in &mut decl.parameters {
            self.number_variable(param, VariableKind::Parameter);
        }
        if let Some(body) = &mut decl.body {
            self.number_block(body);
        }
    }

    fn number_variable(&mut self, decl: &mut VariableDeclaration, kind: VariableKind) {
        decl.id = VarId::new(self.variables);
        decl.kind = kind;
        self.variables += 1;
        if let Some(init) = &mut decl.initializer {
            self.number_expr(init);
        }
    }

    fn number_block(&mut self, block: &mut Block) {
        for stmt in &mut block.statements {
            self.number_stmt(stmt);
        }
    }

    fn number_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Block(block) => self.number_block(block),
            Stmt::LocalVariable(decl) => self.number_variable(decl, VariableKind::Local),
            Stmt::LocalClass(decl) => self.number_type(decl),
            Stmt::Expression { expr, .. } => self.number_expr(expr),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.number_expr(condition);
                self.number_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.number_stmt(else_branch);
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                self.number_expr(condition);
                self.number_stmt(body);
            }
            Stmt::DoWhile {
                body, condition, ..
            } => {
                self.number_stmt(body);
                self.number_expr(condition);
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                for s in init {
                    self.number_stmt(s);
                }
                if let Some(condition) = condition {
                    self.number_expr(condition);
                }
                for e in update {
                    self.number_expr(e);
                }
                self.number_stmt(body);
            }
            Stmt::ForEach {
                variable,
                iterable,
                body,
                ..
            } => {
                self.number_variable(variable, VariableKind::Local);
                self.number_expr(iterable);
                self.number_stmt(body);
            }
            Stmt::Switch {
                selector, cases, ..
            } => {
                self.number_expr(selector);
                for case in cases {
                    for label in &mut case.labels {
                        self.number_expr(label);
                    }
                    for s in &mut case.statements {
                        self.number_stmt(s);
                    }
                }
            }
            Stmt::Synchronized { lock, body, .. } => {
                self.number_expr(lock);
                self.number_block(body);
            }
            Stmt::Try {
                resources,
                body,
                catches,
                finally,
                ..
            } => {
                for resource in resources {
                    self.number_variable(resource, VariableKind::Local);
                }
                self.number_block(body);
                for clause in catches {
                    self.number_variable(&mut clause.parameter, VariableKind::Parameter);
                    self.number_block(&mut clause.body);
                }
                if let Some(finally) = finally {
                    self.number_block(finally);
                }
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.number_expr(value);
                }
            }
            Stmt::Throw { value, .. } => self.number_expr(value),
            Stmt::Labeled { body, .. } => self.number_stmt(body),
            Stmt::Assert {
                condition, message, ..
            } => {
                self.number_expr(condition);
                if let Some(message) = message {
                    self.number_expr(message);
                }
            }
            Stmt::Comment(_) | Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Empty { .. } => {}
        }
    }

    fn number_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Literal { .. } | Expr::Name { .. } | Expr::This | Expr::Super => {}
            Expr::FieldAccess { target, .. } | Expr::MethodReference { target, .. } => {
                self.number_expr(target)
            }
            Expr::MethodCall(call) => {
                call.id = CallId::new(self.calls);
                self.calls += 1;
                if let Some(receiver) = &mut call.receiver {
                    self.number_expr(receiver);
                }
                for arg in &mut call.arguments {
                    self.number_expr(arg);
                }
            }
            Expr::New { arguments, .. } => {
                for arg in arguments {
                    self.number_expr(arg);
                }
            }
            Expr::NewArray {
                sizes, initializer, ..
            } => {
                for size in sizes {
                    self.number_expr(size);
                }
                if let Some(elements) = initializer {
                    for element in elements {
                        self.number_expr(element);
                    }
                }
            }
            Expr::ArrayInit { elements } => {
                for element in elements {
                    self.number_expr(element);
                }
            }
            Expr::ArrayAccess { array, index } => {
                self.number_expr(array);
                self.number_expr(index);
            }
            Expr::Cast { operand, .. } | Expr::InstanceOf { operand, .. } => self.number_expr(operand),
            Expr::Unary { operand, .. } => self.number_expr(operand),
            Expr::Binary { left, right, .. } => {
                self.number_expr(left);
                self.number_expr(right);
            }
            Expr::Assign { target, value, .. } => {
                self.number_expr(target);
                self.number_expr(value);
            }
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.number_expr(condition);
                self.number_expr(then_expr);
                self.number_expr(else_expr);
            }
            Expr::Lambda { body, .. } => match body {
                LambdaBody::Expr(expr) => self.number_expr(expr),
                LambdaBody::Block(block) => self.number_block(block),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::{CompilationUnit, Expr, MethodDeclaration, Stmt, TypeDeclaration};

    fn unit(name: &str) -> CompilationUnit {
        CompilationUnit::new(
            TypeDeclaration::class(name)
                .with_field(VariableDeclaration::local("int", "x"))
                .with_method(
                    MethodDeclaration::new("f", "void")
                        .with_parameter("int", "a")
                        .with_body(vec![Stmt::expression(Expr::call_on(
                            Expr::call("g", vec![]),
                            "h",
                            vec![Expr::call("k", vec![])],
                        ))]),
                ),
        )
    }

    #[test]
    fn test_files_are_path_ordered() {
        let code = CodeBase::new(vec![
            (PathBuf::from("b/B.java"), unit("B")),
            (PathBuf::from("a/A.java"), unit("A")),
        ]);
        let names: Vec<&str> = code
            .units()
            .map(|(_, u)| u.type_decl.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(code.files()[1].stem(), "B");
        assert_eq!(code.path(FileId::new(0)), Path::new("a/A.java"));
    }

    #[test]
    fn test_ids_are_dense_preorder() {
        let code = CodeBase::new(vec![
            (PathBuf::from("A.java"), unit("A")),
            (PathBuf::from("B.java"), unit("B")),
        ]);
        let counts = code.counts();
        assert_eq!(counts.files, 2);
        assert_eq!(counts.types, 2);
        assert_eq!(counts.methods, 2);
        assert_eq!(counts.variables, 4);
        assert_eq!(counts.calls, 6);

        let b = &code.files()[1].unit.type_decl;
        assert_eq!(b.id, TypeId::new(1));
        let method = b.methods().next().unwrap();
        assert_eq!(method.id, MethodId::new(1));
        // Outer call first, then its receiver, then its argument.
        match &method.body.as_ref().unwrap().statements[0] {
            Stmt::Expression {
                expr: Expr::MethodCall(call),
                ..
            } => {
                assert_eq!(call.id, CallId::new(3));
                match call.receiver.as_deref() {
                    Some(Expr::MethodCall(inner)) => assert_eq!(inner.id, CallId::new(4)),
                    other => panic!("unexpected receiver {:?}", other),
                }
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_variable_kinds_are_normalized() {
        let code = CodeBase::new(vec![(PathBuf::from("A.java"), unit("A"))]);
        let a = &code.files()[0].unit.type_decl;
        assert_eq!(a.fields().next().unwrap().kind, VariableKind::Field);
        assert_eq!(
            a.methods().next().unwrap().parameters[0].kind,
            VariableKind::Parameter
        );
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("src/p/Util.java")), "Util");
        assert_eq!(file_stem(Path::new("B")), "B");
    }
}
