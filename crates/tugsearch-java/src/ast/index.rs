//! Indexed arena over a code base.
//!
//! `CodeIndex` borrows a `CodeBase` and maps every id to its node plus the
//! structural facts resolution needs: owning file, enclosing type, enclosing
//! method and the type's qualified name. It is built once per run by a
//! single visitor pass and never mutated afterwards, so it can be shared
//! freely between worker threads.

use std::collections::HashMap;
use std::path::Path;

use super::codebase::CodeBase;
use super::ids::{CallId, FileId, MethodId, TypeId, VarId};
use super::nodes::{
    CompilationUnit, Initializer, MethodCall, MethodDeclaration, TypeDeclaration,
    VariableDeclaration,
};
use super::visit::{walk_code_base, VisitResult, Visitor};

/// A type declaration with its position in the code base.
#[derive(Debug, Clone)]
pub struct TypeEntry<'a> {
    pub id: TypeId,
    pub decl: &'a TypeDeclaration,
    pub file: FileId,
    /// Lexically enclosing type, `None` for top-level types.
    pub parent: Option<TypeId>,
    /// Declared inside a method or initializer body.
    pub local: bool,
    /// `package.Outer.Inner`.
    pub qualified_name: String,
}

/// A method or constructor with its owner.
#[derive(Debug, Clone)]
pub struct MethodEntry<'a> {
    pub id: MethodId,
    pub decl: &'a MethodDeclaration,
    pub file: FileId,
    pub owner: TypeId,
    pub constructor: bool,
}

/// A variable declaration with its scope.
#[derive(Debug, Clone)]
pub struct VariableEntry<'a> {
    pub id: VarId,
    pub decl: &'a VariableDeclaration,
    pub file: FileId,
    /// Innermost enclosing type.
    pub owner: TypeId,
    /// Enclosing method, for parameters and locals of a method body.
    pub method: Option<MethodId>,
}

/// A call site with its scope.
#[derive(Debug, Clone)]
pub struct CallEntry<'a> {
    pub id: CallId,
    pub call: &'a MethodCall,
    pub file: FileId,
    /// Innermost enclosing type.
    pub owner: TypeId,
    /// Enclosing method, `None` in field initializers and initializer blocks.
    pub method: Option<MethodId>,
}

/// Id-indexed view of a `CodeBase`.
#[derive(Debug)]
pub struct CodeIndex<'a> {
    code: &'a CodeBase,
    types: Vec<Option<TypeEntry<'a>>>,
    methods: Vec<Option<MethodEntry<'a>>>,
    variables: Vec<Option<VariableEntry<'a>>>,
    calls: Vec<Option<CallEntry<'a>>>,
    by_qualified_name: HashMap<String, TypeId>,
    children: HashMap<TypeId, Vec<TypeId>>,
}

impl<'a> CodeIndex<'a> {
    /// Index every node of a code base.
    pub fn build(code: &'a CodeBase) -> Self {
        let counts = code.counts();
        let mut builder = IndexBuilder {
            index: CodeIndex {
                code,
                types: Vec::with_capacity(counts.types),
                methods: Vec::with_capacity(counts.methods),
                variables: Vec::with_capacity(counts.variables),
                calls: Vec::with_capacity(counts.calls),
                by_qualified_name: HashMap::new(),
                children: HashMap::new(),
            },
            file: FileId::default(),
            package: None,
            frames: Vec::new(),
        };
        walk_code_base(&mut builder, code);
        builder.index
    }

    /// The indexed code base.
    pub fn code(&self) -> &'a CodeBase {
        self.code
    }

    pub fn type_entry(&self, id: TypeId) -> Option<&TypeEntry<'a>> {
        self.types.get(id.index()).and_then(Option::as_ref)
    }

    pub fn method(&self, id: MethodId) -> Option<&MethodEntry<'a>> {
        self.methods.get(id.index()).and_then(Option::as_ref)
    }

    pub fn variable(&self, id: VarId) -> Option<&VariableEntry<'a>> {
        self.variables.get(id.index()).and_then(Option::as_ref)
    }

    pub fn call(&self, id: CallId) -> Option<&CallEntry<'a>> {
        self.calls.get(id.index()).and_then(Option::as_ref)
    }

    /// All types in id order.
    pub fn types(&self) -> impl Iterator<Item = &TypeEntry<'a>> {
        self.types.iter().flatten()
    }

    /// All methods and constructors in id order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodEntry<'a>> {
        self.methods.iter().flatten()
    }

    /// All variables in id order.
    pub fn variables(&self) -> impl Iterator<Item = &VariableEntry<'a>> {
        self.variables.iter().flatten()
    }

    /// All call sites in id order.
    pub fn calls(&self) -> impl Iterator<Item = &CallEntry<'a>> {
        self.calls.iter().flatten()
    }

    /// Upper bound (exclusive) of method ids.
    pub fn method_slots(&self) -> usize {
        self.methods.len()
    }

    /// Upper bound (exclusive) of variable ids.
    pub fn variable_slots(&self) -> usize {
        self.variables.len()
    }

    /// Upper bound (exclusive) of call ids.
    pub fn call_slots(&self) -> usize {
        self.calls.len()
    }

    /// Exact lookup of a declared type by qualified name.
    pub fn type_by_qualified_name(&self, name: &str) -> Option<TypeId> {
        self.by_qualified_name.get(name).copied()
    }

    /// Types declared directly inside `ty`: member types and local classes
    /// of its bodies, in source order.
    pub fn children(&self, ty: TypeId) -> &[TypeId] {
        self.children.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The compilation unit of a file.
    pub fn unit(&self, file: FileId) -> Option<&'a CompilationUnit> {
        self.code.file(file).map(|f| &f.unit)
    }

    /// The path of a file.
    pub fn path(&self, file: FileId) -> &'a Path {
        self.code.path(file)
    }

    /// The top-level type of a file.
    pub fn top_level_type(&self, file: FileId) -> Option<TypeId> {
        self.unit(file).map(|u| u.type_decl.id)
    }

    /// `ty` followed by its lexically enclosing types, innermost first.
    pub fn enclosing_chain(&self, ty: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = Some(ty);
        while let Some(id) = current {
            chain.push(id);
            current = self.type_entry(id).and_then(|e| e.parent);
        }
        chain
    }

    /// Qualified name of a declared type, empty if unknown.
    pub fn qualified_name(&self, ty: TypeId) -> &str {
        self.type_entry(ty)
            .map(|e| e.qualified_name.as_str())
            .unwrap_or("")
    }
}

// ============================================================================
// Builder
// ============================================================================

fn place<T>(slots: &mut Vec<Option<T>>, index: usize, entry: T) {
    if slots.len() <= index {
        slots.resize_with(index + 1, || None);
    }
    slots[index] = Some(entry);
}

enum Frame {
    Type(TypeId),
    Body(Option<MethodId>),
}

struct IndexBuilder<'a> {
    index: CodeIndex<'a>,
    file: FileId,
    package: Option<&'a str>,
    frames: Vec<Frame>,
}

impl IndexBuilder<'_> {
    fn current_type(&self) -> Option<TypeId> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Type(id) => Some(*id),
            Frame::Body(_) => None,
        })
    }

    /// The method whose body we are directly in; a nested type resets it.
    fn current_method(&self) -> Option<MethodId> {
        match self.frames.last() {
            Some(Frame::Body(method)) => *method,
            _ => None,
        }
    }
}

impl<'a> Visitor<'a> for IndexBuilder<'a> {
    fn visit_compilation_unit(&mut self, file: FileId, unit: &'a CompilationUnit) -> VisitResult {
        self.file = file;
        self.package = unit.package.as_deref();
        self.frames.clear();
        VisitResult::Continue
    }

    fn visit_type(&mut self, decl: &'a TypeDeclaration) -> VisitResult {
        let parent = self.current_type();
        let local = matches!(self.frames.last(), Some(Frame::Body(_)));
        let qualified_name = match parent {
            Some(parent) => format!("{}.{}", self.index.qualified_name(parent), decl.name),
            None => match self.package {
                Some(package) if !package.is_empty() => format!("{}.{}", package, decl.name),
                _ => decl.name.clone(),
            },
        };
        self.index
            .by_qualified_name
            .entry(qualified_name.clone())
            .or_insert(decl.id);
        if let Some(parent) = parent {
            self.index.children.entry(parent).or_default().push(decl.id);
        }
        place(
            &mut self.index.types,
            decl.id.index(),
            TypeEntry {
                id: decl.id,
                decl,
                file: self.file,
                parent,
                local,
                qualified_name,
            },
        );
        self.frames.push(Frame::Type(decl.id));
        VisitResult::Continue
    }

    fn leave_type(&mut self, _decl: &'a TypeDeclaration) {
        self.frames.pop();
    }

    fn visit_method(&mut self, decl: &'a MethodDeclaration, constructor: bool) -> VisitResult {
        if let Some(owner) = self.current_type() {
            place(
                &mut self.index.methods,
                decl.id.index(),
                MethodEntry {
                    id: decl.id,
                    decl,
                    file: self.file,
                    owner,
                    constructor,
                },
            );
        }
        self.frames.push(Frame::Body(Some(decl.id)));
        VisitResult::Continue
    }

    fn leave_method(&mut self, _decl: &'a MethodDeclaration, _constructor: bool) {
        self.frames.pop();
    }

    fn visit_initializer(&mut self, _init: &'a Initializer) -> VisitResult {
        self.frames.push(Frame::Body(None));
        VisitResult::Continue
    }

    fn leave_initializer(&mut self, _init: &'a Initializer) {
        self.frames.pop();
    }

    fn visit_variable(&mut self, decl: &'a VariableDeclaration) -> VisitResult {
        if let Some(owner) = self.current_type() {
            let method = self.current_method();
            place(
                &mut self.index.variables,
                decl.id.index(),
                VariableEntry {
                    id: decl.id,
                    decl,
                    file: self.file,
                    owner,
                    method,
                },
            );
        }
        VisitResult::Continue
    }

    fn visit_method_call(&mut self, call: &'a MethodCall) -> VisitResult {
        if let Some(owner) = self.current_type() {
            let method = self.current_method();
            place(
                &mut self.index.calls,
                call.id.index(),
                CallEntry {
                    id: call.id,
                    call,
                    file: self.file,
                    owner,
                    method,
                },
            );
        }
        VisitResult::Continue
    }
}
