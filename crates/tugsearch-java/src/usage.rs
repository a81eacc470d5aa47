//! Method call resolution and the usage pass.
//!
//! [`CallResolver`] maps a call expression at a [`CallSite`] to the method
//! declaration it targets. The usage pass walks every file with a
//! [`TraversalContext`], resolves each call site once, and records the call
//! against the resolved method.
//!
//! # Lookup
//!
//! - **Unqualified** `f(..)`: the current type's methods, then the methods
//!   of its ancestors (superclass chain first, then interfaces)
//! - **Qualified** `r.f(..)`: the receiver's static type is found first,
//!   then its methods are searched the same way
//!
//! A receiver is `this`, `super`, a variable (bindings, current block,
//! fields of the current type and its ancestors), a field access, a call,
//! or a name that resolves to a declared type, which makes a static
//! receiver.
//!
//! # Overloads
//!
//! The first declaration, in declaration order, that passes every check
//! wins. There is no most-specific ranking. See [`CallResolver::accepts`].
//!
//! Any step that cannot establish a type leaves the call unresolved.

use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use tracing::{debug, info, info_span, trace};

use crate::ast::{
    walk_compilation_unit, Block, CallId, CatchClause, CodeIndex, CompilationUnit, Expr, FileId,
    Initializer, Member, MethodCall, MethodDeclaration, MethodId, Stmt, TypeDeclaration, TypeId,
    VariableDeclaration, VariableKind, VisitResult, Visitor,
};
use crate::context::{Binding, CallSite, LocalLookup, TraversalContext};
use crate::hierarchy::TypeHierarchy;
use crate::method_types::{SignatureTypes, TypeInstance};
use crate::qualified_name::NameResolver;

// ============================================================================
// CallResolver
// ============================================================================

/// What a method is being looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// No receiver. From a static context only static methods qualify.
    Unqualified { static_context: bool },
    /// An instance receiver.
    Instance,
    /// A type used as receiver: only static methods qualify.
    Static,
}

/// A resolved receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    Instance(TypeId),
    Static(TypeId),
}

/// Resolves call sites against the finished hierarchy and signature types.
#[derive(Debug, Clone, Copy)]
pub struct CallResolver<'r, 'a> {
    pub(crate) index: &'r CodeIndex<'a>,
    pub(crate) names: &'r NameResolver,
    pub(crate) hierarchy: &'r TypeHierarchy,
    pub(crate) signatures: &'r SignatureTypes,
}

impl<'r, 'a> CallResolver<'r, 'a> {
    pub fn new(
        index: &'r CodeIndex<'a>,
        names: &'r NameResolver,
        hierarchy: &'r TypeHierarchy,
        signatures: &'r SignatureTypes,
    ) -> Self {
        CallResolver {
            index,
            names,
            hierarchy,
            signatures,
        }
    }

    /// Resolve a call to its declaration.
    ///
    /// # Returns
    ///
    /// The first method that accepts the call, or `None` when the receiver
    /// or an argument type cannot be established or no method accepts it.
    pub fn resolve_call(&self, site: &CallSite<'a>, call: &MethodCall) -> Option<MethodId> {
        let (owner, kind) = match call.receiver.as_deref() {
            None => (
                site.enclosing,
                CallKind::Unqualified {
                    static_context: site.is_static,
                },
            ),
            Some(receiver) => match self.receiver(site, receiver)? {
                Receiver::Instance(ty) => (ty, CallKind::Instance),
                Receiver::Static(ty) => (ty, CallKind::Static),
            },
        };
        let arguments: Vec<Option<TypeInstance>> = call
            .arguments
            .iter()
            .map(|arg| self.infer(site, arg))
            .collect();
        self.find_method(owner, &call.name, &arguments, kind)
    }

    /// The static type of a receiver expression.
    pub fn receiver(&self, site: &CallSite<'a>, expr: &Expr) -> Option<Receiver> {
        match expr {
            Expr::Name { name } => match self.lookup_variable(site, name) {
                LocalLookup::Variable(decl) => self.instance_receiver(self.declared_type(decl)?),
                LocalLookup::Untyped => None,
                LocalLookup::NotFound => {
                    let resolved = self.names.resolve(self.index, &site.scope(), name);
                    resolved.declaration.map(Receiver::Static)
                }
            },
            Expr::FieldAccess { target, name } => match self.receiver(site, target)? {
                Receiver::Instance(ty) => {
                    let field = self.find_field(ty, name)?;
                    self.instance_receiver(self.declared_type(field)?)
                }
                Receiver::Static(ty) => match self.find_field(ty, name) {
                    Some(field) => self.instance_receiver(self.declared_type(field)?),
                    None => self
                        .index
                        .children(ty)
                        .iter()
                        .copied()
                        .find(|c| {
                            self.index
                                .type_entry(*c)
                                .is_some_and(|e| e.decl.name == *name)
                        })
                        .map(Receiver::Static),
                },
            },
            _ => self.instance_receiver(self.infer(site, expr)?),
        }
    }

    fn instance_receiver(&self, ty: TypeInstance) -> Option<Receiver> {
        if ty.is_array() {
            return None;
        }
        ty.declaration.map(Receiver::Instance)
    }

    pub(crate) fn declared_type(&self, decl: &VariableDeclaration) -> Option<TypeInstance> {
        self.signatures.variable_type(decl.id).cloned()
    }

    /// Look a variable up: bindings and current block, then fields of the
    /// enclosing type and its ancestors.
    pub fn lookup_variable(&self, site: &CallSite<'a>, name: &str) -> LocalLookup<'a> {
        match site.lookup_local(name) {
            LocalLookup::NotFound => self
                .find_field(site.enclosing, name)
                .map_or(LocalLookup::NotFound, LocalLookup::Variable),
            found => found,
        }
    }

    /// `ty` followed by its declared ancestors.
    fn lookup_chain(&self, ty: TypeId) -> Vec<&'a TypeDeclaration> {
        std::iter::once(ty)
            .chain(self.hierarchy.ancestors(ty))
            .filter_map(|t| self.index.type_entry(t).map(|e| e.decl))
            .collect()
    }

    /// A field named `name` of `ty` or of one of its ancestors.
    pub fn find_field(&self, ty: TypeId, name: &str) -> Option<&'a VariableDeclaration> {
        self.lookup_chain(ty)
            .into_iter()
            .find_map(|decl| decl.fields().find(|f| f.name == name))
    }

    /// The first method of `ty` or its ancestors that accepts the call.
    pub fn find_method(
        &self,
        ty: TypeId,
        name: &str,
        arguments: &[Option<TypeInstance>],
        kind: CallKind,
    ) -> Option<MethodId> {
        for decl in self.lookup_chain(ty) {
            for member in &decl.members {
                if let Member::Method(method) = member {
                    if self.accepts(method, name, arguments, kind) {
                        return Some(method.id);
                    }
                }
            }
        }
        None
    }

    /// The overload test.
    ///
    /// A method accepts a call when the name and arity match, the static
    /// rule holds, and every parameter type is compatible with the inferred
    /// argument type: `null` fits any non-primitive parameter, dimensions
    /// must be equal, generic arguments must not conflict, and the
    /// parameter type must equal the argument type, be a supertype of it,
    /// or be `Object` for a non-primitive argument. An argument with no
    /// inferred type fits nothing.
    pub fn accepts(
        &self,
        method: &MethodDeclaration,
        name: &str,
        arguments: &[Option<TypeInstance>],
        kind: CallKind,
    ) -> bool {
        if method.name != name || method.parameters.len() != arguments.len() {
            return false;
        }
        let static_ok = match kind {
            CallKind::Unqualified { static_context } => !static_context || method.modifiers.is_static,
            CallKind::Instance => true,
            CallKind::Static => method.modifiers.is_static,
        };
        if !static_ok {
            return false;
        }
        method
            .parameters
            .iter()
            .zip(arguments)
            .all(|(param, arg)| match (self.signatures.variable_type(param.id), arg) {
                (Some(param), Some(arg)) => self.compatible(param, arg),
                _ => false,
            })
    }

    fn compatible(&self, param: &TypeInstance, arg: &TypeInstance) -> bool {
        if arg.is_null() {
            return !param.is_primitive();
        }
        if param.dimensions != arg.dimensions {
            return false;
        }
        if !param.generic_argument.is_empty()
            && !arg.generic_argument.is_empty()
            && param.generic_argument != arg.generic_argument
        {
            return false;
        }
        param.qualified_name == arg.qualified_name
            || self
                .hierarchy
                .is_subtype(&param.qualified_name, &arg.qualified_name)
            || (param.is_object() && !arg.is_primitive())
    }
}

// ============================================================================
// Usage recording
// ============================================================================

/// Concurrent append-only usage lists, one per method.
#[derive(Debug)]
pub struct UsageRecorder {
    slots: Vec<Mutex<Vec<CallId>>>,
}

impl UsageRecorder {
    pub fn new(method_slots: usize) -> Self {
        UsageRecorder {
            slots: (0..method_slots).map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    /// Append `call` to the usages of `method`.
    pub fn record(&self, method: MethodId, call: CallId) {
        if let Some(slot) = self.slots.get(method.index()) {
            slot.lock().unwrap_or_else(PoisonError::into_inner).push(call);
        }
    }

    /// Freeze the lists, each sorted by call id.
    pub fn finish(self, call_slots: usize) -> Usages {
        let by_method: Vec<Vec<CallId>> = self
            .slots
            .into_iter()
            .map(|slot| {
                let mut calls = slot.into_inner().unwrap_or_else(PoisonError::into_inner);
                calls.sort_unstable();
                calls
            })
            .collect();
        let mut by_call = vec![None; call_slots];
        for (method, calls) in by_method.iter().enumerate() {
            for call in calls {
                if let Some(slot) = by_call.get_mut(call.index()) {
                    *slot = Some(MethodId::new(method as u32));
                }
            }
        }
        Usages { by_method, by_call }
    }
}

/// The usage relation: method to calls, and call to method.
#[derive(Debug, Default)]
pub struct Usages {
    by_method: Vec<Vec<CallId>>,
    by_call: Vec<Option<MethodId>>,
}

impl Usages {
    /// Calls resolved to `method`, in call-id order.
    pub fn usages(&self, method: MethodId) -> &[CallId] {
        self.by_method
            .get(method.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The method a call resolved to.
    pub fn target(&self, call: CallId) -> Option<MethodId> {
        self.by_call.get(call.index()).copied().flatten()
    }

    /// Number of resolved calls.
    pub fn resolved_count(&self) -> usize {
        self.by_call.iter().filter(|c| c.is_some()).count()
    }
}

// ============================================================================
// Usage pass
// ============================================================================

/// Resolve every call site of the code base and record its usage.
///
/// With `parallel`, files are processed on the rayon pool; the result is
/// identical to the sequential run.
pub fn resolve_usages(resolver: &CallResolver<'_, '_>, parallel: bool) -> Usages {
    let _span = info_span!("usages", parallel).entered();
    let index = resolver.index;
    let recorder = UsageRecorder::new(index.method_slots());
    let units: Vec<(FileId, &CompilationUnit)> = index.code().units().collect();
    if parallel {
        units
            .par_iter()
            .for_each(|&(file, unit)| resolve_file(resolver, &recorder, file, unit));
    } else {
        for &(file, unit) in &units {
            resolve_file(resolver, &recorder, file, unit);
        }
    }
    let usages = recorder.finish(index.call_slots());
    info!(
        calls = index.call_slots(),
        resolved = usages.resolved_count(),
        "usages resolved"
    );
    usages
}

fn resolve_file<'a>(
    resolver: &CallResolver<'_, 'a>,
    recorder: &UsageRecorder,
    file: FileId,
    unit: &'a CompilationUnit,
) {
    let mut visitor = UsageVisitor {
        resolver,
        recorder,
        context: TraversalContext::new(file),
        unresolved: 0,
    };
    walk_compilation_unit(&mut visitor, file, unit);
    if visitor.unresolved > 0 {
        debug!(file = %file, unresolved = visitor.unresolved, "calls left unresolved");
    }
}

struct UsageVisitor<'v, 'r, 'a> {
    resolver: &'v CallResolver<'r, 'a>,
    recorder: &'v UsageRecorder,
    context: TraversalContext<'a>,
    unresolved: usize,
}

fn binds_names(stmt: &Stmt) -> bool {
    matches!(
        stmt,
        Stmt::For { .. } | Stmt::ForEach { .. } | Stmt::Try { .. }
    )
}

impl<'a> Visitor<'a> for UsageVisitor<'_, '_, 'a> {
    fn visit_type(&mut self, decl: &'a TypeDeclaration) -> VisitResult {
        self.context.enter_type(decl.id);
        VisitResult::Continue
    }

    fn leave_type(&mut self, _decl: &'a TypeDeclaration) {
        self.context.leave();
    }

    fn visit_method(&mut self, decl: &'a MethodDeclaration, _constructor: bool) -> VisitResult {
        self.context.enter_method(decl);
        VisitResult::Continue
    }

    fn leave_method(&mut self, _decl: &'a MethodDeclaration, _constructor: bool) {
        self.context.leave();
    }

    fn visit_initializer(&mut self, init: &'a Initializer) -> VisitResult {
        self.context.enter_initializer(init.is_static);
        VisitResult::Continue
    }

    fn leave_initializer(&mut self, _init: &'a Initializer) {
        self.context.leave();
    }

    fn visit_variable(&mut self, decl: &'a VariableDeclaration) -> VisitResult {
        if decl.kind == VariableKind::Field {
            self.context.enter_initializer(decl.modifiers.is_static);
        }
        VisitResult::Continue
    }

    fn leave_variable(&mut self, decl: &'a VariableDeclaration) {
        if decl.kind == VariableKind::Field {
            self.context.leave();
        }
    }

    fn visit_block(&mut self, block: &'a Block) -> VisitResult {
        self.context.enter_block(block);
        VisitResult::Continue
    }

    fn leave_block(&mut self, _block: &'a Block) {
        self.context.leave();
    }

    fn visit_statement(&mut self, stmt: &'a Stmt) -> VisitResult {
        let bound: Vec<Binding<'a>> = match stmt {
            Stmt::For { init, .. } => init
                .iter()
                .filter_map(|s| match s {
                    Stmt::LocalVariable(decl) => Some(Binding::Variable(decl)),
                    _ => None,
                })
                .collect(),
            Stmt::ForEach { variable, .. } => vec![Binding::Variable(variable)],
            Stmt::Try { resources, .. } => resources.iter().map(Binding::Variable).collect(),
            _ => return VisitResult::Continue,
        };
        self.context.bind(bound);
        VisitResult::Continue
    }

    fn leave_statement(&mut self, stmt: &'a Stmt) {
        if binds_names(stmt) {
            self.context.leave();
        }
    }

    fn visit_catch(&mut self, clause: &'a CatchClause) -> VisitResult {
        self.context.bind(vec![Binding::Variable(&clause.parameter)]);
        VisitResult::Continue
    }

    fn leave_catch(&mut self, _clause: &'a CatchClause) {
        self.context.leave();
    }

    fn visit_expression(&mut self, expr: &'a Expr) -> VisitResult {
        if let Expr::Lambda { parameters, .. } = expr {
            self.context
                .bind(parameters.iter().map(|p| Binding::Untyped(p.as_str())).collect());
        }
        VisitResult::Continue
    }

    fn leave_expression(&mut self, expr: &'a Expr) {
        if matches!(expr, Expr::Lambda { .. }) {
            self.context.leave();
        }
    }

    fn visit_method_call(&mut self, call: &'a MethodCall) -> VisitResult {
        let Some(site) = self.context.snapshot() else {
            return VisitResult::Continue;
        };
        match self.resolver.resolve_call(&site, call) {
            Some(method) => {
                trace!(call = %call.id, method = %method, name = %call.name, "call resolved");
                self.recorder.record(method, call.id);
            }
            None => {
                trace!(call = %call.id, name = %call.name, "call unresolved");
                self.unresolved += 1;
            }
        }
        VisitResult::Continue
    }
}
