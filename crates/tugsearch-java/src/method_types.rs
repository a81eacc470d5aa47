//! Per-method type resolution pass.
//!
//! Resolves every method return type and every field, parameter and local
//! variable type to a [`TypeInstance`]. Type parameters of the method and
//! of its enclosing types are replaced by their erased bounds before the
//! name is resolved, so `T extends Fruit` parameters carry `Fruit`.
//!
//! Runs after the hierarchy pass and before the usage pass. Entries are
//! independent, so the pass can run on the rayon pool without changing
//! its output.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, info_span};
use tugsearch_core::typename::{
    dimensions, extract_generic_argument, resolve_generic_types, OBJECT,
};

use crate::ast::{CodeIndex, FileId, MethodEntry, MethodId, TypeId, VarId, VariableEntry};
use crate::qualified_name::{is_primitive, NameResolver, NameScope, QualifiedType};

/// Name given to the type of `null`.
pub const NULL_TYPE: &str = "null";

// ============================================================================
// TypeInstance
// ============================================================================

/// A resolved use of a type: the named type plus array dimensions and the
/// generic argument text it was written with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeInstance {
    pub qualified_name: String,
    pub declaration: Option<TypeId>,
    pub file: Option<FileId>,
    pub dimensions: usize,
    /// Generic argument text, e.g. `String` for `List<String>`. Empty when
    /// absent, and when the declared arguments mention type variables or
    /// wildcards.
    pub generic_argument: String,
}

impl TypeInstance {
    /// A non-array instance of a resolved type.
    pub fn of(resolved: QualifiedType) -> Self {
        TypeInstance {
            qualified_name: resolved.qualified_name,
            declaration: resolved.declaration,
            file: resolved.file,
            dimensions: 0,
            generic_argument: String::new(),
        }
    }

    /// A type outside the code base (including primitives).
    pub fn external(name: impl Into<String>) -> Self {
        Self::of(QualifiedType::external(name))
    }

    /// The type of the `null` literal.
    pub fn null() -> Self {
        Self::external(NULL_TYPE)
    }

    pub fn is_null(&self) -> bool {
        self.declaration.is_none() && self.qualified_name == NULL_TYPE && !self.is_array()
    }

    /// Resolve declared type text in a scope.
    ///
    /// # Arguments
    ///
    /// * `text` - Declared type text, e.g. `List<T>[]` or `String...`
    /// * `type_parameters` - Type parameter declarations in scope
    pub fn resolve(
        index: &CodeIndex<'_>,
        names: &NameResolver,
        scope: &NameScope,
        text: &str,
        type_parameters: &[String],
    ) -> Self {
        // Multi-catch `A | B` is typed as its first alternative.
        let text = text.split('|').next().unwrap_or(text).trim();
        let substituted = resolve_generic_types(text, type_parameters);
        let unchanged = substituted.replace(' ', "") == text.replace(' ', "");
        let generic_argument = if unchanged {
            extract_generic_argument(text)
        } else {
            String::new()
        };
        let mut instance = Self::of(names.resolve(index, scope, &substituted));
        instance.dimensions = dimensions(text);
        instance.generic_argument = generic_argument;
        instance
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// The element type of an array instance.
    pub fn element(&self) -> Self {
        let mut element = self.clone();
        element.dimensions = self.dimensions.saturating_sub(1);
        element
    }

    pub fn is_array(&self) -> bool {
        self.dimensions > 0
    }

    /// A primitive non-array type.
    pub fn is_primitive(&self) -> bool {
        !self.is_array() && is_primitive(&self.qualified_name)
    }

    /// True for `Object` and `java.lang.Object`.
    pub fn is_object(&self) -> bool {
        !self.is_array()
            && (self.qualified_name == OBJECT || self.qualified_name == "java.lang.Object")
    }

    pub fn is_external(&self) -> bool {
        self.declaration.is_none()
    }
}

impl fmt::Display for TypeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name)?;
        if !self.generic_argument.is_empty() {
            write!(f, "<{}>", self.generic_argument)?;
        }
        for _ in 0..self.dimensions {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

// ============================================================================
// Signature types
// ============================================================================

/// Resolved return and variable types, indexed by id.
#[derive(Debug, Default)]
pub struct SignatureTypes {
    returns: Vec<Option<TypeInstance>>,
    variables: Vec<Option<TypeInstance>>,
}

impl SignatureTypes {
    /// Resolve every method and variable of the code base.
    pub fn build(index: &CodeIndex<'_>, names: &NameResolver, parallel: bool) -> Self {
        let _span = info_span!("signature_types", parallel).entered();
        let methods: Vec<&MethodEntry<'_>> = index.methods().collect();
        let variables: Vec<&VariableEntry<'_>> = index.variables().collect();

        let resolve_method = |m: &&MethodEntry<'_>| (m.id, method_return(index, names, m));
        let resolve_variable = |v: &&VariableEntry<'_>| (v.id, variable_type(index, names, v));
        let (returns, types): (Vec<_>, Vec<_>) = if parallel {
            (
                methods.par_iter().map(resolve_method).collect(),
                variables.par_iter().map(resolve_variable).collect(),
            )
        } else {
            (
                methods.iter().map(resolve_method).collect(),
                variables.iter().map(resolve_variable).collect(),
            )
        };

        let mut signatures = SignatureTypes {
            returns: vec![None; index.method_slots()],
            variables: vec![None; index.variable_slots()],
        };
        for (id, ty) in returns {
            signatures.returns[id.index()] = Some(ty);
        }
        for (id, ty) in types {
            signatures.variables[id.index()] = Some(ty);
        }
        info!(
            methods = methods.len(),
            variables = variables.len(),
            "signature types resolved"
        );
        signatures
    }

    /// Return type of a method; a constructor returns its declaring type.
    pub fn return_type(&self, method: MethodId) -> Option<&TypeInstance> {
        self.returns.get(method.index()).and_then(Option::as_ref)
    }

    /// Declared type of a field, parameter or local.
    pub fn variable_type(&self, var: VarId) -> Option<&TypeInstance> {
        self.variables.get(var.index()).and_then(Option::as_ref)
    }
}

/// Type parameters visible inside `method` of `owner`: the method's own
/// first, then those of the enclosing types, innermost first.
pub fn type_parameters_in_scope(
    index: &CodeIndex<'_>,
    owner: TypeId,
    method: Option<MethodId>,
) -> Vec<String> {
    let mut params: Vec<String> = method
        .and_then(|m| index.method(m))
        .map(|m| m.decl.type_parameters.clone())
        .unwrap_or_default();
    for ty in index.enclosing_chain(owner) {
        if let Some(entry) = index.type_entry(ty) {
            params.extend(entry.decl.type_parameters.iter().cloned());
        }
    }
    params
}

fn method_return(index: &CodeIndex<'_>, names: &NameResolver, m: &MethodEntry<'_>) -> TypeInstance {
    if m.constructor {
        return TypeInstance::of(QualifiedType::declared(index, m.owner));
    }
    let scope = NameScope::in_method(m.file, m.owner, m.id);
    let params = type_parameters_in_scope(index, m.owner, Some(m.id));
    TypeInstance::resolve(index, names, &scope, &m.decl.return_type, &params)
}

fn variable_type(
    index: &CodeIndex<'_>,
    names: &NameResolver,
    v: &VariableEntry<'_>,
) -> TypeInstance {
    let scope = NameScope {
        file: v.file,
        enclosing: Some(v.owner),
        method: v.method,
    };
    let params = type_parameters_in_scope(index, v.owner, v.method);
    TypeInstance::resolve(index, names, &scope, &v.decl.type_name, &params)
}
