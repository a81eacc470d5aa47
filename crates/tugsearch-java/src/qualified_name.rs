//! Qualified name resolution.
//!
//! Turns a textual type reference, as written at some point in some file,
//! into the identity of the type it names: a qualified name plus, when the
//! type is declared in the code base, its declaration.
//!
//! # Resolution Order
//!
//! Array, varargs and generic suffixes are stripped first. Primitive names
//! and type-parameter identifiers in scope resolve to themselves. Otherwise
//! the first strategy that matches wins:
//!
//! 1. **Nested**: the enclosing type chain, innermost outward, checking each
//!    type's own name and the types declared directly inside it
//! 2. **Single import**: an import whose last segment is the name
//! 3. **Wildcard import**: `pkg.*` imports in source order, the first whose
//!    package declares the name
//! 4. **Same package**: a type of that name in the current package
//! 5. **External**: the sentinel, with the stripped name as qualified name
//!
//! Dotted names are first tried as exact qualified names, then resolved
//! head-first (`Outer.Inner` resolves `Outer`, then descends).
//!
//! # Limitations
//!
//! - Ambiguous wildcard imports are not reported; the first match wins
//! - `java.lang` is not implicit: `String` is external `String`
//! - Member types inherited from supertypes are not searched
//!
//! Resolution is total: every call returns a `QualifiedType`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde::Serialize;
use tracing::trace;
use tugsearch_core::typename::{base_name, type_parameter_identifier};

use crate::ast::{CodeIndex, FileId, MethodId, TypeId};

/// Primitive type names, including `void`.
pub const PRIMITIVES: [&str; 9] = [
    "boolean", "byte", "short", "char", "int", "long", "float", "double", "void",
];

/// True for primitive type names.
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

// ============================================================================
// Results
// ============================================================================

/// The result of resolving a type name.
///
/// `declaration == None` is the external sentinel: the type lies outside
/// the code base (platform library, unknown name). It is a valid result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QualifiedType {
    pub qualified_name: String,
    pub declaration: Option<TypeId>,
    pub file: Option<FileId>,
}

impl QualifiedType {
    /// The external sentinel for a name.
    pub fn external(name: impl Into<String>) -> Self {
        QualifiedType {
            qualified_name: name.into(),
            declaration: None,
            file: None,
        }
    }

    /// A type declared in the code base.
    pub fn declared(index: &CodeIndex<'_>, id: TypeId) -> Self {
        QualifiedType {
            qualified_name: index.qualified_name(id).to_string(),
            declaration: Some(id),
            file: index.type_entry(id).map(|e| e.file),
        }
    }

    /// True for the external sentinel.
    pub fn is_external(&self) -> bool {
        self.declaration.is_none()
    }

    /// Last dotted segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

// ============================================================================
// Scope
// ============================================================================

/// Lexical position a name is resolved from.
///
/// The file supplies the package and imports; `enclosing` supplies the
/// type chain (and through it the top-level type); `method` adds the
/// method's own type parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameScope {
    pub file: FileId,
    pub enclosing: Option<TypeId>,
    pub method: Option<MethodId>,
}

impl NameScope {
    /// Scope inside a type body.
    pub fn in_type(file: FileId, enclosing: TypeId) -> Self {
        NameScope {
            file,
            enclosing: Some(enclosing),
            method: None,
        }
    }

    /// Scope inside a method.
    pub fn in_method(file: FileId, enclosing: TypeId, method: MethodId) -> Self {
        NameScope {
            file,
            enclosing: Some(enclosing),
            method: Some(method),
        }
    }
}

// ============================================================================
// Strategies and statistics
// ============================================================================

/// The rule that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Primitive,
    TypeParameter,
    Qualified,
    Nested,
    SingleImport,
    WildcardImport,
    SamePackage,
    External,
}

const STRATEGIES: [Strategy; 8] = [
    Strategy::Primitive,
    Strategy::TypeParameter,
    Strategy::Qualified,
    Strategy::Nested,
    Strategy::SingleImport,
    Strategy::WildcardImport,
    Strategy::SamePackage,
    Strategy::External,
];

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Primitive => "primitive",
            Strategy::TypeParameter => "type_parameter",
            Strategy::Qualified => "qualified",
            Strategy::Nested => "nested",
            Strategy::SingleImport => "single_import",
            Strategy::WildcardImport => "wildcard_import",
            Strategy::SamePackage => "same_package",
            Strategy::External => "external",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves type names; owns a per-run cache and hit counters.
///
/// The resolver is `Sync`: passes running on several threads share one
/// instance. Counters are diagnostics only.
#[derive(Debug, Default)]
pub struct NameResolver {
    cache: RwLock<HashMap<(NameScope, String), QualifiedType>>,
    counters: [AtomicU64; 8],
    cache_hits: AtomicU64,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `text` as written at `scope`.
    ///
    /// # Arguments
    ///
    /// * `index` - The code base being analyzed
    /// * `scope` - Where the name is written
    /// * `text` - Type text; generic, array and varargs suffixes are ignored
    ///
    /// # Returns
    ///
    /// The resolved type, or the external sentinel.
    pub fn resolve(&self, index: &CodeIndex<'_>, scope: &NameScope, text: &str) -> QualifiedType {
        let name = base_name(text);
        let key = (*scope, name);
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(&key) {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                return hit.clone();
            }
        }
        let (resolved, strategy) = self.resolve_uncached(index, scope, &key.1);
        self.counters[strategy.slot()].fetch_add(1, Ordering::Relaxed);
        trace!(
            name = %key.1,
            qualified = %resolved.qualified_name,
            strategy = strategy.name(),
            "resolved type name"
        );
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, resolved.clone());
        }
        resolved
    }

    /// Counter snapshot: one entry per strategy plus `cache_hits`.
    pub fn stats(&self) -> BTreeMap<String, u64> {
        let mut stats: BTreeMap<String, u64> = STRATEGIES
            .iter()
            .map(|s| {
                (
                    s.name().to_string(),
                    self.counters[s.slot()].load(Ordering::Relaxed),
                )
            })
            .collect();
        stats.insert(
            "cache_hits".to_string(),
            self.cache_hits.load(Ordering::Relaxed),
        );
        stats
    }

    fn resolve_uncached(
        &self,
        index: &CodeIndex<'_>,
        scope: &NameScope,
        name: &str,
    ) -> (QualifiedType, Strategy) {
        if name.is_empty() {
            return (QualifiedType::external(name), Strategy::External);
        }
        if is_primitive(name) {
            return (QualifiedType::external(name), Strategy::Primitive);
        }
        if is_type_parameter(index, scope, name) {
            return (QualifiedType::external(name), Strategy::TypeParameter);
        }
        if let Some((head, rest)) = name.split_once('.') {
            if let Some(id) = index.type_by_qualified_name(name) {
                return (QualifiedType::declared(index, id), Strategy::Qualified);
            }
            if let Some((found, strategy)) = find_simple(index, scope, head) {
                if let Some(id) = found.declaration {
                    if let Some(nested) = descend(index, id, rest) {
                        return (QualifiedType::declared(index, nested), strategy);
                    }
                } else {
                    let qualified = format!("{}.{}", found.qualified_name, rest);
                    return (QualifiedType::external(qualified), strategy);
                }
            }
            return (QualifiedType::external(name), Strategy::External);
        }
        match find_simple(index, scope, name) {
            Some(found) => found,
            None => (QualifiedType::external(name), Strategy::External),
        }
    }
}

fn is_type_parameter(index: &CodeIndex<'_>, scope: &NameScope, name: &str) -> bool {
    let declares = |params: &[String]| params.iter().any(|p| type_parameter_identifier(p) == name);
    if let Some(method) = scope.method.and_then(|m| index.method(m)) {
        if declares(&method.decl.type_parameters) {
            return true;
        }
    }
    match scope.enclosing {
        Some(enclosing) => index
            .enclosing_chain(enclosing)
            .into_iter()
            .filter_map(|t| index.type_entry(t))
            .any(|e| declares(&e.decl.type_parameters)),
        None => false,
    }
}

/// Strategies 1-4 for a simple name.
fn find_simple(
    index: &CodeIndex<'_>,
    scope: &NameScope,
    name: &str,
) -> Option<(QualifiedType, Strategy)> {
    if let Some(enclosing) = scope.enclosing {
        for ty in index.enclosing_chain(enclosing) {
            let Some(entry) = index.type_entry(ty) else {
                continue;
            };
            if let Some(child) = index
                .children(ty)
                .iter()
                .copied()
                .find(|c| index.type_entry(*c).is_some_and(|e| e.decl.name == name))
            {
                return Some((QualifiedType::declared(index, child), Strategy::Nested));
            }
            if entry.decl.name == name {
                return Some((QualifiedType::declared(index, ty), Strategy::Nested));
            }
        }
    }

    let unit = index.unit(scope.file)?;

    for import in unit.imports.iter().filter(|i| !i.wildcard && !i.is_static) {
        if import.simple_name() == name {
            let found = match index.type_by_qualified_name(&import.name) {
                Some(id) => QualifiedType::declared(index, id),
                None => QualifiedType::external(import.name.clone()),
            };
            return Some((found, Strategy::SingleImport));
        }
    }

    for import in unit.imports.iter().filter(|i| i.wildcard && !i.is_static) {
        let candidate = format!("{}.{}", import.name, name);
        if let Some(id) = index.type_by_qualified_name(&candidate) {
            return Some((QualifiedType::declared(index, id), Strategy::WildcardImport));
        }
    }

    let candidate = match unit.package.as_deref() {
        Some(package) if !package.is_empty() => format!("{}.{}", package, name),
        _ => name.to_string(),
    };
    index
        .type_by_qualified_name(&candidate)
        .map(|id| (QualifiedType::declared(index, id), Strategy::SamePackage))
}

/// Follow `A.B.C` member-type segments down from `ty`.
fn descend(index: &CodeIndex<'_>, ty: TypeId, path: &str) -> Option<TypeId> {
    let mut current = ty;
    for segment in path.split('.') {
        current = index
            .children(current)
            .iter()
            .copied()
            .find(|c| index.type_entry(*c).is_some_and(|e| e.decl.name == segment))?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CodeBase, CompilationUnit, Import, MethodDeclaration, TypeDeclaration};
    use std::path::PathBuf;

    fn code() -> CodeBase {
        CodeBase::new(vec![
            (
                PathBuf::from("p/A.java"),
                CompilationUnit::new(
                    TypeDeclaration::class("A")
                        .with_type_parameter("T extends Number")
                        .with_nested(TypeDeclaration::class("Inner"))
                        .with_method(
                            MethodDeclaration::new("m", "void").with_type_parameter("U"),
                        ),
                )
                .in_package("p")
                .with_import(Import::single("q.Helper"))
                .with_import(Import::single("java.util.List"))
                .with_import(Import::wildcard("r"))
                .with_import(Import::wildcard("s")),
            ),
            (
                PathBuf::from("p/Sibling.java"),
                CompilationUnit::new(TypeDeclaration::class("Sibling")).in_package("p"),
            ),
            (
                PathBuf::from("q/Helper.java"),
                CompilationUnit::new(TypeDeclaration::class("Helper")).in_package("q"),
            ),
            (
                PathBuf::from("r/Shared.java"),
                CompilationUnit::new(TypeDeclaration::class("Shared")).in_package("r"),
            ),
            (
                PathBuf::from("s/Shared.java"),
                CompilationUnit::new(TypeDeclaration::class("Shared")).in_package("s"),
            ),
        ])
    }

    fn scope_of_a(index: &CodeIndex<'_>) -> NameScope {
        let a = index.type_by_qualified_name("p.A").unwrap();
        NameScope::in_type(FileId::new(0), a)
    }

    #[test]
    fn test_same_file_resolution_returns_declaration() {
        let code = code();
        let index = CodeIndex::build(&code);
        let resolver = NameResolver::new();
        let scope = scope_of_a(&index);
        let a = resolver.resolve(&index, &scope, "A");
        assert_eq!(a.declaration, index.type_by_qualified_name("p.A"));
        assert_eq!(a.qualified_name, "p.A");
        let inner = resolver.resolve(&index, &scope, "Inner[]");
        assert_eq!(inner.qualified_name, "p.A.Inner");
        assert_eq!(inner.file, Some(FileId::new(0)));
    }

    #[test]
    fn test_external_fallback() {
        let code = code();
        let index = CodeIndex::build(&code);
        let resolver = NameResolver::new();
        let scope = scope_of_a(&index);
        let t = resolver.resolve(&index, &scope, "Unknown<String>");
        assert!(t.is_external());
        assert_eq!(t.qualified_name, "Unknown");
    }

    #[test]
    fn test_primitives_and_type_parameters() {
        let code = code();
        let index = CodeIndex::build(&code);
        let resolver = NameResolver::new();
        let scope = scope_of_a(&index);
        assert_eq!(resolver.resolve(&index, &scope, "int[]").qualified_name, "int");
        assert_eq!(resolver.resolve(&index, &scope, "T").qualified_name, "T");

        let m = index.methods().next().unwrap().id;
        let in_method = NameScope::in_method(FileId::new(0), scope.enclosing.unwrap(), m);
        assert_eq!(resolver.resolve(&index, &in_method, "U").qualified_name, "U");
        let stats = resolver.stats();
        assert_eq!(stats["primitive"], 1);
        assert_eq!(stats["type_parameter"], 2);
    }

    #[test]
    fn test_single_import() {
        let code = code();
        let index = CodeIndex::build(&code);
        let resolver = NameResolver::new();
        let scope = scope_of_a(&index);
        let helper = resolver.resolve(&index, &scope, "Helper");
        assert_eq!(helper.qualified_name, "q.Helper");
        assert!(!helper.is_external());

        // Imported but outside the code base: the import's name, external.
        let list = resolver.resolve(&index, &scope, "List<String>");
        assert_eq!(list.qualified_name, "java.util.List");
        assert!(list.is_external());
    }

    #[test]
    fn test_first_wildcard_import_wins() {
        let code = code();
        let index = CodeIndex::build(&code);
        let resolver = NameResolver::new();
        let scope = scope_of_a(&index);
        let shared = resolver.resolve(&index, &scope, "Shared");
        assert_eq!(shared.qualified_name, "r.Shared");
    }

    #[test]
    fn test_same_package() {
        let code = code();
        let index = CodeIndex::build(&code);
        let resolver = NameResolver::new();
        let scope = scope_of_a(&index);
        let sibling = resolver.resolve(&index, &scope, "Sibling");
        assert_eq!(sibling.qualified_name, "p.Sibling");
        assert_eq!(sibling.file, Some(FileId::new(1)));
    }

    #[test]
    fn test_dotted_names() {
        let code = code();
        let index = CodeIndex::build(&code);
        let resolver = NameResolver::new();
        let scope = scope_of_a(&index);
        assert_eq!(
            resolver.resolve(&index, &scope, "q.Helper").qualified_name,
            "q.Helper"
        );
        let inner = resolver.resolve(&index, &scope, "A.Inner");
        assert_eq!(inner.declaration, index.type_by_qualified_name("p.A.Inner"));
        let missing = resolver.resolve(&index, &scope, "A.Missing");
        assert!(missing.is_external());
    }

    #[test]
    fn test_cache_hits_are_counted() {
        let code = code();
        let index = CodeIndex::build(&code);
        let resolver = NameResolver::new();
        let scope = scope_of_a(&index);
        let first = resolver.resolve(&index, &scope, "Sibling");
        let second = resolver.resolve(&index, &scope, "Sibling[]");
        assert_eq!(first, second);
        assert_eq!(resolver.stats()["cache_hits"], 1);
        assert_eq!(resolver.stats()["same_package"], 1);
    }
}
