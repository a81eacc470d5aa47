//! Global type hierarchy.
//!
//! A forest of supertype-to-subtype edges over every declared type, rooted
//! at an implicit universal base type (`java.lang.Object` by default).
//!
//! # Construction
//!
//! Types are visited in id order. Each type contributes one edge per
//! resolved supertype (or one edge from the universal root when it declares
//! none). An edge whose parent is not yet in the main forest is buffered in
//! a **partial hierarchy**: a small disconnected tree. When all types are
//! processed, every partial tree is grafted under the first main-forest
//! node whose name matches its root, or directly under the universal root.
//! Construction never fails.
//!
//! The same qualified name may appear as several nodes (a class that
//! implements two interfaces sits under both). Nodes are not deduplicated;
//! subtype queries expand every node of a name.
//!
//! # Limitations
//!
//! - Cycles in declared supertypes are tolerated but produce no ordering
//! - Supertypes outside the code base are leaves of the forest with no
//!   knowledge of their own ancestors

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, info, info_span};
use tugsearch_core::typename::normalize_varargs;

use crate::ast::{CodeIndex, TypeId};
use crate::qualified_name::{NameResolver, NameScope, QualifiedType};

/// Default name of the implicit base of every type.
pub const UNIVERSAL_ROOT: &str = "java.lang.Object";

// ============================================================================
// Nodes
// ============================================================================

/// A node of the forest: a qualified name and its direct subtypes.
#[derive(Debug, Clone)]
pub struct TypeNode {
    pub qualified_name: String,
    pub children: Vec<usize>,
}

/// The resolved `extends`/`implements` clauses of one declared type.
#[derive(Debug, Clone, Default)]
pub struct Supertypes {
    pub superclass: Option<QualifiedType>,
    pub interfaces: Vec<QualifiedType>,
}

impl Supertypes {
    /// Superclass first, then interfaces in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &QualifiedType> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.superclass.is_none() && self.interfaces.is_empty()
    }
}

// ============================================================================
// Hierarchy
// ============================================================================

/// The type forest plus each declared type's resolved supertypes.
#[derive(Debug)]
pub struct TypeHierarchy {
    nodes: Vec<TypeNode>,
    by_name: HashMap<String, Vec<usize>>,
    supertypes: Vec<Supertypes>,
    grafted: usize,
}

const ROOT: usize = 0;

impl TypeHierarchy {
    /// Build the forest for a code base.
    ///
    /// # Arguments
    ///
    /// * `index` - The indexed code base
    /// * `names` - Resolver used for every supertype name
    /// * `universal_root` - Qualified name of the implicit base type
    pub fn build(index: &CodeIndex<'_>, names: &NameResolver, universal_root: &str) -> Self {
        let _span = info_span!("hierarchy").entered();
        let mut builder = ForestBuilder::new(universal_root);
        let mut supertypes = Vec::new();

        for entry in index.types() {
            let scope = NameScope::in_type(entry.file, entry.id);
            let resolved = Supertypes {
                superclass: entry
                    .decl
                    .superclass
                    .as_deref()
                    .map(|s| names.resolve(index, &scope, s)),
                interfaces: entry
                    .decl
                    .interfaces
                    .iter()
                    .map(|i| names.resolve(index, &scope, i))
                    .collect(),
            };
            if resolved.is_empty() {
                builder.add_edge(universal_root, &entry.qualified_name);
            } else {
                for parent in resolved.iter() {
                    builder.add_edge(&parent.qualified_name, &entry.qualified_name);
                }
            }
            if supertypes.len() <= entry.id.index() {
                supertypes.resize_with(entry.id.index() + 1, Supertypes::default);
            }
            supertypes[entry.id.index()] = resolved;
        }

        let grafted = builder.partials.len();
        debug!(partials = grafted, "grafting partial hierarchies");
        let (nodes, by_name) = builder.finish();
        info!(nodes = nodes.len(), partials = grafted, "type hierarchy built");
        TypeHierarchy {
            nodes,
            by_name,
            supertypes,
            grafted,
        }
    }

    /// Name of the universal root.
    pub fn root_name(&self) -> &str {
        &self.nodes[ROOT].qualified_name
    }

    /// Number of forest nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of partial hierarchies grafted at the end of construction.
    pub fn partial_count(&self) -> usize {
        self.grafted
    }

    /// Direct subtype names of every node named `name`.
    pub fn children_of(&self, name: &str) -> Vec<&str> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .flat_map(|&n| self.nodes[n].children.iter())
            .map(|&c| self.nodes[c].qualified_name.as_str())
            .collect()
    }

    /// True if `descendant` is `ancestor` or reachable below it.
    ///
    /// Varargs suffixes are normalized to array suffixes on both sides.
    /// Every node named `ancestor` is expanded, and every node reached is
    /// expanded through all nodes sharing its name, so types with several
    /// parents are found along any branch.
    pub fn is_subtype(&self, ancestor: &str, descendant: &str) -> bool {
        let ancestor = normalize_varargs(ancestor);
        let descendant = normalize_varargs(descendant);
        if ancestor == descendant {
            return true;
        }
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        if let Some((name, _)) = self.by_name.get_key_value(ancestor.as_str()) {
            seen.insert(name.as_str());
            queue.push_back(name.as_str());
        }
        while let Some(name) = queue.pop_front() {
            for &node in self.by_name.get(name).into_iter().flatten() {
                for &child in &self.nodes[node].children {
                    let child_name = self.nodes[child].qualified_name.as_str();
                    if child_name == descendant {
                        return true;
                    }
                    if seen.insert(child_name) {
                        queue.push_back(child_name);
                    }
                }
            }
        }
        false
    }

    /// Resolved supertypes of a declared type.
    pub fn supertypes(&self, ty: TypeId) -> Option<&Supertypes> {
        self.supertypes.get(ty.index())
    }

    /// The declared superclass of a type, when it is in the code base.
    pub fn superclass(&self, ty: TypeId) -> Option<TypeId> {
        self.supertypes(ty)?.superclass.as_ref()?.declaration
    }

    /// Declared ancestors of `ty`: depth-first, superclass before
    /// interfaces, each type once. External supertypes end their branch.
    pub fn ancestors(&self, ty: TypeId) -> Vec<TypeId> {
        let mut order = Vec::new();
        let mut seen = HashSet::from([ty]);
        self.collect_ancestors(ty, &mut seen, &mut order);
        order
    }

    fn collect_ancestors(&self, ty: TypeId, seen: &mut HashSet<TypeId>, order: &mut Vec<TypeId>) {
        let Some(supertypes) = self.supertypes(ty) else {
            return;
        };
        for parent in supertypes.iter().filter_map(|s| s.declaration) {
            if seen.insert(parent) {
                order.push(parent);
                self.collect_ancestors(parent, seen, order);
            }
        }
    }
}

// ============================================================================
// Forest construction
// ============================================================================

struct ForestBuilder {
    nodes: Vec<TypeNode>,
    /// Roots of partial hierarchies, in creation order.
    partials: Vec<usize>,
}

impl ForestBuilder {
    fn new(universal_root: &str) -> Self {
        ForestBuilder {
            nodes: vec![TypeNode {
                qualified_name: universal_root.to_string(),
                children: Vec::new(),
            }],
            partials: Vec::new(),
        }
    }

    fn node(&mut self, name: &str) -> usize {
        self.nodes.push(TypeNode {
            qualified_name: name.to_string(),
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// First node named `name` in a depth-first walk from `start`.
    fn find_from(&self, start: usize, name: &str) -> Option<usize> {
        let mut stack = vec![start];
        let mut seen = HashSet::new();
        while let Some(n) = stack.pop() {
            if !seen.insert(n) {
                continue;
            }
            if self.nodes[n].qualified_name == name {
                return Some(n);
            }
            stack.extend(self.nodes[n].children.iter().rev());
        }
        None
    }

    fn add_edge(&mut self, parent: &str, child: &str) {
        // A partial tree rooted at the child carries its already-known subtypes.
        let subtree = match self
            .partials
            .iter()
            .position(|&p| self.nodes[p].qualified_name == child)
        {
            Some(i) => self.partials.remove(i),
            None => self.node(child),
        };

        let target = self.find_from(ROOT, parent).or_else(|| {
            self.partials
                .iter()
                .find_map(|&p| self.find_from(p, parent))
        });
        match target {
            Some(target) => self.nodes[target].children.push(subtree),
            None => {
                let root = self.node(parent);
                self.nodes[root].children.push(subtree);
                self.partials.push(root);
            }
        }
    }

    fn finish(mut self) -> (Vec<TypeNode>, HashMap<String, Vec<usize>>) {
        // Graft until no partial tree finds a home in the main forest, then
        // hang the rest under the root.
        loop {
            let before = self.partials.len();
            let pending = std::mem::take(&mut self.partials);
            for partial in pending {
                let name = self.nodes[partial].qualified_name.clone();
                match self.find_from(ROOT, &name) {
                    Some(target) => {
                        let children = std::mem::take(&mut self.nodes[partial].children);
                        self.nodes[target].children.extend(children);
                    }
                    None => self.partials.push(partial),
                }
            }
            if self.partials.len() == before {
                break;
            }
        }
        for partial in std::mem::take(&mut self.partials) {
            self.nodes[ROOT].children.push(partial);
        }

        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            by_name.entry(node.qualified_name.clone()).or_default().push(i);
        }
        (self.nodes, by_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CodeBase, CompilationUnit, TypeDeclaration};
    use std::path::PathBuf;

    fn file(name: &str, decl: TypeDeclaration) -> (PathBuf, CompilationUnit) {
        (PathBuf::from(format!("{}.java", name)), CompilationUnit::new(decl))
    }

    fn hierarchy(code: &CodeBase) -> TypeHierarchy {
        let index = CodeIndex::build(code);
        TypeHierarchy::build(&index, &NameResolver::new(), UNIVERSAL_ROOT)
    }

    // ========================================================================
    // Subtype queries
    // ========================================================================

    #[test]
    fn test_reflexive() {
        let code = CodeBase::new(vec![file("A", TypeDeclaration::class("A"))]);
        let h = hierarchy(&code);
        assert!(h.is_subtype("A", "A"));
        assert!(h.is_subtype("Unknown", "Unknown"));
    }

    #[test]
    fn test_transitive_along_declared_edges() {
        let code = CodeBase::new(vec![
            file("A", TypeDeclaration::class("A")),
            file("B", TypeDeclaration::class("B").extends("A")),
            file("C", TypeDeclaration::class("C").extends("B")),
        ]);
        let h = hierarchy(&code);
        assert!(h.is_subtype("A", "C"));
        assert!(h.is_subtype("B", "C"));
        assert!(!h.is_subtype("C", "A"));
        assert!(h.is_subtype(UNIVERSAL_ROOT, "C"));
    }

    #[test]
    fn test_forward_reference_is_grafted() {
        // Aa extends Zz; Zz is processed later.
        let code = CodeBase::new(vec![
            file("Aa", TypeDeclaration::class("Aa").extends("Zz")),
            file("Zz", TypeDeclaration::class("Zz").extends("Mm")),
            file("Mm", TypeDeclaration::class("Mm")),
        ]);
        let h = hierarchy(&code);
        assert!(h.is_subtype("Mm", "Aa"));
        assert!(h.is_subtype(UNIVERSAL_ROOT, "Aa"));
        assert_eq!(h.children_of(UNIVERSAL_ROOT), vec!["Mm"]);
    }

    #[test]
    fn test_multiple_parents_are_all_explored() {
        let code = CodeBase::new(vec![
            file("I", TypeDeclaration::interface("I")),
            file("J", TypeDeclaration::interface("J")),
            file("K", TypeDeclaration::class("K").implements("I").implements("J")),
            file("L", TypeDeclaration::class("L").extends("K")),
        ]);
        let h = hierarchy(&code);
        assert!(h.is_subtype("I", "L"));
        assert!(h.is_subtype("J", "L"));
        assert!(h.is_subtype("J", "K"));
        assert!(!h.is_subtype("I", "J"));
    }

    #[test]
    fn test_external_supertype_hangs_under_root() {
        let code = CodeBase::new(vec![file(
            "A",
            TypeDeclaration::class("A").extends("RuntimeException"),
        )]);
        let h = hierarchy(&code);
        assert_eq!(h.children_of(UNIVERSAL_ROOT), vec!["RuntimeException"]);
        assert!(h.is_subtype("RuntimeException", "A"));
        assert_eq!(h.partial_count(), 1);
    }

    #[test]
    fn test_varargs_normalized() {
        let code = CodeBase::new(vec![file("A", TypeDeclaration::class("A"))]);
        let h = hierarchy(&code);
        assert!(h.is_subtype("String...", "String[]"));
        assert!(!h.is_subtype("String", "String[]"));
    }

    // ========================================================================
    // Declared supertypes
    // ========================================================================

    #[test]
    fn test_ancestors_superclass_first() {
        let code = CodeBase::new(vec![
            file("A", TypeDeclaration::class("A").implements("I")),
            file("B", TypeDeclaration::class("B").extends("A").implements("J")),
            file("I", TypeDeclaration::interface("I")),
            file("J", TypeDeclaration::interface("J").implements("I")),
        ]);
        let index = CodeIndex::build(&code);
        let h = TypeHierarchy::build(&index, &NameResolver::new(), UNIVERSAL_ROOT);
        let id = |n: &str| index.type_by_qualified_name(n).unwrap();
        assert_eq!(h.ancestors(id("B")), vec![id("A"), id("I"), id("J")]);
        assert_eq!(h.superclass(id("B")), Some(id("A")));
        assert_eq!(h.superclass(id("A")), None);
    }

    #[test]
    fn test_custom_root() {
        let code = CodeBase::new(vec![file("A", TypeDeclaration::class("A"))]);
        let index = CodeIndex::build(&code);
        let h = TypeHierarchy::build(&index, &NameResolver::new(), "Base");
        assert_eq!(h.root_name(), "Base");
        assert!(h.is_subtype("Base", "A"));
    }
}
