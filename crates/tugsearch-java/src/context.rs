//! Traversal context for the usage pass.
//!
//! A `TraversalContext` is the lexical scope stack of one file's walk: the
//! enclosing type chain, the enclosing method or initializer with its
//! static-ness, the current block, and the variables bound by `for`,
//! `catch`, try-with-resources and lambdas. It is owned by one traversal
//! and dropped when that file is done.
//!
//! At each call site the resolver takes a [`CallSite`] snapshot: the part
//! of the stack that name lookup needs, detached from the walk.
//!
//! # Limitations
//!
//! Locals are looked up in the current block only, and all of the block's
//! locals are visible regardless of position. Locals of enclosing blocks
//! are not visible, except those bound by `for`, `catch`, resources and
//! lambdas around the current block.

use crate::ast::{Block, FileId, MethodDeclaration, MethodId, TypeId, VariableDeclaration};
use crate::qualified_name::NameScope;

/// A name bound around the current position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding<'a> {
    /// A declared variable: parameter, loop variable, catch parameter or
    /// resource.
    Variable(&'a VariableDeclaration),
    /// An implicitly typed lambda parameter.
    Untyped(&'a str),
}

impl<'a> Binding<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Binding::Variable(decl) => &decl.name,
            Binding::Untyped(name) => name,
        }
    }
}

/// Outcome of looking a simple name up among locals and bindings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalLookup<'a> {
    Variable(&'a VariableDeclaration),
    /// Bound, but with no declared type.
    Untyped,
    NotFound,
}

#[derive(Debug)]
enum Frame<'a> {
    Type(TypeId),
    Method {
        decl: &'a MethodDeclaration,
        is_static: bool,
    },
    /// Initializer block or field initializer.
    Initializer { is_static: bool },
    Block(&'a Block),
    Bindings(Vec<Binding<'a>>),
}

// ============================================================================
// TraversalContext
// ============================================================================

/// Scope stack of one file's traversal.
#[derive(Debug)]
pub struct TraversalContext<'a> {
    file: FileId,
    frames: Vec<Frame<'a>>,
}

impl<'a> TraversalContext<'a> {
    pub fn new(file: FileId) -> Self {
        TraversalContext {
            file,
            frames: Vec::new(),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn enter_type(&mut self, id: TypeId) {
        self.frames.push(Frame::Type(id));
    }

    pub fn enter_method(&mut self, decl: &'a MethodDeclaration) {
        self.frames.push(Frame::Method {
            decl,
            is_static: decl.modifiers.is_static,
        });
    }

    /// Enter an initializer block or a field initializer.
    pub fn enter_initializer(&mut self, is_static: bool) {
        self.frames.push(Frame::Initializer { is_static });
    }

    pub fn enter_block(&mut self, block: &'a Block) {
        self.frames.push(Frame::Block(block));
    }

    /// Bind names for the extent of a statement, catch clause or lambda.
    pub fn bind(&mut self, bindings: Vec<Binding<'a>>) {
        self.frames.push(Frame::Bindings(bindings));
    }

    /// Leave the innermost scope.
    pub fn leave(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Frames above the innermost type boundary.
    fn body_frames(&self) -> impl Iterator<Item = &Frame<'a>> {
        self.frames
            .iter()
            .rev()
            .take_while(|f| !matches!(f, Frame::Type(_)))
    }

    /// Innermost enclosing type.
    pub fn current_type(&self) -> Option<TypeId> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Type(id) => Some(*id),
            _ => None,
        })
    }

    /// Enclosing method of the current type body.
    pub fn current_method(&self) -> Option<&'a MethodDeclaration> {
        self.body_frames().find_map(|f| match f {
            Frame::Method { decl, .. } => Some(*decl),
            _ => None,
        })
    }

    /// True inside a static method, static initializer or static field
    /// initializer. Positions directly in a type body (enum constant
    /// arguments) count as static.
    pub fn is_static(&self) -> bool {
        self.body_frames()
            .find_map(|f| match f {
                Frame::Method { is_static, .. } | Frame::Initializer { is_static } => {
                    Some(*is_static)
                }
                _ => None,
            })
            .unwrap_or(true)
    }

    /// Innermost block of the current type body.
    pub fn current_block(&self) -> Option<&'a Block> {
        self.body_frames().find_map(|f| match f {
            Frame::Block(block) => Some(*block),
            _ => None,
        })
    }

    /// Detach the lookup state of the current position.
    ///
    /// Returns `None` outside any type.
    pub fn snapshot(&self) -> Option<CallSite<'a>> {
        let enclosing = self.current_type()?;
        let mut bindings = Vec::new();
        let mut method = None;
        for frame in self.body_frames() {
            match frame {
                Frame::Bindings(bound) => bindings.extend(bound.iter().rev().copied()),
                Frame::Method { decl, .. } => {
                    let decl: &'a MethodDeclaration = *decl;
                    method = Some(decl.id);
                    bindings.extend(decl.parameters.iter().rev().map(Binding::Variable));
                }
                _ => {}
            }
        }
        Some(CallSite {
            file: self.file,
            enclosing,
            method,
            is_static: self.is_static(),
            bindings,
            block: self.current_block(),
        })
    }
}

// ============================================================================
// CallSite
// ============================================================================

/// Lookup state at one call site.
#[derive(Debug, Clone)]
pub struct CallSite<'a> {
    pub file: FileId,
    pub enclosing: TypeId,
    pub method: Option<MethodId>,
    pub is_static: bool,
    /// Bound names, innermost first; method parameters come last.
    pub bindings: Vec<Binding<'a>>,
    pub block: Option<&'a Block>,
}

impl<'a> CallSite<'a> {
    /// Scope for type names written at this site.
    pub fn scope(&self) -> NameScope {
        NameScope {
            file: self.file,
            enclosing: Some(self.enclosing),
            method: self.method,
        }
    }

    /// Look a simple name up in bindings, then in the current block.
    pub fn lookup_local(&self, name: &str) -> LocalLookup<'a> {
        if let Some(binding) = self.bindings.iter().find(|b| b.name() == name) {
            return match *binding {
                Binding::Variable(decl) => LocalLookup::Variable(decl),
                Binding::Untyped(_) => LocalLookup::Untyped,
            };
        }
        self.block
            .and_then(|block| block.locals().find(|l| l.name == name))
            .map_or(LocalLookup::NotFound, LocalLookup::Variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Modifiers, Stmt};

    #[test]
    fn test_static_context() {
        let instance = MethodDeclaration::new("run", "void");
        let helper = MethodDeclaration::new("helper", "void")
            .with_modifiers(Modifiers::default().with_static());
        let mut ctx = TraversalContext::new(FileId::new(0));
        ctx.enter_type(TypeId::new(0));
        assert!(ctx.is_static());
        ctx.enter_method(&instance);
        assert!(!ctx.is_static());
        ctx.leave();
        ctx.enter_method(&helper);
        assert!(ctx.is_static());
        // A nested type starts a fresh body.
        ctx.enter_type(TypeId::new(1));
        ctx.enter_initializer(false);
        assert!(!ctx.is_static());
        assert!(ctx.current_method().is_none());
    }

    #[test]
    fn test_lookup_order() {
        let method = MethodDeclaration::new("run", "void").with_parameter("String", "s");
        let block = Block::new(vec![
            Stmt::local("int", "count", None),
            Stmt::local("long", "s", None),
        ]);
        let item = VariableDeclaration::local("Item", "item");
        let mut ctx = TraversalContext::new(FileId::new(0));
        ctx.enter_type(TypeId::new(0));
        ctx.enter_method(&method);
        ctx.enter_block(&block);
        ctx.bind(vec![Binding::Variable(&item), Binding::Untyped("x")]);

        let site = ctx.snapshot().unwrap();
        assert_eq!(site.enclosing, TypeId::new(0));
        assert!(!site.is_static);
        match site.lookup_local("s") {
            LocalLookup::Variable(decl) => assert_eq!(decl.type_name, "String"),
            other => panic!("unexpected {:?}", other),
        }
        match site.lookup_local("count") {
            LocalLookup::Variable(decl) => assert_eq!(decl.type_name, "int"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(site.lookup_local("x"), LocalLookup::Untyped);
        assert!(matches!(site.lookup_local("item"), LocalLookup::Variable(_)));
        assert_eq!(site.lookup_local("missing"), LocalLookup::NotFound);
    }

    #[test]
    fn test_nested_type_hides_outer_locals() {
        let method = MethodDeclaration::new("run", "void").with_parameter("String", "s");
        let mut ctx = TraversalContext::new(FileId::new(0));
        ctx.enter_type(TypeId::new(0));
        ctx.enter_method(&method);
        ctx.enter_type(TypeId::new(1));
        let site = ctx.snapshot().unwrap();
        assert_eq!(site.enclosing, TypeId::new(1));
        assert_eq!(site.lookup_local("s"), LocalLookup::NotFound);
        assert!(site.method.is_none());
        ctx.leave();
        assert_eq!(ctx.current_type(), Some(TypeId::new(0)));
        assert_eq!(ctx.depth(), 2);
    }
}
