//! Lenient matching of descriptors against AST nodes.
//!
//! Each descriptor kind has its own `matches` routine. A `Lenient::Any`
//! attribute matches unconditionally; an exact attribute must equal the
//! node's attribute. Type texts are compared as written (trimmed), with no
//! subtype reasoning.

use crate::ast::{
    Comment, ControlFlowKind, Expr, MethodDeclaration, Modifiers, Pseudocode, Stmt,
    TypeDeclaration, VariableDeclaration,
};
use crate::query::{
    ClassDescriptor, CommentDescriptor, ControlFlowDescriptor, Descriptor, MethodDescriptor,
    ParameterDescriptor, VariableDescriptor,
};
use tugsearch_core::Lenient;

/// A node the search walk offers to a descriptor.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    Type(&'a TypeDeclaration),
    Method {
        decl: &'a MethodDeclaration,
        constructor: bool,
        owner: &'a TypeDeclaration,
    },
    Variable(&'a VariableDeclaration),
    Statement(&'a Stmt),
    /// A `?:` expression.
    Conditional(&'a Expr),
    Comment(&'a Comment),
}

impl Descriptor {
    /// Lenient equality against a candidate of any kind.
    pub fn matches(&self, candidate: &Candidate<'_>) -> bool {
        match (self, candidate) {
            (Descriptor::Class(d), Candidate::Type(decl)) => d.matches(decl),
            (
                Descriptor::Method(d),
                Candidate::Method {
                    decl,
                    constructor,
                    owner,
                },
            ) => d.matches(decl, *constructor, owner),
            (Descriptor::Variable(d), Candidate::Variable(decl)) => d.matches(decl),
            (Descriptor::ControlFlow(d), Candidate::Statement(stmt)) => match stmt.control_flow_kind()
            {
                Some(kind) => d.matches(kind, stmt.condition()),
                None => false,
            },
            (Descriptor::ControlFlow(d), Candidate::Conditional(expr)) => match expr {
                Expr::Conditional { condition, .. } => {
                    d.matches(ControlFlowKind::Conditional, Some(condition.as_ref()))
                }
                _ => false,
            },
            (Descriptor::Comment(d), Candidate::Comment(comment)) => d.matches(comment),
            _ => false,
        }
    }
}

fn same_text(expected: &str, actual: &str) -> bool {
    expected.trim() == actual.trim()
}

/// Matches the modifier attributes shared by several descriptors.
fn modifiers_match(
    modifiers: &Modifiers,
    is_static: &Lenient<bool>,
    is_final: &Lenient<bool>,
) -> bool {
    is_static.accepts(&modifiers.is_static) && is_final.accepts(&modifiers.is_final)
}

impl ClassDescriptor {
    pub fn matches(&self, decl: &TypeDeclaration) -> bool {
        self.name.accepts(&decl.name)
            && self.kind.accepts(&decl.kind)
            && self.visibility.accepts(&decl.modifiers.visibility)
            && modifiers_match(&decl.modifiers, &self.is_static, &self.is_final)
            && self.is_abstract.accepts(&decl.modifiers.is_abstract)
            && self.extends.accepts_by(|e| {
                decl.superclass
                    .as_deref()
                    .is_some_and(|s| same_text(e, s))
            })
            && self
                .implements
                .accepts_by(|i| decl.interfaces.iter().any(|d| same_text(i, d)))
    }
}

impl ParameterDescriptor {
    pub fn matches(&self, decl: &VariableDeclaration) -> bool {
        self.name.accepts(&decl.name)
            && self.type_name.accepts_by(|t| same_text(t, &decl.type_name))
    }
}

impl MethodDescriptor {
    /// # Arguments
    ///
    /// * `decl` - The method or constructor
    /// * `constructor` - Whether `decl` is a constructor
    /// * `owner` - The declaring type
    pub fn matches(
        &self,
        decl: &MethodDeclaration,
        constructor: bool,
        owner: &TypeDeclaration,
    ) -> bool {
        self.name.accepts(&decl.name)
            && self
                .return_type
                .accepts_by(|r| !constructor && same_text(r, &decl.return_type))
            && self.visibility.accepts(&decl.modifiers.visibility)
            && modifiers_match(&decl.modifiers, &self.is_static, &self.is_final)
            && self.is_abstract.accepts(&decl.modifiers.is_abstract)
            && self.is_constructor.accepts(&constructor)
            && self.parameter_count.accepts(&decl.parameters.len())
            && self.parameters.accepts_by(|params| {
                params.len() == decl.parameters.len()
                    && params
                        .iter()
                        .zip(&decl.parameters)
                        .all(|(p, d)| p.matches(d))
            })
            && self
                .throws
                .accepts_by(|t| decl.throws.iter().any(|d| same_text(t, d)))
            && self.declared_in.accepts(&owner.name)
    }
}

impl VariableDescriptor {
    pub fn matches(&self, decl: &VariableDeclaration) -> bool {
        self.name.accepts(&decl.name)
            && self.type_name.accepts_by(|t| same_text(t, &decl.type_name))
            && self.kind.accepts(&decl.kind)
            && self.visibility.accepts(&decl.modifiers.visibility)
            && modifiers_match(&decl.modifiers, &self.is_static, &self.is_final)
    }
}

impl ControlFlowDescriptor {
    pub fn matches(&self, kind: ControlFlowKind, condition: Option<&Expr>) -> bool {
        self.kind.accepts(&kind)
            && self.condition.accepts_by(|c| {
                condition.is_some_and(|cond| same_text(c, &cond.render(0)))
            })
    }
}

impl CommentDescriptor {
    pub fn matches(&self, comment: &Comment) -> bool {
        self.kind.accepts(&comment.kind)
            && self.content.accepts_by(|c| same_text(c, &comment.content))
            && self.javadoc.accepts(&comment.javadoc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, CommentKind, TypeKind, Visibility};

    fn bar() -> MethodDeclaration {
        MethodDeclaration::new("bar", "void")
            .with_parameter("String", "s")
            .with_parameter("int", "n")
            .with_modifiers(Modifiers::public())
    }

    #[test]
    fn test_wildcards_match_anything() {
        let owner = TypeDeclaration::class("A");
        assert!(MethodDescriptor::default().matches(&bar(), false, &owner));
        assert!(ClassDescriptor::default().matches(&owner));
    }

    #[test]
    fn test_method_attributes() {
        let owner = TypeDeclaration::class("A");
        let two = MethodDescriptor {
            name: Lenient::exact("bar"),
            parameter_count: Lenient::exact(2usize),
            ..Default::default()
        };
        assert!(two.matches(&bar(), false, &owner));

        let three = MethodDescriptor {
            parameter_count: Lenient::exact(3usize),
            ..two.clone()
        };
        assert!(!three.matches(&bar(), false, &owner));

        let typed = MethodDescriptor {
            parameters: Lenient::Exact(vec![
                ParameterDescriptor {
                    type_name: Lenient::exact("String"),
                    ..Default::default()
                },
                ParameterDescriptor::default(),
            ]),
            visibility: Lenient::Exact(Visibility::Public),
            declared_in: Lenient::exact("A"),
            ..Default::default()
        };
        assert!(typed.matches(&bar(), false, &owner));
        assert!(!typed.matches(&bar(), false, &TypeDeclaration::class("B")));

        let ctor = MethodDescriptor {
            is_constructor: Lenient::Exact(true),
            ..Default::default()
        };
        assert!(!ctor.matches(&bar(), false, &owner));
        assert!(ctor.matches(&MethodDeclaration::constructor("A"), true, &owner));
    }

    #[test]
    fn test_class_attributes() {
        let decl = TypeDeclaration::interface("Shape").implements("Comparable<Shape>");
        let d = ClassDescriptor {
            kind: Lenient::Exact(TypeKind::Interface),
            implements: Lenient::exact("Comparable<Shape>"),
            ..Default::default()
        };
        assert!(d.matches(&decl));
        let extends = ClassDescriptor {
            extends: Lenient::exact("Object"),
            ..Default::default()
        };
        assert!(!extends.matches(&decl));
    }

    #[test]
    fn test_control_flow_condition() {
        let stmt = Stmt::While {
            condition: Expr::binary(BinaryOp::Lt, Expr::name("i"), Expr::int(10)),
            body: Box::new(Stmt::Empty { line: 0 }),
            line: 3,
        };
        let d = ControlFlowDescriptor {
            kind: Lenient::Exact(ControlFlowKind::While),
            condition: Lenient::exact("i < 10"),
        };
        assert!(Descriptor::ControlFlow(d).matches(&Candidate::Statement(&stmt)));
        let wrong = ControlFlowDescriptor {
            kind: Lenient::Exact(ControlFlowKind::If),
            ..Default::default()
        };
        assert!(!Descriptor::ControlFlow(wrong).matches(&Candidate::Statement(&stmt)));
    }

    #[test]
    fn test_comment_and_kind_mismatch() {
        let doc = Comment::javadoc(" Returns the size. ");
        let d = CommentDescriptor {
            kind: Lenient::Exact(CommentKind::Block),
            content: Lenient::exact("Returns the size."),
            javadoc: Lenient::Exact(true),
        };
        assert!(d.matches(&doc));
        let descriptor = Descriptor::Comment(d);
        assert!(!descriptor.matches(&Candidate::Type(&TypeDeclaration::class("A"))));
    }
}
