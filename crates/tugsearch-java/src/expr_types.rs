//! Static types of expressions.
//!
//! Best-effort inference used for call arguments and receivers. An
//! expression whose type cannot be established yields `None`, which makes
//! every overload candidate reject it.
//!
//! # Rules
//!
//! | Expression | Type |
//! |------------|------|
//! | literal | its primitive type, `String`, or the null type |
//! | name | declared type of the variable or field |
//! | `this` / `super` | enclosing type / its superclass |
//! | `a.f` | declared type of field `f` (`length` of an array is `int`) |
//! | call | return type of the resolved method |
//! | `new T(..)`, cast | `T` |
//! | `new T[n]`, `a[i]` | array of `T`, element of `a` |
//! | comparison, `!`, `instanceof`, `&&`, `\|\|` | `boolean` |
//! | `+` with a `String` side | that string type |
//! | other arithmetic | binary numeric promotion |
//! | `c ? a : b` | type of `a`, or of `b` when `a` is `null` |
//! | assignment | type of the target |
//!
//! Lambdas, method references and bare array initializers have no type.

use crate::ast::{BinaryOp, Expr, LiteralKind, UnaryOp};
use crate::context::{CallSite, LocalLookup};
use crate::method_types::{type_parameters_in_scope, TypeInstance};
use crate::qualified_name::QualifiedType;
use crate::usage::{CallResolver, Receiver};

const NUMERIC_RANK: [&str; 4] = ["int", "long", "float", "double"];

impl<'a> CallResolver<'_, 'a> {
    /// Infer the static type of `expr` at `site`.
    pub fn infer(&self, site: &CallSite<'a>, expr: &Expr) -> Option<TypeInstance> {
        match expr {
            Expr::Literal { kind, .. } => Some(self.literal(site, *kind)),
            Expr::Name { name } => match self.lookup_variable(site, name) {
                LocalLookup::Variable(decl) => self.declared_type(decl),
                LocalLookup::Untyped | LocalLookup::NotFound => None,
            },
            Expr::This => Some(TypeInstance::of(QualifiedType::declared(
                self.index,
                site.enclosing,
            ))),
            Expr::Super => self
                .hierarchy
                .supertypes(site.enclosing)?
                .superclass
                .clone()
                .map(TypeInstance::of),
            Expr::FieldAccess { target, name } => {
                if name == "length" && self.infer(site, target).is_some_and(|t| t.is_array()) {
                    return Some(TypeInstance::external("int"));
                }
                let owner = match self.receiver(site, target)? {
                    Receiver::Instance(ty) | Receiver::Static(ty) => ty,
                };
                self.declared_type(self.find_field(owner, name)?)
            }
            Expr::MethodCall(call) => {
                let method = self.resolve_call(site, call)?;
                self.signatures.return_type(method).cloned()
            }
            Expr::New { type_name, .. } | Expr::Cast { type_name, .. } => {
                Some(self.type_at(site, type_name))
            }
            Expr::NewArray {
                element_type,
                dimensions,
                ..
            } => {
                let element = self.type_at(site, element_type);
                let total = element.dimensions + dimensions;
                Some(element.with_dimensions(total))
            }
            Expr::ArrayAccess { array, .. } => self
                .infer(site, array)
                .filter(TypeInstance::is_array)
                .map(|a| a.element()),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Not => Some(boolean()),
                _ => self.infer(site, operand),
            },
            Expr::Binary { op, left, right } => self.binary(site, *op, left, right),
            Expr::Assign { target, .. } => self.infer(site, target),
            Expr::Conditional {
                then_expr,
                else_expr,
                ..
            } => match self.infer(site, then_expr) {
                Some(t) if !t.is_null() => Some(t),
                _ => self.infer(site, else_expr),
            },
            Expr::InstanceOf { .. } => Some(boolean()),
            Expr::ArrayInit { .. } | Expr::Lambda { .. } | Expr::MethodReference { .. } => None,
        }
    }

    fn literal(&self, site: &CallSite<'a>, kind: LiteralKind) -> TypeInstance {
        match kind {
            LiteralKind::Int => TypeInstance::external("int"),
            LiteralKind::Long => TypeInstance::external("long"),
            LiteralKind::Float => TypeInstance::external("float"),
            LiteralKind::Double => TypeInstance::external("double"),
            LiteralKind::Char => TypeInstance::external("char"),
            LiteralKind::Boolean => boolean(),
            LiteralKind::String => self.type_at(site, "String"),
            LiteralKind::Null => TypeInstance::null(),
        }
    }

    /// Resolve type text written at the call site.
    fn type_at(&self, site: &CallSite<'a>, text: &str) -> TypeInstance {
        let params = type_parameters_in_scope(self.index, site.enclosing, site.method);
        TypeInstance::resolve(self.index, self.names, &site.scope(), text, &params)
    }

    fn binary(
        &self,
        site: &CallSite<'a>,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Option<TypeInstance> {
        match op {
            BinaryOp::And
            | BinaryOp::Or
            | BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => Some(boolean()),
            BinaryOp::Add => {
                let l = self.infer(site, left);
                let r = self.infer(site, right);
                if let Some(s) = l.iter().chain(r.iter()).find(|t| is_string(t)) {
                    return Some(s.clone());
                }
                promote(l.as_ref()?, r.as_ref()?)
            }
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => {
                let l = self.infer(site, left)?;
                promote(&l, &TypeInstance::external("int"))
            }
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
                let l = self.infer(site, left)?;
                if l.qualified_name == "boolean" {
                    return Some(l);
                }
                promote(&l, &self.infer(site, right)?)
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                promote(&self.infer(site, left)?, &self.infer(site, right)?)
            }
        }
    }
}

fn boolean() -> TypeInstance {
    TypeInstance::external("boolean")
}

fn is_string(t: &TypeInstance) -> bool {
    !t.is_array() && (t.qualified_name == "String" || t.qualified_name == "java.lang.String")
}

/// Binary numeric promotion of two primitive operands.
fn promote(left: &TypeInstance, right: &TypeInstance) -> Option<TypeInstance> {
    let rank = |t: &TypeInstance| -> Option<usize> {
        if !t.is_primitive() {
            return None;
        }
        match t.qualified_name.as_str() {
            "byte" | "short" | "char" | "int" => Some(0),
            other => NUMERIC_RANK.iter().position(|n| *n == other),
        }
    };
    let widest = rank(left)?.max(rank(right)?);
    Some(TypeInstance::external(NUMERIC_RANK[widest]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        CodeBase, CodeIndex, CompilationUnit, FileId, MethodDeclaration, Stmt, TypeDeclaration,
        VariableDeclaration,
    };
    use crate::context::TraversalContext;
    use crate::hierarchy::{TypeHierarchy, UNIVERSAL_ROOT};
    use crate::method_types::SignatureTypes;
    use crate::qualified_name::NameResolver;
    use std::path::PathBuf;

    fn code() -> CodeBase {
        CodeBase::new(vec![
            (
                PathBuf::from("Base.java"),
                CompilationUnit::new(
                    TypeDeclaration::class("Base")
                        .with_field(VariableDeclaration::field("int[]", "values")),
                ),
            ),
            (
                PathBuf::from("Main.java"),
                CompilationUnit::new(
                    TypeDeclaration::class("Main")
                        .extends("Base")
                        .with_field(VariableDeclaration::field("Main", "next"))
                        .with_method(MethodDeclaration::new("size", "long"))
                        .with_method(
                            MethodDeclaration::new("run", "void")
                                .with_parameter("double", "d")
                                .with_body(vec![Stmt::local("String", "s", None)]),
                        ),
                ),
            ),
        ])
    }

    /// Infer each expression inside `Main.run`.
    fn infer_all(exprs: &[Expr]) -> Vec<Option<String>> {
        let code = code();
        let index = CodeIndex::build(&code);
        let names = NameResolver::new();
        let hierarchy = TypeHierarchy::build(&index, &names, UNIVERSAL_ROOT);
        let signatures = SignatureTypes::build(&index, &names, false);
        let resolver = CallResolver::new(&index, &names, &hierarchy, &signatures);

        let main = index.type_by_qualified_name("Main").unwrap();
        let run = index.methods().find(|m| m.decl.name == "run").unwrap();
        let mut ctx = TraversalContext::new(FileId::new(1));
        ctx.enter_type(main);
        ctx.enter_method(run.decl);
        ctx.enter_block(run.decl.body.as_ref().unwrap());
        let site = ctx.snapshot().unwrap();
        exprs
            .iter()
            .map(|e| resolver.infer(&site, e).map(|t| t.to_string()))
            .collect()
    }

    #[test]
    fn test_literals_and_names() {
        let types = infer_all(&[
            Expr::int(1),
            Expr::string("x"),
            Expr::null(),
            Expr::name("d"),
            Expr::name("s"),
            Expr::name("missing"),
        ]);
        assert_eq!(
            types,
            vec![
                Some("int".to_string()),
                Some("String".to_string()),
                Some("null".to_string()),
                Some("double".to_string()),
                Some("String".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_fields_this_super_and_arrays() {
        let types = infer_all(&[
            Expr::This,
            Expr::Super,
            Expr::name("values"),
            Expr::field(Expr::name("values"), "length"),
            Expr::ArrayAccess {
                array: Box::new(Expr::name("values")),
                index: Box::new(Expr::int(0)),
            },
            Expr::field(Expr::field(Expr::This, "next"), "next"),
        ]);
        assert_eq!(
            types,
            vec![
                Some("Main".to_string()),
                Some("Base".to_string()),
                Some("int[]".to_string()),
                Some("int".to_string()),
                Some("int".to_string()),
                Some("Main".to_string()),
            ]
        );
    }

    #[test]
    fn test_operators() {
        let types = infer_all(&[
            Expr::binary(BinaryOp::Add, Expr::int(1), Expr::name("d")),
            Expr::binary(BinaryOp::Add, Expr::int(1), Expr::string("a")),
            Expr::binary(BinaryOp::Lt, Expr::int(1), Expr::int(2)),
            Expr::binary(BinaryOp::Mul, Expr::call("size", vec![]), Expr::int(2)),
            Expr::InstanceOf {
                operand: Box::new(Expr::This),
                type_name: "Base".to_string(),
            },
            Expr::Conditional {
                condition: Box::new(Expr::boolean(true)),
                then_expr: Box::new(Expr::null()),
                else_expr: Box::new(Expr::new_object("Main", vec![])),
            },
            Expr::Lambda {
                parameters: vec![],
                body: crate::ast::LambdaBody::Expr(Box::new(Expr::int(1))),
            },
        ]);
        assert_eq!(
            types,
            vec![
                Some("double".to_string()),
                Some("String".to_string()),
                Some("boolean".to_string()),
                Some("long".to_string()),
                Some("boolean".to_string()),
                Some("Main".to_string()),
                None,
            ]
        );
    }
}
