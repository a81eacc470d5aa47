//! Visitor infrastructure for AST traversal.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order** for `visit_*` methods
//! - **Post-order** for `leave_*` methods
//! - Children are visited in source order
//!
//! # Control Flow
//!
//! - `VisitResult::Continue` - traverse into children
//! - `VisitResult::SkipChildren` - skip children but still call `leave_*`
//! - `VisitResult::Stop` - halt traversal immediately (no `leave_*` called)
//!
//! The `walk_*_children` functions walk only below a node. The search layer
//! uses them to search a candidate's subtree without matching the candidate
//! itself.
//!
//! ```ignore
//! use tugsearch_java::ast::{walk_code_base, MethodCall, VisitResult, Visitor};
//!
//! struct CallCounter {
//!     count: usize,
//! }
//!
//! impl<'a> Visitor<'a> for CallCounter {
//!     fn visit_method_call(&mut self, _call: &'a MethodCall) -> VisitResult {
//!         self.count += 1;
//!         VisitResult::Continue
//!     }
//! }
//! ```

use super::codebase::CodeBase;
use super::ids::FileId;
use super::nodes::{
    Block, CatchClause, Comment, CompilationUnit, EnumConstant, Expr, Initializer, LambdaBody,
    Member, MethodCall, MethodDeclaration, Stmt, TypeDeclaration, VariableDeclaration,
};

/// Result of a `visit_*` hook.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum VisitResult {
    #[default]
    Continue,
    SkipChildren,
    Stop,
}

/// Read-only AST visitor. Every hook defaults to `Continue` / no-op.
pub trait Visitor<'a> {
    fn visit_compilation_unit(&mut self, _file: FileId, _unit: &'a CompilationUnit) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_compilation_unit(&mut self, _file: FileId, _unit: &'a CompilationUnit) {}

    fn visit_type(&mut self, _decl: &'a TypeDeclaration) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_type(&mut self, _decl: &'a TypeDeclaration) {}

    /// Methods and constructors; `constructor` tells them apart.
    fn visit_method(&mut self, _decl: &'a MethodDeclaration, _constructor: bool) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_method(&mut self, _decl: &'a MethodDeclaration, _constructor: bool) {}

    fn visit_initializer(&mut self, _init: &'a Initializer) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_initializer(&mut self, _init: &'a Initializer) {}

    fn visit_enum_constant(&mut self, _constant: &'a EnumConstant) -> VisitResult {
        VisitResult::Continue
    }

    /// Fields, parameters, locals, for-each, resource and catch variables.
    fn visit_variable(&mut self, _decl: &'a VariableDeclaration) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_variable(&mut self, _decl: &'a VariableDeclaration) {}

    fn visit_comment(&mut self, _comment: &'a Comment) {}

    fn visit_block(&mut self, _block: &'a Block) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_block(&mut self, _block: &'a Block) {}

    fn visit_statement(&mut self, _stmt: &'a Stmt) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_statement(&mut self, _stmt: &'a Stmt) {}

    fn visit_catch(&mut self, _clause: &'a CatchClause) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_catch(&mut self, _clause: &'a CatchClause) {}

    fn visit_expression(&mut self, _expr: &'a Expr) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_expression(&mut self, _expr: &'a Expr) {}

    fn visit_method_call(&mut self, _call: &'a MethodCall) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_method_call(&mut self, _call: &'a MethodCall) {}
}

macro_rules! walk_or_stop {
    ($walk:expr) => {
        if $walk == VisitResult::Stop {
            return VisitResult::Stop;
        }
    };
}

// ============================================================================
// Code base and unit walks
// ============================================================================

/// Walk every file of a code base in path order.
pub fn walk_code_base<'a, V: Visitor<'a>>(visitor: &mut V, code: &'a CodeBase) -> VisitResult {
    for (file, unit) in code.units() {
        walk_or_stop!(walk_compilation_unit(visitor, file, unit));
    }
    VisitResult::Continue
}

/// Walk one compilation unit.
pub fn walk_compilation_unit<'a, V: Visitor<'a>>(
    visitor: &mut V,
    file: FileId,
    unit: &'a CompilationUnit,
) -> VisitResult {
    match visitor.visit_compilation_unit(file, unit) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => walk_or_stop!(walk_type(visitor, &unit.type_decl)),
    }
    visitor.leave_compilation_unit(file, unit);
    VisitResult::Continue
}

// ============================================================================
// Declaration walks
// ============================================================================

/// Walk a type declaration and its members.
pub fn walk_type<'a, V: Visitor<'a>>(visitor: &mut V, decl: &'a TypeDeclaration) -> VisitResult {
    match visitor.visit_type(decl) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => walk_or_stop!(walk_type_children(visitor, decl)),
    }
    visitor.leave_type(decl);
    VisitResult::Continue
}

/// Walk the members of a type declaration.
pub fn walk_type_children<'a, V: Visitor<'a>>(
    visitor: &mut V,
    decl: &'a TypeDeclaration,
) -> VisitResult {
    for member in &decl.members {
        walk_or_stop!(walk_member(visitor, member));
    }
    VisitResult::Continue
}

/// Walk a single member.
pub fn walk_member<'a, V: Visitor<'a>>(visitor: &mut V, member: &'a Member) -> VisitResult {
    match member {
        Member::Field(field) => walk_variable(visitor, field),
        Member::Method(method) => walk_method(visitor, method, false),
        Member::Constructor(method) => walk_method(visitor, method, true),
        Member::Initializer(init) => {
            match visitor.visit_initializer(init) {
                VisitResult::Stop => return VisitResult::Stop,
                VisitResult::SkipChildren => {}
                VisitResult::Continue => walk_or_stop!(walk_block(visitor, &init.body)),
            }
            visitor.leave_initializer(init);
            VisitResult::Continue
        }
        Member::Type(nested) => walk_type(visitor, nested),
        Member::EnumConstant(constant) => {
            match visitor.visit_enum_constant(constant) {
                VisitResult::Stop => return VisitResult::Stop,
                VisitResult::SkipChildren => {}
                VisitResult::Continue => {
                    for arg in &constant.arguments {
                        walk_or_stop!(walk_expression(visitor, arg));
                    }
                }
            }
            VisitResult::Continue
        }
        Member::Comment(comment) => {
            visitor.visit_comment(comment);
            VisitResult::Continue
        }
    }
}

/// Walk a method or constructor.
pub fn walk_method<'a, V: Visitor<'a>>(
    visitor: &mut V,
    decl: &'a MethodDeclaration,
    constructor: bool,
) -> VisitResult {
    match visitor.visit_method(decl, constructor) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => walk_or_stop!(walk_method_children(visitor, decl)),
    }
    visitor.leave_method(decl, constructor);
    VisitResult::Continue
}

/// Walk the parameters and body of a method.
pub fn walk_method_children<'a, V: Visitor<'a>>(
    visitor: &mut V,
    decl: &'a MethodDeclaration,
) -> VisitResult {
    for param in &decl.parameters {
        walk_or_stop!(walk_variable(visitor, param));
    }
    if let Some(body) = &decl.body {
        walk_or_stop!(walk_block(visitor, body));
    }
    VisitResult::Continue
}

/// Walk a variable declaration and its initializer.
pub fn walk_variable<'a, V: Visitor<'a>>(
    visitor: &mut V,
    decl: &'a VariableDeclaration,
) -> VisitResult {
    match visitor.visit_variable(decl) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => walk_or_stop!(walk_variable_children(visitor, decl)),
    }
    visitor.leave_variable(decl);
    VisitResult::Continue
}

/// Walk the initializer of a variable declaration.
pub fn walk_variable_children<'a, V: Visitor<'a>>(
    visitor: &mut V,
    decl: &'a VariableDeclaration,
) -> VisitResult {
    if let Some(init) = &decl.initializer {
        walk_or_stop!(walk_expression(visitor, init));
    }
    VisitResult::Continue
}

// ============================================================================
// Statement walks
// ============================================================================

/// Walk a block.
pub fn walk_block<'a, V: Visitor<'a>>(visitor: &mut V, block: &'a Block) -> VisitResult {
    match visitor.visit_block(block) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            for stmt in &block.statements {
                walk_or_stop!(walk_statement(visitor, stmt));
            }
        }
    }
    visitor.leave_block(block);
    VisitResult::Continue
}

/// Walk a statement.
pub fn walk_statement<'a, V: Visitor<'a>>(visitor: &mut V, stmt: &'a Stmt) -> VisitResult {
    match visitor.visit_statement(stmt) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => walk_or_stop!(walk_statement_children(visitor, stmt)),
    }
    visitor.leave_statement(stmt);
    VisitResult::Continue
}

/// Walk the children of a statement in source order.
pub fn walk_statement_children<'a, V: Visitor<'a>>(
    visitor: &mut V,
    stmt: &'a Stmt,
) -> VisitResult {
    match stmt {
        Stmt::Block(block) => walk_or_stop!(walk_block(visitor, block)),
        Stmt::LocalVariable(decl) => walk_or_stop!(walk_variable(visitor, decl)),
        Stmt::LocalClass(decl) => walk_or_stop!(walk_type(visitor, decl)),
        Stmt::Expression { expr, .. } => walk_or_stop!(walk_expression(visitor, expr)),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            walk_or_stop!(walk_expression(visitor, condition));
            walk_or_stop!(walk_statement(visitor, then_branch));
            if let Some(else_branch) = else_branch {
                walk_or_stop!(walk_statement(visitor, else_branch));
            }
        }
        Stmt::While {
            condition, body, ..
        } => {
            walk_or_stop!(walk_expression(visitor, condition));
            walk_or_stop!(walk_statement(visitor, body));
        }
        Stmt::DoWhile {
            body, condition, ..
        } => {
            walk_or_stop!(walk_statement(visitor, body));
            walk_or_stop!(walk_expression(visitor, condition));
        }
        Stmt::For {
            init,
            condition,
            update,
            body,
            ..
        } => {
            for s in init {
                walk_or_stop!(walk_statement(visitor, s));
            }
            if let Some(condition) = condition {
                walk_or_stop!(walk_expression(visitor, condition));
            }
            for e in update {
                walk_or_stop!(walk_expression(visitor, e));
            }
            walk_or_stop!(walk_statement(visitor, body));
        }
        Stmt::ForEach {
            variable,
            iterable,
            body,
            ..
        } => {
            walk_or_stop!(walk_variable(visitor, variable));
            walk_or_stop!(walk_expression(visitor, iterable));
            walk_or_stop!(walk_statement(visitor, body));
        }
        Stmt::Switch {
            selector, cases, ..
        } => {
            walk_or_stop!(walk_expression(visitor, selector));
            for case in cases {
                for label in &case.labels {
                    walk_or_stop!(walk_expression(visitor, label));
                }
                for s in &case.statements {
                    walk_or_stop!(walk_statement(visitor, s));
                }
            }
        }
        Stmt::Synchronized { lock, body, .. } => {
            walk_or_stop!(walk_expression(visitor, lock));
            walk_or_stop!(walk_block(visitor, body));
        }
        Stmt::Try {
            resources,
            body,
            catches,
            finally,
            ..
        } => {
            for resource in resources {
                walk_or_stop!(walk_variable(visitor, resource));
            }
            walk_or_stop!(walk_block(visitor, body));
            for clause in catches {
                walk_or_stop!(walk_catch(visitor, clause));
            }
            if let Some(finally) = finally {
                walk_or_stop!(walk_block(visitor, finally));
            }
        }
        Stmt::Return { value, .. } => {
            if let Some(value) = value {
                walk_or_stop!(walk_expression(visitor, value));
            }
        }
        Stmt::Throw { value, .. } => walk_or_stop!(walk_expression(visitor, value)),
        Stmt::Labeled { body, .. } => walk_or_stop!(walk_statement(visitor, body)),
        Stmt::Assert {
            condition, message, ..
        } => {
            walk_or_stop!(walk_expression(visitor, condition));
            if let Some(message) = message {
                walk_or_stop!(walk_expression(visitor, message));
            }
        }
        Stmt::Comment(comment) => visitor.visit_comment(comment),
        Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Empty { .. } => {}
    }
    VisitResult::Continue
}

/// Walk a catch clause.
pub fn walk_catch<'a, V: Visitor<'a>>(visitor: &mut V, clause: &'a CatchClause) -> VisitResult {
    match visitor.visit_catch(clause) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            walk_or_stop!(walk_variable(visitor, &clause.parameter));
            walk_or_stop!(walk_block(visitor, &clause.body));
        }
    }
    visitor.leave_catch(clause);
    VisitResult::Continue
}

// ============================================================================
// Expression walks
// ============================================================================

/// Walk an expression.
pub fn walk_expression<'a, V: Visitor<'a>>(visitor: &mut V, expr: &'a Expr) -> VisitResult {
    match visitor.visit_expression(expr) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => walk_or_stop!(walk_expression_children(visitor, expr)),
    }
    visitor.leave_expression(expr);
    VisitResult::Continue
}

/// Walk the children of an expression in source order.
pub fn walk_expression_children<'a, V: Visitor<'a>>(
    visitor: &mut V,
    expr: &'a Expr,
) -> VisitResult {
    match expr {
        Expr::Literal { .. } | Expr::Name { .. } | Expr::This | Expr::Super => {}
        Expr::FieldAccess { target, .. } | Expr::MethodReference { target, .. } => {
            walk_or_stop!(walk_expression(visitor, target));
        }
        Expr::MethodCall(call) => walk_or_stop!(walk_method_call(visitor, call)),
        Expr::New { arguments, .. } => {
            for arg in arguments {
                walk_or_stop!(walk_expression(visitor, arg));
            }
        }
        Expr::NewArray {
            sizes, initializer, ..
        } => {
            for size in sizes {
                walk_or_stop!(walk_expression(visitor, size));
            }
            if let Some(elements) = initializer {
                for element in elements {
                    walk_or_stop!(walk_expression(visitor, element));
                }
            }
        }
        Expr::ArrayInit { elements } => {
            for element in elements {
                walk_or_stop!(walk_expression(visitor, element));
            }
        }
        Expr::ArrayAccess { array, index } => {
            walk_or_stop!(walk_expression(visitor, array));
            walk_or_stop!(walk_expression(visitor, index));
        }
        Expr::Cast { operand, .. } | Expr::InstanceOf { operand, .. } => {
            walk_or_stop!(walk_expression(visitor, operand));
        }
        Expr::Unary { operand, .. } => walk_or_stop!(walk_expression(visitor, operand)),
        Expr::Binary { left, right, .. } => {
            walk_or_stop!(walk_expression(visitor, left));
            walk_or_stop!(walk_expression(visitor, right));
        }
        Expr::Assign { target, value, .. } => {
            walk_or_stop!(walk_expression(visitor, target));
            walk_or_stop!(walk_expression(visitor, value));
        }
        Expr::Conditional {
            condition,
            then_expr,
            else_expr,
        } => {
            walk_or_stop!(walk_expression(visitor, condition));
            walk_or_stop!(walk_expression(visitor, then_expr));
            walk_or_stop!(walk_expression(visitor, else_expr));
        }
        Expr::Lambda { body, .. } => match body {
            LambdaBody::Expr(expr) => walk_or_stop!(walk_expression(visitor, expr)),
            LambdaBody::Block(block) => walk_or_stop!(walk_block(visitor, block)),
        },
    }
    VisitResult::Continue
}

/// Walk a method call: receiver first, then arguments.
pub fn walk_method_call<'a, V: Visitor<'a>>(visitor: &mut V, call: &'a MethodCall) -> VisitResult {
    match visitor.visit_method_call(call) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            if let Some(receiver) = &call.receiver {
                walk_or_stop!(walk_expression(visitor, receiver));
            }
            for arg in &call.arguments {
                walk_or_stop!(walk_expression(visitor, arg));
            }
        }
    }
    visitor.leave_method_call(call);
    VisitResult::Continue
}
