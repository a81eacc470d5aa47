//! The AST model.
//!
//! - `nodes`: the closed set of node types produced by the external parser
//! - `ids`: dense id newtypes assigned by `CodeBase::new`
//! - `codebase`: the per-run collection of compilation units
//! - `index`: id-to-node arena with scope facts
//! - `visit`: the read-only visitor and its walk functions
//! - `render`: pseudocode rendering

pub mod codebase;
pub mod ids;
pub mod index;
pub mod nodes;
pub mod render;
pub mod visit;

pub use codebase::{file_stem, CodeBase, NodeCounts, SourceFile};
pub use ids::{CallId, FileId, MethodId, TypeId, VarId};
pub use index::{CallEntry, CodeIndex, MethodEntry, TypeEntry, VariableEntry};
pub use nodes::{
    BinaryOp, Block, CatchClause, Comment, CommentKind, CompilationUnit, ControlFlowKind,
    EnumConstant, Expr, Import, Initializer, LambdaBody, LiteralKind, Member, MethodCall,
    MethodDeclaration, Modifiers, Stmt, SwitchCase, TypeDeclaration, TypeKind, UnaryOp,
    VariableDeclaration, VariableKind, Visibility,
};
pub use render::Pseudocode;
pub use visit::{
    walk_block, walk_catch, walk_code_base, walk_compilation_unit, walk_expression,
    walk_expression_children, walk_member, walk_method, walk_method_call, walk_method_children,
    walk_statement, walk_statement_children, walk_type, walk_type_children, walk_variable,
    walk_variable_children, VisitResult, Visitor,
};
