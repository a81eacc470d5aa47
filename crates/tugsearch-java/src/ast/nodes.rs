//! AST node definitions.
//!
//! The tree is produced by an external Java parser and handed over as
//! serde-decoded data. Ids are not part of the input: every `id` field
//! defaults to zero and is assigned by `CodeBase::new`.
//!
//! # Shape
//!
//! - One `CompilationUnit` per file, holding exactly one top-level type
//! - Types hold `Member`s; nested, local and enum types are ordinary
//!   `TypeDeclaration`s further down the tree
//! - Method and constructor bodies are `Block`s of `Stmt`s
//! - Calls are `Expr::MethodCall`, the only expression carrying an id
//!
//! The `with_*` builders exist for tests and for front ends that assemble
//! trees programmatically.

use serde::{Deserialize, Serialize};

use super::ids::{CallId, MethodId, TypeId, VarId};

// ============================================================================
// Compilation units
// ============================================================================

/// One source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Package name, `None` for the default package.
    #[serde(default)]
    pub package: Option<String>,
    /// Import declarations in source order.
    #[serde(default)]
    pub imports: Vec<Import>,
    /// The file's top-level type.
    pub type_decl: TypeDeclaration,
}

impl CompilationUnit {
    /// A unit in the default package with no imports.
    pub fn new(type_decl: TypeDeclaration) -> Self {
        CompilationUnit {
            package: None,
            imports: Vec::new(),
            type_decl,
        }
    }

    /// Set the package.
    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Add an import.
    pub fn with_import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }
}

/// An import declaration.
///
/// For wildcard imports `name` is the package (or type) being opened,
/// without the trailing `.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub name: String,
    #[serde(default)]
    pub wildcard: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub line: u32,
}

impl Import {
    /// `import a.b.C;`
    pub fn single(name: impl Into<String>) -> Self {
        Import {
            name: name.into(),
            wildcard: false,
            is_static: false,
            line: 0,
        }
    }

    /// `import a.b.*;`
    pub fn wildcard(package: impl Into<String>) -> Self {
        Import {
            name: package.into(),
            wildcard: true,
            is_static: false,
            line: 0,
        }
    }

    /// `import static a.b.C.member;`
    pub fn static_member(name: impl Into<String>) -> Self {
        Import {
            name: name.into(),
            wildcard: false,
            is_static: true,
            line: 0,
        }
    }

    /// Last dotted segment of the imported name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

// ============================================================================
// Modifiers
// ============================================================================

/// Access level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    PackagePrivate,
    Private,
}

impl Visibility {
    /// Source keyword, empty for package-private.
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::PackagePrivate => "",
            Visibility::Private => "private",
        }
    }
}

/// Declaration modifiers and annotations.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_strictfp: bool,
    pub is_synchronized: bool,
    pub is_native: bool,
    pub is_default: bool,
    pub is_transient: bool,
    pub is_volatile: bool,
    /// Annotation names without `@`, e.g. `Override`.
    pub annotations: Vec<String>,
}

impl Modifiers {
    /// `public`
    pub fn public() -> Self {
        Modifiers {
            visibility: Visibility::Public,
            ..Default::default()
        }
    }

    /// `private`
    pub fn private() -> Self {
        Modifiers {
            visibility: Visibility::Private,
            ..Default::default()
        }
    }

    /// Add `static`.
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Add `final`.
    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Add `abstract`.
    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}

// ============================================================================
// Types
// ============================================================================

/// Kind of type declaration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    /// Source keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
        }
    }
}

/// A class, interface, enum or annotation declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    #[serde(default)]
    pub id: TypeId,
    #[serde(default)]
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Type parameter declarations, e.g. `T extends Comparable<T>`.
    #[serde(default)]
    pub type_parameters: Vec<String>,
    /// The `extends` clause of a class.
    #[serde(default)]
    pub superclass: Option<String>,
    /// `implements` for classes, `extends` for interfaces.
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub line: u32,
}

impl TypeDeclaration {
    fn with_kind(kind: TypeKind, name: impl Into<String>) -> Self {
        TypeDeclaration {
            id: TypeId::default(),
            kind,
            name: name.into(),
            modifiers: Modifiers::default(),
            type_parameters: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            line: 0,
        }
    }

    /// A package-private class with no members.
    pub fn class(name: impl Into<String>) -> Self {
        Self::with_kind(TypeKind::Class, name)
    }

    /// An interface with no members.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::with_kind(TypeKind::Interface, name)
    }

    /// An enum with no constants.
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::with_kind(TypeKind::Enum, name)
    }

    /// An annotation type.
    pub fn annotation(name: impl Into<String>) -> Self {
        Self::with_kind(TypeKind::Annotation, name)
    }

    /// Set the superclass.
    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Add an implemented (or, for interfaces, extended) interface.
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Set the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Add a type parameter declaration.
    pub fn with_type_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.type_parameters.push(parameter.into());
        self
    }

    /// Add a member.
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Add a method.
    pub fn with_method(self, method: MethodDeclaration) -> Self {
        self.with_member(Member::Method(method))
    }

    /// Add a constructor.
    pub fn with_constructor(self, constructor: MethodDeclaration) -> Self {
        self.with_member(Member::Constructor(constructor))
    }

    /// Add a field.
    pub fn with_field(self, field: VariableDeclaration) -> Self {
        self.with_member(Member::Field(field))
    }

    /// Add a nested type.
    pub fn with_nested(self, nested: TypeDeclaration) -> Self {
        self.with_member(Member::Type(nested))
    }

    /// Set the source line.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    /// Declared methods (not constructors) in source order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDeclaration> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    /// Declared fields in source order.
    pub fn fields(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(field) => Some(field),
            _ => None,
        })
    }

    /// True for interfaces and annotation types.
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }
}

/// A member of a type body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    Field(VariableDeclaration),
    Method(MethodDeclaration),
    Constructor(MethodDeclaration),
    Initializer(Initializer),
    Type(TypeDeclaration),
    EnumConstant(EnumConstant),
    Comment(Comment),
}

impl Member {
    /// Source line of the member.
    pub fn line(&self) -> u32 {
        match self {
            Member::Field(v) => v.line,
            Member::Method(m) | Member::Constructor(m) => m.line,
            Member::Initializer(i) => i.line,
            Member::Type(t) => t.line,
            Member::EnumConstant(c) => c.line,
            Member::Comment(c) => c.line,
        }
    }
}

/// An instance or static initializer block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    #[serde(default)]
    pub is_static: bool,
    pub body: Block,
    #[serde(default)]
    pub line: u32,
}

/// An enum constant with optional constructor arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<Expr>,
    #[serde(default)]
    pub line: u32,
}

// ============================================================================
// Methods and variables
// ============================================================================

/// A method or constructor declaration.
///
/// Constructors use an empty `return_type` and are wrapped in
/// `Member::Constructor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    #[serde(default)]
    pub id: MethodId,
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub type_parameters: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<VariableDeclaration>,
    #[serde(default)]
    pub throws: Vec<String>,
    /// `None` for abstract, interface and native methods.
    #[serde(default)]
    pub body: Option<Block>,
    #[serde(default)]
    pub line: u32,
}

impl MethodDeclaration {
    /// A package-private method with no parameters and no body.
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        MethodDeclaration {
            id: MethodId::default(),
            name: name.into(),
            modifiers: Modifiers::default(),
            return_type: return_type.into(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            throws: Vec::new(),
            body: None,
            line: 0,
        }
    }

    /// A constructor for the named type.
    pub fn constructor(type_name: impl Into<String>) -> Self {
        Self::new(type_name, "")
    }

    /// Add a parameter.
    pub fn with_parameter(mut self, type_name: impl Into<String>, name: impl Into<String>) -> Self {
        self.parameters
            .push(VariableDeclaration::parameter(type_name, name));
        self
    }

    /// Set the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Add a type parameter declaration.
    pub fn with_type_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.type_parameters.push(parameter.into());
        self
    }

    /// Add a thrown type.
    pub fn with_throws(mut self, type_name: impl Into<String>) -> Self {
        self.throws.push(type_name.into());
        self
    }

    /// Set the body.
    pub fn with_body(mut self, statements: Vec<Stmt>) -> Self {
        self.body = Some(Block::new(statements));
        self
    }

    /// Set the source line.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    /// True if the last parameter is declared with `...`.
    pub fn is_varargs(&self) -> bool {
        self.parameters
            .last()
            .is_some_and(|p| p.type_name.trim_end().ends_with("..."))
    }
}

/// Where a variable is declared.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// A field of a type.
    Field,
    /// A method, catch or lambda parameter.
    Parameter,
    /// A local variable, including for-each and resource variables.
    #[default]
    Local,
}

/// A field, parameter or local variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    #[serde(default)]
    pub id: VarId,
    #[serde(default)]
    pub kind: VariableKind,
    pub name: String,
    /// Declared type text, e.g. `List<String>[]` or `String...`.
    pub type_name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub initializer: Option<Expr>,
    #[serde(default)]
    pub line: u32,
}

impl VariableDeclaration {
    fn with_kind(kind: VariableKind, type_name: impl Into<String>, name: impl Into<String>) -> Self {
        VariableDeclaration {
            id: VarId::default(),
            kind,
            name: name.into(),
            type_name: type_name.into(),
            modifiers: Modifiers::default(),
            initializer: None,
            line: 0,
        }
    }

    /// A field declaration.
    pub fn field(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(VariableKind::Field, type_name, name)
    }

    /// A parameter declaration.
    pub fn parameter(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(VariableKind::Parameter, type_name, name)
    }

    /// A local variable declaration.
    pub fn local(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(VariableKind::Local, type_name, name)
    }

    /// Set the initializer.
    pub fn with_initializer(mut self, initializer: Expr) -> Self {
        self.initializer = Some(initializer);
        self
    }

    /// Set the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the source line.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A braced statement list.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub statements: Vec<Stmt>,
    #[serde(default)]
    pub line: u32,
}

impl Block {
    /// A block with the given statements.
    pub fn new(statements: Vec<Stmt>) -> Self {
        Block {
            statements,
            line: 0,
        }
    }

    /// Local variables declared directly in this block, in source order.
    pub fn locals(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.statements.iter().filter_map(|s| match s {
            Stmt::LocalVariable(decl) => Some(decl),
            _ => None,
        })
    }
}

/// One arm of a switch statement. Empty `labels` is `default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    #[serde(default)]
    pub labels: Vec<Expr>,
    #[serde(default)]
    pub statements: Vec<Stmt>,
    #[serde(default)]
    pub line: u32,
}

/// A catch clause. Multi-catch types are written `A | B`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub parameter: VariableDeclaration,
    pub body: Block,
    #[serde(default)]
    pub line: u32,
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    Block(Block),
    LocalVariable(VariableDeclaration),
    LocalClass(TypeDeclaration),
    Expression {
        expr: Expr,
        #[serde(default)]
        line: u32,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        #[serde(default)]
        else_branch: Option<Box<Stmt>>,
        #[serde(default)]
        line: u32,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        #[serde(default)]
        line: u32,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
        #[serde(default)]
        line: u32,
    },
    For {
        #[serde(default)]
        init: Vec<Stmt>,
        #[serde(default)]
        condition: Option<Expr>,
        #[serde(default)]
        update: Vec<Expr>,
        body: Box<Stmt>,
        #[serde(default)]
        line: u32,
    },
    ForEach {
        variable: VariableDeclaration,
        iterable: Expr,
        body: Box<Stmt>,
        #[serde(default)]
        line: u32,
    },
    Switch {
        selector: Expr,
        #[serde(default)]
        cases: Vec<SwitchCase>,
        #[serde(default)]
        line: u32,
    },
    Synchronized {
        lock: Expr,
        body: Block,
        #[serde(default)]
        line: u32,
    },
    Try {
        #[serde(default)]
        resources: Vec<VariableDeclaration>,
        body: Block,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Block>,
        #[serde(default)]
        line: u32,
    },
    Return {
        #[serde(default)]
        value: Option<Expr>,
        #[serde(default)]
        line: u32,
    },
    Throw {
        value: Expr,
        #[serde(default)]
        line: u32,
    },
    Break {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        line: u32,
    },
    Continue {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        line: u32,
    },
    Labeled {
        label: String,
        body: Box<Stmt>,
        #[serde(default)]
        line: u32,
    },
    Assert {
        condition: Expr,
        #[serde(default)]
        message: Option<Expr>,
        #[serde(default)]
        line: u32,
    },
    Comment(Comment),
    Empty {
        #[serde(default)]
        line: u32,
    },
}

impl Stmt {
    /// An expression statement, taking its line from a call if it is one.
    pub fn expression(expr: Expr) -> Self {
        let line = match &expr {
            Expr::MethodCall(call) => call.line,
            _ => 0,
        };
        Stmt::Expression { expr, line }
    }

    /// A local variable declaration statement.
    pub fn local(
        type_name: impl Into<String>,
        name: impl Into<String>,
        initializer: Option<Expr>,
    ) -> Self {
        let mut decl = VariableDeclaration::local(type_name, name);
        decl.initializer = initializer;
        Stmt::LocalVariable(decl)
    }

    /// `return value;`
    pub fn ret(value: Option<Expr>) -> Self {
        Stmt::Return { value, line: 0 }
    }

    /// Source line of the statement.
    pub fn line(&self) -> u32 {
        match self {
            Stmt::Block(b) => b.line,
            Stmt::LocalVariable(v) => v.line,
            Stmt::LocalClass(t) => t.line,
            Stmt::Comment(c) => c.line,
            Stmt::Expression { line, .. }
            | Stmt::If { line, .. }
            | Stmt::While { line, .. }
            | Stmt::DoWhile { line, .. }
            | Stmt::For { line, .. }
            | Stmt::ForEach { line, .. }
            | Stmt::Switch { line, .. }
            | Stmt::Synchronized { line, .. }
            | Stmt::Try { line, .. }
            | Stmt::Return { line, .. }
            | Stmt::Throw { line, .. }
            | Stmt::Break { line, .. }
            | Stmt::Continue { line, .. }
            | Stmt::Labeled { line, .. }
            | Stmt::Assert { line, .. }
            | Stmt::Empty { line } => *line,
        }
    }

    /// The control-flow kind, for statements that are control flow.
    pub fn control_flow_kind(&self) -> Option<ControlFlowKind> {
        Some(match self {
            Stmt::If { .. } => ControlFlowKind::If,
            Stmt::While { .. } => ControlFlowKind::While,
            Stmt::DoWhile { .. } => ControlFlowKind::DoWhile,
            Stmt::For { .. } => ControlFlowKind::For,
            Stmt::ForEach { .. } => ControlFlowKind::ForEach,
            Stmt::Switch { .. } => ControlFlowKind::Switch,
            Stmt::Try { .. } => ControlFlowKind::Try,
            Stmt::Synchronized { .. } => ControlFlowKind::Synchronized,
            Stmt::Return { .. } => ControlFlowKind::Return,
            Stmt::Throw { .. } => ControlFlowKind::Throw,
            Stmt::Break { .. } => ControlFlowKind::Break,
            Stmt::Continue { .. } => ControlFlowKind::Continue,
            _ => return None,
        })
    }

    /// The condition (or selector) of a control-flow statement.
    pub fn condition(&self) -> Option<&Expr> {
        match self {
            Stmt::If { condition, .. }
            | Stmt::While { condition, .. }
            | Stmt::DoWhile { condition, .. } => Some(condition),
            Stmt::For { condition, .. } => condition.as_ref(),
            Stmt::ForEach { iterable, .. } => Some(iterable),
            Stmt::Switch { selector, .. } => Some(selector),
            Stmt::Synchronized { lock, .. } => Some(lock),
            _ => None,
        }
    }
}

/// Kinds of control flow a query can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlFlowKind {
    If,
    While,
    DoWhile,
    For,
    ForEach,
    Switch,
    Try,
    Synchronized,
    Return,
    Throw,
    Break,
    Continue,
    /// The `?:` expression.
    Conditional,
}

// ============================================================================
// Expressions
// ============================================================================

/// Literal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean,
    Null,
}

/// Prefix and postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    /// Source token.
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

/// Body of a lambda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

/// A method invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    #[serde(default)]
    pub id: CallId,
    /// `None` for an unqualified call such as `foo(x)`.
    #[serde(default)]
    pub receiver: Option<Box<Expr>>,
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<Expr>,
    #[serde(default)]
    pub line: u32,
}

impl MethodCall {
    /// An unqualified call.
    pub fn new(name: impl Into<String>, arguments: Vec<Expr>) -> Self {
        MethodCall {
            id: CallId::default(),
            receiver: None,
            name: name.into(),
            arguments,
            line: 0,
        }
    }

    /// Set the receiver.
    pub fn on(mut self, receiver: Expr) -> Self {
        self.receiver = Some(Box::new(receiver));
        self
    }

    /// Set the source line.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }
}

impl From<MethodCall> for Expr {
    fn from(call: MethodCall) -> Self {
        Expr::MethodCall(call)
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    Literal {
        kind: LiteralKind,
        value: String,
    },
    Name {
        name: String,
    },
    This,
    Super,
    FieldAccess {
        target: Box<Expr>,
        name: String,
    },
    MethodCall(MethodCall),
    New {
        type_name: String,
        #[serde(default)]
        arguments: Vec<Expr>,
    },
    NewArray {
        element_type: String,
        dimensions: usize,
        #[serde(default)]
        sizes: Vec<Expr>,
        #[serde(default)]
        initializer: Option<Vec<Expr>>,
    },
    ArrayInit {
        #[serde(default)]
        elements: Vec<Expr>,
    },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Cast {
        type_name: String,
        operand: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `target = value`, or `target op= value` when `op` is set.
    Assign {
        #[serde(default)]
        op: Option<BinaryOp>,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    InstanceOf {
        operand: Box<Expr>,
        type_name: String,
    },
    Lambda {
        #[serde(default)]
        parameters: Vec<String>,
        body: LambdaBody,
    },
    MethodReference {
        target: Box<Expr>,
        name: String,
    },
}

impl Expr {
    /// A simple name.
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name { name: name.into() }
    }

    /// An `int` literal.
    pub fn int(value: i64) -> Self {
        Expr::Literal {
            kind: LiteralKind::Int,
            value: value.to_string(),
        }
    }

    /// A string literal; `value` is the unquoted content.
    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal {
            kind: LiteralKind::String,
            value: value.into(),
        }
    }

    /// A boolean literal.
    pub fn boolean(value: bool) -> Self {
        Expr::Literal {
            kind: LiteralKind::Boolean,
            value: value.to_string(),
        }
    }

    /// `null`
    pub fn null() -> Self {
        Expr::Literal {
            kind: LiteralKind::Null,
            value: "null".to_string(),
        }
    }

    /// An unqualified call.
    pub fn call(name: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Expr::MethodCall(MethodCall::new(name, arguments))
    }

    /// A call on a receiver.
    pub fn call_on(receiver: Expr, name: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Expr::MethodCall(MethodCall::new(name, arguments).on(receiver))
    }

    /// `new T(args)`
    pub fn new_object(type_name: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Expr::New {
            type_name: type_name.into(),
            arguments,
        }
    }

    /// `target.name`
    pub fn field(target: Expr, name: impl Into<String>) -> Self {
        Expr::FieldAccess {
            target: Box::new(target),
            name: name.into(),
        }
    }

    /// `left op right`
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

// ============================================================================
// Comments
// ============================================================================

/// Comment style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`, including javadoc.
    Block,
}

/// A comment attached to a type body or block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub kind: CommentKind,
    /// Text without the comment delimiters.
    pub content: String,
    #[serde(default)]
    pub javadoc: bool,
    #[serde(default)]
    pub line: u32,
}

impl Comment {
    /// A `//` comment.
    pub fn line_comment(content: impl Into<String>) -> Self {
        Comment {
            kind: CommentKind::Line,
            content: content.into(),
            javadoc: false,
            line: 0,
        }
    }

    /// A `/** */` comment.
    pub fn javadoc(content: impl Into<String>) -> Self {
        Comment {
            kind: CommentKind::Block,
            content: content.into(),
            javadoc: true,
            line: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_unit() {
        let json = r#"{
            "package": "p",
            "imports": [{"name": "q.Helper"}],
            "type_decl": {
                "kind": "class",
                "name": "A",
                "superclass": "Base",
                "members": [
                    {"member": "field", "name": "count", "type_name": "int"},
                    {"member": "method", "name": "bar", "return_type": "void",
                     "parameters": [{"kind": "parameter", "name": "s", "type_name": "String"}],
                     "body": {"statements": [
                        {"stmt": "expression", "expr": {"expr": "method_call", "name": "foo",
                          "arguments": [{"expr": "literal", "kind": "int", "value": "5"}], "line": 4}}
                     ]}}
                ]
            }
        }"#;
        let unit: CompilationUnit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.package.as_deref(), Some("p"));
        assert_eq!(unit.imports[0].simple_name(), "Helper");
        assert_eq!(unit.type_decl.superclass.as_deref(), Some("Base"));
        let method = unit.type_decl.methods().next().unwrap();
        assert_eq!(method.parameters[0].kind, VariableKind::Parameter);
        let body = method.body.as_ref().unwrap();
        match &body.statements[0] {
            Stmt::Expression {
                expr: Expr::MethodCall(call),
                ..
            } => {
                assert_eq!(call.name, "foo");
                assert_eq!(call.line, 4);
                assert_eq!(call.arguments, vec![Expr::int(5)]);
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_unit_expressions_deserialize() {
        let expr: Expr = serde_json::from_str(r#"{"expr": "this"}"#).unwrap();
        assert_eq!(expr, Expr::This);
    }

    #[test]
    fn test_cast_and_instanceof_deserialize() {
        let json = r#"{"expr": "cast", "type_name": "String",
            "operand": {"expr": "instance_of", "type_name": "Base",
                        "operand": {"expr": "name", "name": "o"}}}"#;
        let expr: Expr = serde_json::from_str(json).unwrap();
        let expected = Expr::Cast {
            type_name: "String".to_string(),
            operand: Box::new(Expr::InstanceOf {
                operand: Box::new(Expr::name("o")),
                type_name: "Base".to_string(),
            }),
        };
        assert_eq!(expr, expected);

        let back: Expr = serde_json::from_str(&serde_json::to_string(&expected).unwrap()).unwrap();
        assert_eq!(back, expected);
    }

    #[test]
    fn test_builders() {
        let t = TypeDeclaration::class("A")
            .extends("B")
            .implements("I")
            .with_method(
                MethodDeclaration::new("foo", "void")
                    .with_parameter("String...", "args")
                    .with_modifiers(Modifiers::public().with_static()),
            )
            .with_field(VariableDeclaration::field("int", "x"));
        assert_eq!(t.methods().count(), 1);
        assert_eq!(t.fields().count(), 1);
        assert!(t.methods().next().unwrap().is_varargs());
        assert!(!t.is_interface());
    }

    #[test]
    fn test_control_flow_kind() {
        let stmt = Stmt::While {
            condition: Expr::boolean(true),
            body: Box::new(Stmt::Empty { line: 0 }),
            line: 3,
        };
        assert_eq!(stmt.control_flow_kind(), Some(ControlFlowKind::While));
        assert_eq!(stmt.line(), 3);
        assert_eq!(Stmt::ret(None).control_flow_kind(), Some(ControlFlowKind::Return));
        assert_eq!(Stmt::Empty { line: 0 }.control_flow_kind(), None);
    }

    #[test]
    fn test_block_locals() {
        let block = Block::new(vec![
            Stmt::local("int", "a", None),
            Stmt::expression(Expr::call("f", vec![])),
            Stmt::local("String", "b", Some(Expr::string("x"))),
        ]);
        let names: Vec<&str> = block.locals().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
