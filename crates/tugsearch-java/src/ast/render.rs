//! Pseudocode rendering.
//!
//! Every node renders deterministically at an indentation level. The output
//! reads like Java but is not meant to round-trip: it exists to give search
//! results a recognizable one-line summary.
//!
//! Indentation is four spaces per level. Expressions always render on one
//! line; nested binary operands are parenthesized so operator precedence
//! never has to be reconstructed.

use super::nodes::{
    Block, CatchClause, Comment, CommentKind, CompilationUnit, EnumConstant, Expr, Initializer,
    LambdaBody, LiteralKind, Member, MethodCall, MethodDeclaration, Modifiers, Stmt, SwitchCase,
    TypeDeclaration, TypeKind, UnaryOp, VariableDeclaration, VariableKind,
};

const INDENT: &str = "    ";

/// Deterministic pseudocode rendering.
pub trait Pseudocode {
    /// Render at indentation level `indent`, possibly over several lines.
    fn render(&self, indent: usize) -> String;

    /// The first rendered line, trimmed. Used for result records.
    fn summary(&self) -> String {
        self.render(0)
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .to_string()
    }
}

fn pad(indent: usize) -> String {
    INDENT.repeat(indent)
}

fn join<T: Pseudocode>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|i| i.render(0))
        .collect::<Vec<_>>()
        .join(separator)
}

fn render_modifiers(modifiers: &Modifiers) -> String {
    let mut words: Vec<String> = modifiers
        .annotations
        .iter()
        .map(|a| format!("@{}", a))
        .collect();
    let keyword = modifiers.visibility.keyword();
    if !keyword.is_empty() {
        words.push(keyword.to_string());
    }
    let flags = [
        (modifiers.is_abstract, "abstract"),
        (modifiers.is_default, "default"),
        (modifiers.is_static, "static"),
        (modifiers.is_final, "final"),
        (modifiers.is_synchronized, "synchronized"),
        (modifiers.is_native, "native"),
        (modifiers.is_transient, "transient"),
        (modifiers.is_volatile, "volatile"),
        (modifiers.is_strictfp, "strictfp"),
    ];
    words.extend(
        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, word)| word.to_string()),
    );
    if words.is_empty() {
        String::new()
    } else {
        format!("{} ", words.join(" "))
    }
}

fn render_type_parameters(parameters: &[String]) -> String {
    if parameters.is_empty() {
        String::new()
    } else {
        format!("<{}>", parameters.join(", "))
    }
}

// ============================================================================
// Declarations
// ============================================================================

impl Pseudocode for CompilationUnit {
    fn render(&self, indent: usize) -> String {
        let mut out = String::new();
        if let Some(package) = &self.package {
            out.push_str(&format!("{}package {};\n", pad(indent), package));
        }
        for import in &self.imports {
            out.push_str(&format!(
                "{}import {}{}{};\n",
                pad(indent),
                if import.is_static { "static " } else { "" },
                import.name,
                if import.wildcard { ".*" } else { "" }
            ));
        }
        out.push_str(&self.type_decl.render(indent));
        out
    }
}

impl Pseudocode for TypeDeclaration {
    fn render(&self, indent: usize) -> String {
        let mut head = format!(
            "{}{}{} {}{}",
            pad(indent),
            render_modifiers(&self.modifiers),
            self.kind.keyword(),
            self.name,
            render_type_parameters(&self.type_parameters)
        );
        if let Some(superclass) = &self.superclass {
            head.push_str(&format!(" extends {}", superclass));
        }
        if !self.interfaces.is_empty() {
            let keyword = match self.kind {
                TypeKind::Interface => "extends",
                _ => "implements",
            };
            head.push_str(&format!(" {}({})", keyword, self.interfaces.join(", ")));
        }
        if self.members.is_empty() {
            return format!("{} {{}}", head);
        }
        let body: Vec<String> = self.members.iter().map(|m| m.render(indent + 1)).collect();
        format!("{} {{\n{}\n{}}}", head, body.join("\n"), pad(indent))
    }
}

impl Pseudocode for Member {
    fn render(&self, indent: usize) -> String {
        match self {
            Member::Field(field) => field.render(indent),
            Member::Method(method) | Member::Constructor(method) => method.render(indent),
            Member::Initializer(init) => init.render(indent),
            Member::Type(nested) => nested.render(indent),
            Member::EnumConstant(constant) => constant.render(indent),
            Member::Comment(comment) => comment.render(indent),
        }
    }
}

impl Pseudocode for Initializer {
    fn render(&self, indent: usize) -> String {
        let keyword = if self.is_static { "static " } else { "" };
        format!("{}{}{}", pad(indent), keyword, self.body.render(indent))
    }
}

impl Pseudocode for EnumConstant {
    fn render(&self, indent: usize) -> String {
        if self.arguments.is_empty() {
            format!("{}{},", pad(indent), self.name)
        } else {
            format!("{}{}({}),", pad(indent), self.name, join(&self.arguments, ", "))
        }
    }
}

impl Pseudocode for MethodDeclaration {
    fn render(&self, indent: usize) -> String {
        let type_parameters = render_type_parameters(&self.type_parameters);
        let mut head = format!("{}{}", pad(indent), render_modifiers(&self.modifiers));
        if !type_parameters.is_empty() {
            head.push_str(&type_parameters);
            head.push(' ');
        }
        if !self.return_type.is_empty() {
            head.push_str(&self.return_type);
            head.push(' ');
        }
        head.push_str(&format!("{}({})", self.name, join(&self.parameters, ", ")));
        if !self.throws.is_empty() {
            head.push_str(&format!(" throws {}", self.throws.join(", ")));
        }
        match &self.body {
            Some(body) => format!("{} {}", head, body.render(indent)),
            None => format!("{};", head),
        }
    }
}

impl Pseudocode for VariableDeclaration {
    fn render(&self, indent: usize) -> String {
        let mut out = format!(
            "{}{}{} {}",
            pad(indent),
            render_modifiers(&self.modifiers),
            self.type_name,
            self.name
        );
        if let Some(init) = &self.initializer {
            out.push_str(&format!(" = {}", init.render(0)));
        }
        if self.kind != VariableKind::Parameter {
            out.push(';');
        }
        out
    }
}

impl Pseudocode for Comment {
    fn render(&self, indent: usize) -> String {
        match (self.kind, self.javadoc) {
            (CommentKind::Line, _) => format!("{}// {}", pad(indent), self.content),
            (CommentKind::Block, true) => format!("{}/** {} */", pad(indent), self.content),
            (CommentKind::Block, false) => format!("{}/* {} */", pad(indent), self.content),
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

impl Pseudocode for Block {
    /// Renders from the opening brace; the caller supplies any leading padding.
    fn render(&self, indent: usize) -> String {
        if self.statements.is_empty() {
            return "{}".to_string();
        }
        let body: Vec<String> = self
            .statements
            .iter()
            .map(|s| s.render(indent + 1))
            .collect();
        format!("{{\n{}\n{}}}", body.join("\n"), pad(indent))
    }
}

/// Render a nested statement after a header such as `while (c)`.
fn render_body(body: &Stmt, indent: usize) -> String {
    match body {
        Stmt::Block(block) => format!(" {}", block.render(indent)),
        other => format!("\n{}", other.render(indent + 1)),
    }
}

impl Pseudocode for CatchClause {
    fn render(&self, indent: usize) -> String {
        format!(
            "catch ({} {}) {}",
            self.parameter.type_name,
            self.parameter.name,
            self.body.render(indent)
        )
    }
}

impl Pseudocode for SwitchCase {
    fn render(&self, indent: usize) -> String {
        let label = if self.labels.is_empty() {
            format!("{}default:", pad(indent))
        } else {
            format!("{}case {}:", pad(indent), join(&self.labels, ", "))
        };
        let mut lines = vec![label];
        lines.extend(self.statements.iter().map(|s| s.render(indent + 1)));
        lines.join("\n")
    }
}

impl Pseudocode for Stmt {
    fn render(&self, indent: usize) -> String {
        let p = pad(indent);
        match self {
            Stmt::Block(block) => format!("{}{}", p, block.render(indent)),
            Stmt::LocalVariable(decl) => decl.render(indent),
            Stmt::LocalClass(decl) => decl.render(indent),
            Stmt::Expression { expr, .. } => format!("{}{};", p, expr.render(0)),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let mut out = format!(
                    "{}if ({}){}",
                    p,
                    condition.render(0),
                    render_body(then_branch, indent)
                );
                if let Some(else_branch) = else_branch {
                    out.push_str(&format!("\n{}else{}", p, render_body(else_branch, indent)));
                }
                out
            }
            Stmt::While {
                condition, body, ..
            } => format!(
                "{}while ({}){}",
                p,
                condition.render(0),
                render_body(body, indent)
            ),
            Stmt::DoWhile {
                body, condition, ..
            } => format!(
                "{}do{}\n{}while ({});",
                p,
                render_body(body, indent),
                p,
                condition.render(0)
            ),
            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                let init: Vec<String> = init
                    .iter()
                    .map(|s| s.render(0).trim_end_matches(';').to_string())
                    .collect();
                let condition = condition.as_ref().map(|c| c.render(0)).unwrap_or_default();
                format!(
                    "{}for ({}; {}; {}){}",
                    p,
                    init.join(", "),
                    condition,
                    join(update, ", "),
                    render_body(body, indent)
                )
            }
            Stmt::ForEach {
                variable,
                iterable,
                body,
                ..
            } => format!(
                "{}for ({} {} : {}){}",
                p,
                variable.type_name,
                variable.name,
                iterable.render(0),
                render_body(body, indent)
            ),
            Stmt::Switch {
                selector, cases, ..
            } => {
                let mut lines = vec![format!("{}switch ({}) {{", p, selector.render(0))];
                lines.extend(cases.iter().map(|c| c.render(indent + 1)));
                lines.push(format!("{}}}", p));
                lines.join("\n")
            }
            Stmt::Synchronized { lock, body, .. } => format!(
                "{}synchronized ({}) {}",
                p,
                lock.render(0),
                body.render(indent)
            ),
            Stmt::Try {
                resources,
                body,
                catches,
                finally,
                ..
            } => {
                let mut out = if resources.is_empty() {
                    format!("{}try {}", p, body.render(indent))
                } else {
                    let resources: Vec<String> = resources
                        .iter()
                        .map(|r| r.render(0).trim_end_matches(';').to_string())
                        .collect();
                    format!(
                        "{}try ({}) {}",
                        p,
                        resources.join("; "),
                        body.render(indent)
                    )
                };
                for catch in catches {
                    out.push_str(&format!(" {}", catch.render(indent)));
                }
                if let Some(finally) = finally {
                    out.push_str(&format!(" finally {}", finally.render(indent)));
                }
                out
            }
            Stmt::Return { value, .. } => match value {
                Some(value) => format!("{}return {};", p, value.render(0)),
                None => format!("{}return;", p),
            },
            Stmt::Throw { value, .. } => format!("{}throw {};", p, value.render(0)),
            Stmt::Break { label, .. } => match label {
                Some(label) => format!("{}break {};", p, label),
                None => format!("{}break;", p),
            },
            Stmt::Continue { label, .. } => match label {
                Some(label) => format!("{}continue {};", p, label),
                None => format!("{}continue;", p),
            },
            Stmt::Labeled { label, body, .. } => {
                format!("{}{}:\n{}", p, label, body.render(indent))
            }
            Stmt::Assert {
                condition, message, ..
            } => match message {
                Some(message) => format!(
                    "{}assert {} : {};",
                    p,
                    condition.render(0),
                    message.render(0)
                ),
                None => format!("{}assert {};", p, condition.render(0)),
            },
            Stmt::Comment(comment) => comment.render(indent),
            Stmt::Empty { .. } => format!("{};", p),
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

fn needs_parens(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Binary { .. }
            | Expr::Conditional { .. }
            | Expr::Assign { .. }
            | Expr::Lambda { .. }
            | Expr::Cast { .. }
            | Expr::InstanceOf { .. }
    )
}

fn operand(expr: &Expr) -> String {
    if needs_parens(expr) {
        format!("({})", expr.render(0))
    } else {
        expr.render(0)
    }
}

impl Pseudocode for MethodCall {
    fn render(&self, _indent: usize) -> String {
        let args = join(&self.arguments, ", ");
        match &self.receiver {
            Some(receiver) => format!("{}.{}({})", operand(receiver), self.name, args),
            None => format!("{}({})", self.name, args),
        }
    }
}

impl Pseudocode for Expr {
    /// Expressions ignore `indent` except for lambda block bodies.
    fn render(&self, indent: usize) -> String {
        match self {
            Expr::Literal { kind, value } => match kind {
                LiteralKind::String => format!("\"{}\"", value),
                LiteralKind::Char => format!("'{}'", value),
                _ => value.clone(),
            },
            Expr::Name { name } => name.clone(),
            Expr::This => "this".to_string(),
            Expr::Super => "super".to_string(),
            Expr::FieldAccess { target, name } => format!("{}.{}", operand(target), name),
            Expr::MethodCall(call) => call.render(indent),
            Expr::New {
                type_name,
                arguments,
            } => format!("new {}({})", type_name, join(arguments, ", ")),
            Expr::NewArray {
                element_type,
                dimensions,
                sizes,
                initializer,
            } => {
                let mut out = format!("new {}", element_type);
                for i in 0..*dimensions {
                    match sizes.get(i) {
                        Some(size) => out.push_str(&format!("[{}]", size.render(0))),
                        None => out.push_str("[]"),
                    }
                }
                if let Some(elements) = initializer {
                    out.push_str(&format!(" {{{}}}", join(elements, ", ")));
                }
                out
            }
            Expr::ArrayInit { elements } => format!("{{{}}}", join(elements, ", ")),
            Expr::ArrayAccess { array, index } => {
                format!("{}[{}]", operand(array), index.render(0))
            }
            Expr::Cast {
                type_name,
                operand: inner,
            } => format!("({}) {}", type_name, operand(inner)),
            Expr::Unary { op, operand: inner } => {
                let inner = operand(inner);
                match op {
                    UnaryOp::Plus => format!("+{}", inner),
                    UnaryOp::Minus => format!("-{}", inner),
                    UnaryOp::Not => format!("!{}", inner),
                    UnaryOp::BitNot => format!("~{}", inner),
                    UnaryOp::PreIncrement => format!("++{}", inner),
                    UnaryOp::PreDecrement => format!("--{}", inner),
                    UnaryOp::PostIncrement => format!("{}++", inner),
                    UnaryOp::PostDecrement => format!("{}--", inner),
                }
            }
            Expr::Binary { op, left, right } => {
                format!("{} {} {}", operand(left), op.token(), operand(right))
            }
            Expr::Assign { op, target, value } => {
                let token = op.map(|o| o.token()).unwrap_or("");
                format!("{} {}= {}", target.render(0), token, value.render(0))
            }
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => format!(
                "{} ? {} : {}",
                operand(condition),
                operand(then_expr),
                operand(else_expr)
            ),
            Expr::InstanceOf {
                operand: inner,
                type_name,
            } => {
                format!("{} instanceof {}", operand(inner), type_name)
            }
            Expr::Lambda { parameters, body } => {
                let params = if parameters.len() == 1 {
                    parameters[0].clone()
                } else {
                    format!("({})", parameters.join(", "))
                };
                match body {
                    LambdaBody::Expr(expr) => format!("{} -> {}", params, expr.render(0)),
                    LambdaBody::Block(block) => format!("{} -> {}", params, block.render(indent)),
                }
            }
            Expr::MethodReference { target, name } => format!("{}::{}", operand(target), name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::{BinaryOp, Import, Modifiers};

    #[test]
    fn test_render_class_header() {
        let t = TypeDeclaration::class("B")
            .with_modifiers(Modifiers::public().with_final())
            .with_type_parameter("T extends Number")
            .extends("A")
            .implements("I")
            .implements("J");
        assert_eq!(
            t.summary(),
            "public final class B<T extends Number> extends A implements(I, J) {}"
        );
    }

    #[test]
    fn test_render_interface_extends_list() {
        let t = TypeDeclaration::interface("I").implements("J");
        assert_eq!(t.render(0), "interface I extends(J) {}");
    }

    #[test]
    fn test_render_method_with_body() {
        let m = MethodDeclaration::new("bar", "void")
            .with_parameter("String", "s")
            .with_parameter("int", "n")
            .with_modifiers(Modifiers::public())
            .with_body(vec![Stmt::expression(Expr::call(
                "foo",
                vec![Expr::name("s"), Expr::int(5)],
            ))]);
        assert_eq!(
            m.render(0),
            "public void bar(String s, int n) {\n    foo(s, 5);\n}"
        );
        assert_eq!(m.summary(), "public void bar(String s, int n) {");
    }

    #[test]
    fn test_render_abstract_method_and_constructor() {
        let m = MethodDeclaration::new("run", "void")
            .with_modifiers(Modifiers::default().with_abstract())
            .with_throws("IOException");
        assert_eq!(m.render(1), "    abstract void run() throws IOException;");
        let c = MethodDeclaration::constructor("A").with_body(vec![]);
        assert_eq!(c.render(0), "A() {}");
    }

    #[test]
    fn test_render_nested_indentation() {
        let t = TypeDeclaration::class("A")
            .with_field(VariableDeclaration::field("int", "x").with_initializer(Expr::int(1)))
            .with_method(MethodDeclaration::new("f", "int").with_body(vec![Stmt::ret(Some(
                Expr::binary(
                    BinaryOp::Mul,
                    Expr::binary(BinaryOp::Add, Expr::name("x"), Expr::int(1)),
                    Expr::int(2),
                ),
            ))]));
        assert_eq!(
            t.render(0),
            "class A {\n    int x = 1;\n    int f() {\n        return (x + 1) * 2;\n    }\n}"
        );
    }

    #[test]
    fn test_render_calls_and_literals() {
        let e = Expr::call_on(
            Expr::call_on(Expr::This, "helper", vec![]),
            "run",
            vec![Expr::string("x"), Expr::null(), Expr::boolean(true)],
        );
        assert_eq!(e.render(0), "this.helper().run(\"x\", null, true)");
    }

    #[test]
    fn test_render_control_flow() {
        let s = Stmt::If {
            condition: Expr::binary(BinaryOp::Gt, Expr::name("n"), Expr::int(0)),
            then_branch: Box::new(Stmt::Block(Block::new(vec![Stmt::ret(None)]))),
            else_branch: None,
            line: 1,
        };
        assert_eq!(s.render(0), "if (n > 0) {\n    return;\n}");
        assert_eq!(s.summary(), "if (n > 0) {");
    }

    #[test]
    fn test_render_comments() {
        assert_eq!(Comment::line_comment("todo").render(0), "// todo");
        assert_eq!(Comment::javadoc("Docs").render(1), "    /** Docs */");
    }

    #[test]
    fn test_render_unit() {
        let unit = CompilationUnit::new(TypeDeclaration::class("A"))
            .in_package("p")
            .with_import(Import::wildcard("q"));
        assert_eq!(unit.render(0), "package p;\nimport q.*;\nclass A {}");
    }

    #[test]
    fn test_render_is_deterministic() {
        let e = Expr::Lambda {
            parameters: vec!["a".to_string(), "b".to_string()],
            body: LambdaBody::Expr(Box::new(Expr::binary(
                BinaryOp::Add,
                Expr::name("a"),
                Expr::name("b"),
            ))),
        };
        assert_eq!(e.render(0), e.render(0));
        assert_eq!(e.render(0), "(a, b) -> a + b");
    }
}
