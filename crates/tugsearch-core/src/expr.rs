//! Boolean match expressions over arbitrary leaves.
//!
//! Queries describe "what a match must contain" as a boolean combination of
//! descriptors. `MatchExpr` is that combination, generic over the leaf type
//! so the core crate does not need to know what a descriptor is.
//!
//! ## Precedence
//!
//! When an expression arrives as a flat token sequence (the shape produced
//! by query front ends), it is assembled with `NOT` binding tightest, then
//! `AND`, then `OR`:
//!
//! ```text
//! <expr>   := <and> ("OR" <and>)*
//! <and>    := <unary> ("AND" <unary>)*
//! <unary>  := "NOT" <unary> | <atom>
//! <atom>   := leaf | "(" <expr> ")"
//! ```
//!
//! Adjacent leaves with no operator between them are a syntax error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for expression assembly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExprError {
    /// No tokens at all.
    #[error("empty expression")]
    EmptyExpression,

    /// A token appeared where it cannot.
    #[error("unexpected {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },

    /// The token sequence ended early.
    #[error("expression ended unexpectedly")]
    UnexpectedEnd,
}

/// A boolean combination of leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchExpr<L> {
    /// Conjunction of expressions (all must match).
    And(Vec<MatchExpr<L>>),
    /// Disjunction of expressions (any must match).
    Or(Vec<MatchExpr<L>>),
    /// Negation of an expression.
    Not(Box<MatchExpr<L>>),
    /// A single leaf.
    Leaf(L),
}

impl<L> MatchExpr<L> {
    /// Wrap a single leaf.
    pub fn leaf(leaf: L) -> Self {
        MatchExpr::Leaf(leaf)
    }

    /// Negate an expression.
    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: MatchExpr<L>) -> Self {
        MatchExpr::Not(Box::new(expr))
    }

    /// Evaluate the expression, asking `leaf` about each leaf it needs.
    ///
    /// Evaluation short-circuits: `And` stops at the first false operand and
    /// `Or` at the first true one. An empty `And` is true and an empty `Or`
    /// is false.
    pub fn evaluate<F>(&self, leaf: &mut F) -> bool
    where
        F: FnMut(&L) -> bool,
    {
        match self {
            MatchExpr::And(exprs) => exprs.iter().all(|e| e.evaluate(leaf)),
            MatchExpr::Or(exprs) => exprs.iter().any(|e| e.evaluate(leaf)),
            MatchExpr::Not(expr) => !expr.evaluate(leaf),
            MatchExpr::Leaf(l) => leaf(l),
        }
    }

    /// All leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&L> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'s>(&'s self, out: &mut Vec<&'s L>) {
        match self {
            MatchExpr::And(exprs) | MatchExpr::Or(exprs) => {
                for expr in exprs {
                    expr.collect_leaves(out);
                }
            }
            MatchExpr::Not(expr) => expr.collect_leaves(out),
            MatchExpr::Leaf(l) => out.push(l),
        }
    }

    /// Assemble an expression from a flat token sequence.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Leaves, operators and parentheses in source order
    ///
    /// # Returns
    ///
    /// The expression tree, or an `ExprError` describing the first token
    /// that does not fit the grammar.
    pub fn from_tokens(tokens: Vec<ExprToken<L>>) -> Result<Self, ExprError> {
        if tokens.is_empty() {
            return Err(ExprError::EmptyExpression);
        }
        let mut parser = TokenParser {
            tokens: tokens.into_iter().map(Some).collect(),
            position: 0,
        };
        let expr = parser.parse_or()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(ExprError::UnexpectedToken {
                found: token.describe().to_string(),
                position: parser.position,
            }),
        }
    }
}

/// An expression as a query file carries it: a flat token list, assembled
/// with [`MatchExpr::from_tokens`], or an already built tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExprSource<L> {
    Tokens(Vec<ExprToken<L>>),
    Tree(MatchExpr<L>),
}

impl<L> ExprSource<L> {
    /// The expression tree.
    pub fn build(self) -> Result<MatchExpr<L>, ExprError> {
        match self {
            ExprSource::Tokens(tokens) => MatchExpr::from_tokens(tokens),
            ExprSource::Tree(tree) => Ok(tree),
        }
    }
}

/// One element of a flat contains-clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprToken<L> {
    Leaf(L),
    Not,
    And,
    Or,
    Open,
    Close,
}

impl<L> ExprToken<L> {
    fn describe(&self) -> &'static str {
        match self {
            ExprToken::Leaf(_) => "leaf",
            ExprToken::Not => "NOT",
            ExprToken::And => "AND",
            ExprToken::Or => "OR",
            ExprToken::Open => "'('",
            ExprToken::Close => "')'",
        }
    }
}

// ============================================================================
// Token parser
// ============================================================================

struct TokenParser<L> {
    // Leaves are moved out as they are consumed.
    tokens: Vec<Option<ExprToken<L>>>,
    position: usize,
}

impl<L> TokenParser<L> {
    fn peek(&self) -> Option<&ExprToken<L>> {
        self.tokens.get(self.position).and_then(Option::as_ref)
    }

    fn next(&mut self) -> Option<ExprToken<L>> {
        let token = self.tokens.get_mut(self.position).and_then(Option::take);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<MatchExpr<L>, ExprError> {
        let mut operands = vec![self.parse_and()?];
        while matches!(self.peek(), Some(ExprToken::Or)) {
            self.next();
            operands.push(self.parse_and()?);
        }
        Ok(collapse(operands, MatchExpr::Or))
    }

    fn parse_and(&mut self) -> Result<MatchExpr<L>, ExprError> {
        let mut operands = vec![self.parse_unary()?];
        while matches!(self.peek(), Some(ExprToken::And)) {
            self.next();
            operands.push(self.parse_unary()?);
        }
        Ok(collapse(operands, MatchExpr::And))
    }

    fn parse_unary(&mut self) -> Result<MatchExpr<L>, ExprError> {
        if matches!(self.peek(), Some(ExprToken::Not)) {
            self.next();
            return Ok(MatchExpr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<MatchExpr<L>, ExprError> {
        let position = self.position;
        match self.next() {
            Some(ExprToken::Leaf(leaf)) => Ok(MatchExpr::Leaf(leaf)),
            Some(ExprToken::Open) => {
                let inner = self.parse_or()?;
                match self.next() {
                    Some(ExprToken::Close) => Ok(inner),
                    Some(other) => Err(ExprError::UnexpectedToken {
                        found: other.describe().to_string(),
                        position: self.position - 1,
                    }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(other) => Err(ExprError::UnexpectedToken {
                found: other.describe().to_string(),
                position,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

fn collapse<L>(
    mut operands: Vec<MatchExpr<L>>,
    wrap: fn(Vec<MatchExpr<L>>) -> MatchExpr<L>,
) -> MatchExpr<L> {
    if operands.len() == 1 {
        if let Some(single) = operands.pop() {
            return single;
        }
    }
    wrap(operands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &'static str) -> ExprToken<&'static str> {
        ExprToken::Leaf(name)
    }

    fn truth<'n>(names: &'n [&'n str]) -> impl FnMut(&&'static str) -> bool + 'n {
        move |l: &&'static str| names.contains(l)
    }

    // =========================================================================
    // Assembly Tests
    // =========================================================================

    #[test]
    fn test_single_leaf() {
        let expr = MatchExpr::from_tokens(vec![leaf("a")]).unwrap();
        assert_eq!(expr, MatchExpr::Leaf("a"));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        // a OR b AND c  ==  a OR (b AND c)
        let expr = MatchExpr::from_tokens(vec![
            leaf("a"),
            ExprToken::Or,
            leaf("b"),
            ExprToken::And,
            leaf("c"),
        ])
        .unwrap();
        assert_eq!(
            expr,
            MatchExpr::Or(vec![
                MatchExpr::Leaf("a"),
                MatchExpr::And(vec![MatchExpr::Leaf("b"), MatchExpr::Leaf("c")]),
            ])
        );
    }

    #[test]
    fn test_not_binds_tighter_than_and() {
        // NOT a AND b  ==  (NOT a) AND b
        let expr =
            MatchExpr::from_tokens(vec![ExprToken::Not, leaf("a"), ExprToken::And, leaf("b")])
                .unwrap();
        assert_eq!(
            expr,
            MatchExpr::And(vec![
                MatchExpr::Not(Box::new(MatchExpr::Leaf("a"))),
                MatchExpr::Leaf("b"),
            ])
        );
    }

    #[test]
    fn test_parentheses_group() {
        let expr = MatchExpr::from_tokens(vec![
            ExprToken::Not,
            ExprToken::Open,
            leaf("a"),
            ExprToken::Or,
            leaf("b"),
            ExprToken::Close,
        ])
        .unwrap();
        assert_eq!(
            expr,
            MatchExpr::not(MatchExpr::Or(vec![MatchExpr::Leaf("a"), MatchExpr::Leaf("b")]))
        );
    }

    #[test]
    fn test_source_accepts_tokens_or_tree() {
        let tokens: ExprSource<String> =
            serde_json::from_str(r#"[{"leaf": "a"}, "or", "not", {"leaf": "b"}, "and", {"leaf": "c"}]"#)
                .unwrap();
        let expected = MatchExpr::Or(vec![
            MatchExpr::Leaf("a".to_string()),
            MatchExpr::And(vec![
                MatchExpr::not(MatchExpr::Leaf("b".to_string())),
                MatchExpr::Leaf("c".to_string()),
            ]),
        ]);
        assert_eq!(tokens.build(), Ok(expected.clone()));

        let tree: ExprSource<String> =
            serde_json::from_str(&serde_json::to_string(&expected).unwrap()).unwrap();
        assert_eq!(tree.build(), Ok(expected));

        let dangling: ExprSource<String> = serde_json::from_str(r#"[{"leaf": "a"}, "and"]"#).unwrap();
        assert_eq!(dangling.build(), Err(ExprError::UnexpectedEnd));
    }

    #[test]
    fn test_empty_is_error() {
        let result = MatchExpr::<&str>::from_tokens(vec![]);
        assert_eq!(result, Err(ExprError::EmptyExpression));
    }

    #[test]
    fn test_adjacent_leaves_are_error() {
        let result = MatchExpr::from_tokens(vec![leaf("a"), leaf("b")]);
        assert!(matches!(
            result,
            Err(ExprError::UnexpectedToken { position: 1, .. })
        ));
    }

    #[test]
    fn test_dangling_operator_is_error() {
        let result = MatchExpr::from_tokens(vec![leaf("a"), ExprToken::And]);
        assert_eq!(result, Err(ExprError::UnexpectedEnd));
    }

    #[test]
    fn test_unclosed_parenthesis_is_error() {
        let result = MatchExpr::from_tokens(vec![ExprToken::Open, leaf("a")]);
        assert_eq!(result, Err(ExprError::UnexpectedEnd));
    }

    // =========================================================================
    // Evaluation Tests
    // =========================================================================

    #[test]
    fn test_evaluate_and_or_not() {
        let expr = MatchExpr::Or(vec![
            MatchExpr::Leaf("a"),
            MatchExpr::And(vec![
                MatchExpr::Leaf("b"),
                MatchExpr::not(MatchExpr::Leaf("c")),
            ]),
        ]);
        assert!(expr.evaluate(&mut truth(&["a"])));
        assert!(expr.evaluate(&mut truth(&["b"])));
        assert!(!expr.evaluate(&mut truth(&["b", "c"])));
        assert!(!expr.evaluate(&mut truth(&[])));
    }

    #[test]
    fn test_evaluate_short_circuits() {
        let expr = MatchExpr::And(vec![MatchExpr::Leaf("a"), MatchExpr::Leaf("b")]);
        let mut asked = Vec::new();
        let result = expr.evaluate(&mut |l: &&'static str| {
            asked.push(*l);
            false
        });
        assert!(!result);
        assert_eq!(asked, vec!["a"]);
    }

    #[test]
    fn test_leaves_in_order() {
        let expr = MatchExpr::And(vec![
            MatchExpr::Leaf("x"),
            MatchExpr::not(MatchExpr::Or(vec![MatchExpr::Leaf("y"), MatchExpr::Leaf("z")])),
        ]);
        assert_eq!(expr.leaves(), vec![&"x", &"y", &"z"]);
    }

    #[test]
    fn test_serde_shape() {
        let expr: MatchExpr<String> =
            serde_json::from_str(r#"{"and": [{"leaf": "a"}, {"not": {"leaf": "b"}}]}"#).unwrap();
        assert_eq!(
            expr,
            MatchExpr::And(vec![
                MatchExpr::Leaf("a".to_string()),
                MatchExpr::not(MatchExpr::Leaf("b".to_string())),
            ])
        );
    }
}
