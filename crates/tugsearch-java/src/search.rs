//! Structural search over an analyzed code base.
//!
//! The searcher walks every file once per query and offers each
//! declaration, control-flow site and comment to the query's target
//! descriptor. A candidate that matches, and whose subtree satisfies the
//! contains-clause, is admitted.
//!
//! - **Definition** queries emit the admitted nodes themselves.
//! - **Usage** queries emit the recorded usages of each admitted method.
//!   The from-domain filters the displayed results only: every usage stays
//!   in the refactor-target list, after the method itself.
//!
//! # Contains-clauses
//!
//! Each leaf is answered by probing the candidate's subtree (the candidate
//! itself excluded) until the first hit. A definition leaf hits a node its
//! descriptor matches; a usage leaf hits a call whose resolved method the
//! descriptor matches.

use std::path::Path;

use tracing::{debug, info, info_span};
use tugsearch_core::{SearchError, SearchResult};

use crate::analysis::Analysis;
use crate::ast::{
    file_stem, walk_compilation_unit, walk_expression_children, walk_method_children,
    walk_statement_children, walk_type_children, walk_variable_children, Comment, Expr, FileId,
    MethodCall, MethodDeclaration, MethodId, Pseudocode, Stmt, TypeDeclaration,
    VariableDeclaration, VisitResult, Visitor,
};
use crate::matcher::Candidate;
use crate::query::{ContainsTarget, Query, SearchType};

// ============================================================================
// Targets
// ============================================================================

/// A node a search produced: a matchable node or a call site.
#[derive(Debug, Clone, Copy)]
pub enum TargetNode<'a> {
    Node(Candidate<'a>),
    Call(&'a MethodCall),
}

impl TargetNode<'_> {
    /// The node's own source line; `?:` expressions have none.
    pub fn line(&self) -> Option<u32> {
        match self {
            TargetNode::Node(candidate) => match candidate {
                Candidate::Type(decl) => Some(decl.line),
                Candidate::Method { decl, .. } => Some(decl.line),
                Candidate::Variable(decl) => Some(decl.line),
                Candidate::Statement(stmt) => Some(stmt.line()),
                Candidate::Conditional(_) => None,
                Candidate::Comment(comment) => Some(comment.line),
            },
            TargetNode::Call(call) => Some(call.line),
        }
    }

    /// One-line pseudocode.
    pub fn summary(&self) -> String {
        match self {
            TargetNode::Node(candidate) => match candidate {
                Candidate::Type(decl) => decl.summary(),
                Candidate::Method { decl, .. } => decl.summary(),
                Candidate::Variable(decl) => decl.summary(),
                Candidate::Statement(stmt) => stmt.summary(),
                Candidate::Conditional(expr) => expr.summary(),
                Candidate::Comment(comment) => comment.summary(),
            },
            TargetNode::Call(call) => call.summary(),
        }
    }

    /// The method declaration, if this is one.
    pub fn as_method(&self) -> Option<&MethodDeclaration> {
        match self {
            TargetNode::Node(Candidate::Method { decl, .. }) => Some(*decl),
            _ => None,
        }
    }
}

/// A live handle into the analyzed AST for the refactor executor.
#[derive(Debug, Clone, Copy)]
pub struct RefactorTarget<'a> {
    pub file: FileId,
    pub path: &'a Path,
    pub node: TargetNode<'a>,
}

/// Results to display plus the refactor targets behind them.
#[derive(Debug, Default)]
pub struct SearchOutcome<'a> {
    pub results: Vec<SearchResult>,
    pub targets: Vec<RefactorTarget<'a>>,
}

// ============================================================================
// Site walker
// ============================================================================

/// Offers every matchable node and call below where it starts.
struct SiteWalker<'a, F> {
    /// Enclosing types, innermost last.
    owners: Vec<&'a TypeDeclaration>,
    /// Line of the last node that had one.
    line: u32,
    halted: bool,
    on_site: F,
}

impl<'a, F> SiteWalker<'a, F>
where
    F: FnMut(TargetNode<'a>, u32) -> VisitResult,
{
    fn new(on_site: F) -> Self {
        SiteWalker {
            owners: Vec::new(),
            line: 0,
            halted: false,
            on_site,
        }
    }

    fn offer(&mut self, node: TargetNode<'a>) -> VisitResult {
        if self.halted {
            return VisitResult::Stop;
        }
        if let Some(line) = node.line().filter(|l| *l > 0) {
            self.line = line;
        }
        let result = (self.on_site)(node, self.line);
        if result == VisitResult::Stop {
            self.halted = true;
        }
        result
    }
}

impl<'a, F> Visitor<'a> for SiteWalker<'a, F>
where
    F: FnMut(TargetNode<'a>, u32) -> VisitResult,
{
    fn visit_type(&mut self, decl: &'a TypeDeclaration) -> VisitResult {
        if self.offer(TargetNode::Node(Candidate::Type(decl))) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        self.owners.push(decl);
        VisitResult::Continue
    }

    fn leave_type(&mut self, _decl: &'a TypeDeclaration) {
        self.owners.pop();
    }

    fn visit_method(&mut self, decl: &'a MethodDeclaration, constructor: bool) -> VisitResult {
        match self.owners.last().copied() {
            Some(owner) => self.offer(TargetNode::Node(Candidate::Method {
                decl,
                constructor,
                owner,
            })),
            None if self.halted => VisitResult::Stop,
            None => VisitResult::Continue,
        }
    }

    fn visit_variable(&mut self, decl: &'a VariableDeclaration) -> VisitResult {
        self.offer(TargetNode::Node(Candidate::Variable(decl)))
    }

    fn visit_comment(&mut self, comment: &'a Comment) {
        self.offer(TargetNode::Node(Candidate::Comment(comment)));
    }

    fn visit_statement(&mut self, stmt: &'a Stmt) -> VisitResult {
        if stmt.control_flow_kind().is_some() {
            return self.offer(TargetNode::Node(Candidate::Statement(stmt)));
        }
        if stmt.line() > 0 {
            self.line = stmt.line();
        }
        if self.halted {
            VisitResult::Stop
        } else {
            VisitResult::Continue
        }
    }

    fn visit_expression(&mut self, expr: &'a Expr) -> VisitResult {
        match expr {
            Expr::Conditional { .. } => self.offer(TargetNode::Node(Candidate::Conditional(expr))),
            _ if self.halted => VisitResult::Stop,
            _ => VisitResult::Continue,
        }
    }

    fn visit_method_call(&mut self, call: &'a MethodCall) -> VisitResult {
        self.offer(TargetNode::Call(call))
    }
}

// ============================================================================
// Searcher
// ============================================================================

/// Answers queries against one analysis.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'s, 'a> {
    analysis: &'s Analysis<'a>,
}

impl<'s, 'a> Searcher<'s, 'a> {
    pub fn new(analysis: &'s Analysis<'a>) -> Self {
        Searcher { analysis }
    }

    /// Run a query.
    ///
    /// # Returns
    ///
    /// Results in file order, then source order. Usage results of one
    /// method follow call-site order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails [`Query::validate`].
    pub fn search(&self, query: &Query) -> Result<SearchOutcome<'a>, SearchError> {
        query.validate()?;
        let _span = info_span!(
            "search",
            target = query.target.kind_name(),
            search_type = ?query.search_type
        )
        .entered();

        let mut outcome = SearchOutcome::default();
        for (file, unit) in self.analysis.code().units() {
            let path = self.analysis.index().path(file);
            let mut walker = SiteWalker::new(|node: TargetNode<'a>, line: u32| {
                if let TargetNode::Node(candidate) = node {
                    if self.admits(query, &candidate) {
                        self.emit(query, file, path, candidate, line, &mut outcome);
                    }
                }
                VisitResult::Continue
            });
            walk_compilation_unit(&mut walker, file, unit);
        }

        info!(
            results = outcome.results.len(),
            targets = outcome.targets.len(),
            "search complete"
        );
        Ok(outcome)
    }

    fn admits(&self, query: &Query, candidate: &Candidate<'a>) -> bool {
        if !query.target.matches(candidate) {
            return false;
        }
        match &query.contains {
            None => true,
            Some(contains) => contains.evaluate(&mut |leaf| self.subtree_contains(candidate, leaf)),
        }
    }

    /// Search below `candidate` for a node satisfying `leaf`.
    fn subtree_contains(&self, candidate: &Candidate<'a>, leaf: &ContainsTarget) -> bool {
        let mut walker = SiteWalker::new(|node: TargetNode<'a>, _line: u32| {
            if self.leaf_hit(leaf, &node) {
                VisitResult::Stop
            } else {
                VisitResult::Continue
            }
        });
        match *candidate {
            Candidate::Type(decl) => {
                walker.owners.push(decl);
                walk_type_children(&mut walker, decl);
            }
            Candidate::Method { decl, .. } => {
                walk_method_children(&mut walker, decl);
            }
            Candidate::Variable(decl) => {
                walk_variable_children(&mut walker, decl);
            }
            Candidate::Statement(stmt) => {
                walk_statement_children(&mut walker, stmt);
            }
            Candidate::Conditional(expr) => {
                walk_expression_children(&mut walker, expr);
            }
            Candidate::Comment(_) => {}
        }
        walker.halted
    }

    fn leaf_hit(&self, leaf: &ContainsTarget, node: &TargetNode<'a>) -> bool {
        match (leaf, node) {
            (ContainsTarget::Definition(descriptor), TargetNode::Node(candidate)) => {
                descriptor.matches(candidate)
            }
            (ContainsTarget::Usage(descriptor), TargetNode::Call(call)) => {
                let index = self.analysis.index();
                let Some(method) = self
                    .analysis
                    .usages()
                    .target(call.id)
                    .and_then(|m| index.method(m))
                else {
                    return false;
                };
                index
                    .type_entry(method.owner)
                    .is_some_and(|owner| descriptor.matches(method.decl, method.constructor, owner.decl))
            }
            _ => false,
        }
    }

    fn emit(
        &self,
        query: &Query,
        file: FileId,
        path: &'a Path,
        candidate: Candidate<'a>,
        line: u32,
        outcome: &mut SearchOutcome<'a>,
    ) {
        let node = TargetNode::Node(candidate);
        match query.search_type {
            SearchType::Definition => {
                outcome.results.push(SearchResult::new(
                    path.display().to_string(),
                    node.line().unwrap_or(line),
                    node.summary(),
                ));
                outcome.targets.push(RefactorTarget { file, path, node });
            }
            SearchType::Usage => {
                let Candidate::Method { decl, .. } = candidate else {
                    return;
                };
                outcome.targets.push(RefactorTarget { file, path, node });
                self.emit_usages(query, decl.id, outcome);
            }
        }
    }

    fn emit_usages(&self, query: &Query, method: MethodId, outcome: &mut SearchOutcome<'a>) {
        let index = self.analysis.index();
        let mut hidden = 0usize;
        for call in self.analysis.usages().usages(method) {
            let Some(entry) = index.call(*call) else {
                continue;
            };
            let path = index.path(entry.file);
            let node = TargetNode::Call(entry.call);
            if query.admits(file_stem(path)) {
                outcome.results.push(SearchResult::new(
                    path.display().to_string(),
                    entry.call.line,
                    node.summary(),
                ));
            } else {
                hidden += 1;
            }
            outcome.targets.push(RefactorTarget {
                file: entry.file,
                path,
                node,
            });
        }
        if hidden > 0 {
            debug!(method = %method, hidden, "usages outside the from-domain");
        }
    }
}
