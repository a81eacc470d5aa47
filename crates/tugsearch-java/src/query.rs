//! The query object.
//!
//! A query names a target descriptor, whether definitions or usages of the
//! target are wanted, an optional contains-clause over nested descriptors,
//! an optional from-domain, and an optional refactor directive. Queries
//! arrive already parsed, usually as JSON:
//!
//! ```json
//! {
//!   "search_type": "usage",
//!   "target": { "target": "method", "name": "bar", "parameter_count": 2 },
//!   "from": ["B"],
//!   "refactor": { "action": "rename", "new_name": "baz" }
//! }
//! ```
//!
//! Every descriptor attribute is a [`Lenient`]: absent means "any".

use serde::{Deserialize, Deserializer, Serialize};
use tugsearch_core::{ExprSource, Lenient, MatchExpr, SearchError};

use crate::ast::{CommentKind, ControlFlowKind, TypeKind, VariableKind, Visibility};
use crate::validation::validate_java_identifier;

/// Definitions of the target, or usages of it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[default]
    Definition,
    Usage,
}

// ============================================================================
// Descriptors
// ============================================================================

/// Matches type declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassDescriptor {
    pub name: Lenient<String>,
    pub kind: Lenient<TypeKind>,
    pub visibility: Lenient<Visibility>,
    pub is_static: Lenient<bool>,
    pub is_final: Lenient<bool>,
    pub is_abstract: Lenient<bool>,
    /// Superclass text as written.
    pub extends: Lenient<String>,
    /// One of the implemented interfaces, as written.
    pub implements: Lenient<String>,
}

/// Matches one parameter by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterDescriptor {
    pub type_name: Lenient<String>,
    pub name: Lenient<String>,
}

/// Matches methods and constructors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDescriptor {
    pub name: Lenient<String>,
    pub return_type: Lenient<String>,
    pub visibility: Lenient<Visibility>,
    pub is_static: Lenient<bool>,
    pub is_final: Lenient<bool>,
    pub is_abstract: Lenient<bool>,
    pub is_constructor: Lenient<bool>,
    pub parameter_count: Lenient<usize>,
    /// Positional parameter descriptors; also fixes the count.
    pub parameters: Lenient<Vec<ParameterDescriptor>>,
    /// One of the thrown types, as written.
    pub throws: Lenient<String>,
    /// Name of the declaring type.
    pub declared_in: Lenient<String>,
}

/// Matches fields, parameters and locals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableDescriptor {
    pub name: Lenient<String>,
    pub type_name: Lenient<String>,
    pub kind: Lenient<VariableKind>,
    pub visibility: Lenient<Visibility>,
    pub is_static: Lenient<bool>,
    pub is_final: Lenient<bool>,
}

/// Matches control-flow statements and `?:` expressions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlFlowDescriptor {
    pub kind: Lenient<ControlFlowKind>,
    /// The condition rendered as pseudocode.
    pub condition: Lenient<String>,
}

/// Matches comments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentDescriptor {
    pub kind: Lenient<CommentKind>,
    /// Comment text without delimiters, trimmed.
    pub content: Lenient<String>,
    pub javadoc: Lenient<bool>,
}

/// A query target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum Descriptor {
    Class(ClassDescriptor),
    Method(MethodDescriptor),
    Variable(VariableDescriptor),
    ControlFlow(ControlFlowDescriptor),
    Comment(CommentDescriptor),
}

impl Descriptor {
    /// Short name of the descriptor kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Descriptor::Class(_) => "class",
            Descriptor::Method(_) => "method",
            Descriptor::Variable(_) => "variable",
            Descriptor::ControlFlow(_) => "control_flow",
            Descriptor::Comment(_) => "comment",
        }
    }
}

/// A leaf of a contains-clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainsTarget {
    /// The subtree contains a declaration or site matching the descriptor.
    Definition(Descriptor),
    /// The subtree contains a call resolved to a matching method.
    Usage(MethodDescriptor),
}

// ============================================================================
// Refactor directives
// ============================================================================

/// A parameter of a changed signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParameter {
    pub type_name: String,
    pub name: String,
}

/// What to do with the refactor targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RefactorDirective {
    Rename { new_name: String },
    ChangeParameters { parameters: Vec<NewParameter> },
}

// ============================================================================
// Query
// ============================================================================

/// A parsed structural query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub search_type: SearchType,
    pub target: Descriptor,
    /// Either a built tree or a flat token list in source order.
    #[serde(default, deserialize_with = "deserialize_contains")]
    pub contains: Option<MatchExpr<ContainsTarget>>,
    /// File base names (no extension) usage results are shown for.
    /// Empty shows all.
    #[serde(default)]
    pub from: Vec<String>,
    #[serde(default)]
    pub refactor: Option<RefactorDirective>,
}

fn deserialize_contains<'de, D>(
    deserializer: D,
) -> Result<Option<MatchExpr<ContainsTarget>>, D::Error>
where
    D: Deserializer<'de>,
{
    let source: Option<ExprSource<ContainsTarget>> = Option::deserialize(deserializer)?;
    source
        .map(ExprSource::build)
        .transpose()
        .map_err(serde::de::Error::custom)
}

impl Query {
    /// A definition query.
    pub fn definitions(target: Descriptor) -> Self {
        Query {
            search_type: SearchType::Definition,
            target,
            contains: None,
            from: Vec::new(),
            refactor: None,
        }
    }

    /// A usage query for a method.
    pub fn usages(target: MethodDescriptor) -> Self {
        Query {
            search_type: SearchType::Usage,
            ..Self::definitions(Descriptor::Method(target))
        }
    }

    pub fn with_contains(mut self, contains: MatchExpr<ContainsTarget>) -> Self {
        self.contains = Some(contains);
        self
    }

    pub fn from_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.from = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_refactor(mut self, directive: RefactorDirective) -> Self {
        self.refactor = Some(directive);
        self
    }

    /// True if the from-domain admits a file base name.
    pub fn admits(&self, stem: &str) -> bool {
        self.from.is_empty() || self.from.iter().any(|f| f == stem)
    }

    /// Reject queries that cannot be answered or acted on.
    ///
    /// - usage queries need a method target
    /// - from-domain entries must be non-empty
    /// - rename needs a nameable target and a valid identifier
    /// - change-parameters needs a method target and valid parameter names
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.search_type == SearchType::Usage && !matches!(self.target, Descriptor::Method(_)) {
            return Err(SearchError::invalid_query(format!(
                "usage queries need a method target, got {}",
                self.target.kind_name()
            )));
        }
        if self.from.iter().any(|f| f.trim().is_empty()) {
            return Err(SearchError::invalid_query("empty file name in from-domain"));
        }
        match &self.refactor {
            None => {}
            Some(RefactorDirective::Rename { new_name }) => {
                if matches!(
                    self.target,
                    Descriptor::ControlFlow(_) | Descriptor::Comment(_)
                ) {
                    return Err(SearchError::invalid_query(format!(
                        "cannot rename a {} target",
                        self.target.kind_name()
                    )));
                }
                validate_java_identifier(new_name)?;
            }
            Some(RefactorDirective::ChangeParameters { parameters }) => {
                if !matches!(self.target, Descriptor::Method(_)) {
                    return Err(SearchError::invalid_query(format!(
                        "cannot change parameters of a {} target",
                        self.target.kind_name()
                    )));
                }
                for parameter in parameters {
                    validate_java_identifier(&parameter.name)?;
                    if parameter.type_name.trim().is_empty() {
                        return Err(SearchError::invalid_query(format!(
                            "parameter '{}' has no type",
                            parameter.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
