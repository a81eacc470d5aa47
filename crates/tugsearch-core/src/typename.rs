//! Type-name text handling.
//!
//! Declared types arrive as source text (`List<? extends T>[]`, `String...`,
//! `T extends Comparable<T>`). Resolution works on names, so this module
//! turns that text into the pieces the resolvers compare: the base name,
//! the array dimensions, the generic argument text, and the erasure of
//! method-level type parameters.
//!
//! Structured rewriting (`resolve_generic_types`) goes through a small
//! winnow grammar:
//!
//! ```text
//! <type>      := <qname> [<args>] ("[" "]")* ["..."]
//! <qname>     := ident ("." ident)*
//! <args>      := "<" ">" | "<" <arg> ("," <arg>)* ">"
//! <arg>       := "?" [("extends" | "super") <type>] | <type>
//! ```
//!
//! The plain text helpers are total: text that does not parse is handled
//! by bracket counting, and the rewriting helpers return their input
//! unchanged.

use std::fmt;

use thiserror::Error;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, opt, repeat};
use winnow::prelude::*;
use winnow::token::take_while;
use winnow::ModalResult;

/// The erasure of an unbounded type variable.
pub const OBJECT: &str = "Object";

/// Error type for type-name parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeNameError {
    /// The text is not a type reference.
    #[error("invalid type reference '{text}': {message}")]
    InvalidTypeRef { text: String, message: String },
}

// ============================================================================
// Structured type references
// ============================================================================

/// A parsed type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Simple or dotted name, without generics or dimensions.
    pub name: String,
    /// Generic arguments in source order. Empty for raw types.
    pub arguments: Vec<TypeArgument>,
    /// Number of `[]` suffixes.
    pub dimensions: usize,
    /// Trailing `...`.
    pub varargs: bool,
}

/// One generic argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    Type(TypeRef),
    /// `?`, `? extends X` or `? super X`.
    Wildcard(Option<(WildcardBound, TypeRef)>),
}

/// The keyword bounding a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardBound {
    Extends,
    Super,
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.arguments.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        for _ in 0..self.dimensions {
            write!(f, "[]")?;
        }
        if self.varargs {
            write!(f, "...")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArgument::Type(t) => write!(f, "{}", t),
            TypeArgument::Wildcard(None) => write!(f, "?"),
            TypeArgument::Wildcard(Some((WildcardBound::Extends, t))) => {
                write!(f, "? extends {}", t)
            }
            TypeArgument::Wildcard(Some((WildcardBound::Super, t))) => write!(f, "? super {}", t),
        }
    }
}

/// Parse type-reference text.
///
/// # Example
///
/// ```
/// use tugsearch_core::typename::parse_type_ref;
///
/// let t = parse_type_ref("Map<String, List<? extends T>>[]").unwrap();
/// assert_eq!(t.name, "Map");
/// assert_eq!(t.arguments.len(), 2);
/// assert_eq!(t.dimensions, 1);
/// ```
pub fn parse_type_ref(text: &str) -> Result<TypeRef, TypeNameError> {
    type_ref
        .parse(text)
        .map_err(|e| TypeNameError::InvalidTypeRef {
            text: text.to_string(),
            message: format!("{:?}", e),
        })
}

fn type_ref(input: &mut &str) -> ModalResult<TypeRef> {
    let _ = multispace0.parse_next(input)?;
    let name = qualified_name(input)?;
    let _ = multispace0.parse_next(input)?;
    let arguments = opt(type_arguments).parse_next(input)?.unwrap_or_default();
    let dims: Vec<()> =
        repeat(0.., (multispace0, '[', multispace0, ']').void()).parse_next(input)?;
    let varargs = opt((multispace0, "...")).parse_next(input)?.is_some();
    let _ = multispace0.parse_next(input)?;
    Ok(TypeRef {
        name,
        arguments,
        dimensions: dims.len(),
        varargs,
    })
}

fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '$').parse_next(input)
}

fn qualified_name(input: &mut &str) -> ModalResult<String> {
    let mut name = identifier(input)?.to_string();
    // A lone '.' continues the name; "..." is varargs.
    while input.starts_with('.') && !input.starts_with("...") {
        *input = &input[1..];
        let segment = identifier(input)?;
        name.push('.');
        name.push_str(segment);
    }
    Ok(name)
}

fn type_arguments(input: &mut &str) -> ModalResult<Vec<TypeArgument>> {
    '<'.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    if input.starts_with('>') {
        *input = &input[1..];
        return Ok(Vec::new());
    }
    let mut arguments = vec![type_argument(input)?];
    loop {
        let _ = multispace0.parse_next(input)?;
        if !input.starts_with(',') {
            break;
        }
        *input = &input[1..];
        arguments.push(type_argument(input)?);
    }
    let _ = multispace0.parse_next(input)?;
    '>'.parse_next(input)?;
    Ok(arguments)
}

fn type_argument(input: &mut &str) -> ModalResult<TypeArgument> {
    let _ = multispace0.parse_next(input)?;
    if !input.starts_with('?') {
        return type_ref.map(TypeArgument::Type).parse_next(input);
    }
    *input = &input[1..];
    let _ = multispace0.parse_next(input)?;
    let bound = opt(alt((
        "extends".value(WildcardBound::Extends),
        "super".value(WildcardBound::Super),
    )))
    .parse_next(input)?;
    match bound {
        Some(bound) => {
            let bounded = type_ref(input)?;
            Ok(TypeArgument::Wildcard(Some((bound, bounded))))
        }
        None => Ok(TypeArgument::Wildcard(None)),
    }
}

// ============================================================================
// Text helpers
// ============================================================================

/// Remove every `<...>` group, keeping array and varargs suffixes.
///
/// `String<String>[]` becomes `String[]`.
pub fn remove_generic_argument(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// The text inside the outermost generic brackets, or `""`.
///
/// `Map<String, List<T>>[]` yields `String, List<T>`.
pub fn extract_generic_argument(text: &str) -> String {
    let Some(open) = text.find('<') else {
        return String::new();
    };
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return text[open + 1..open + i].trim().to_string();
                }
            }
            _ => {}
        }
    }
    text[open + 1..].trim().to_string()
}

/// Rewrite a trailing `...` as `[]`.
pub fn normalize_varargs(text: &str) -> String {
    let trimmed = text.trim_end();
    match trimmed.strip_suffix("...") {
        Some(head) => format!("{}[]", head.trim_end()),
        None => trimmed.to_string(),
    }
}

/// Array dimensions of a type text, counting `...` as one.
pub fn dimensions(text: &str) -> usize {
    let mut rest = remove_generic_argument(&normalize_varargs(text));
    let mut count = 0;
    loop {
        let trimmed = rest.trim_end();
        match trimmed.strip_suffix(']') {
            Some(head) => match head.trim_end().strip_suffix('[') {
                Some(head) => {
                    count += 1;
                    rest = head.to_string();
                }
                None => return count,
            },
            None => return count,
        }
    }
}

/// The bare name of a type text: no generics, no dimensions, no varargs.
pub fn base_name(text: &str) -> String {
    let mut rest = remove_generic_argument(&normalize_varargs(text));
    while let Some(head) = rest.trim_end().strip_suffix("[]") {
        rest = head.to_string();
    }
    rest.trim().to_string()
}

/// The identifier a type parameter declares: `T extends String` is `T`.
pub fn type_parameter_identifier(parameter: &str) -> &str {
    parameter.split_whitespace().next().unwrap_or("")
}

/// The erasure of a type parameter declaration.
///
/// `T extends String` erases to `String`, `T super Object` to `Object`,
/// and an unbounded `T` to `Object`. Intersection bounds erase to their
/// first member.
pub fn erase_bounds(parameter: &str) -> String {
    let trimmed = parameter.trim();
    let rest = trimmed[type_parameter_identifier(trimmed).len()..].trim_start();
    let bound = rest
        .strip_prefix("extends")
        .or_else(|| rest.strip_prefix("super"))
        .map(str::trim);
    match bound {
        Some(bound) if !bound.is_empty() => first_intersection_member(bound).to_string(),
        _ => OBJECT.to_string(),
    }
}

fn first_intersection_member(bound: &str) -> &str {
    let mut depth = 0usize;
    for (i, c) in bound.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '&' if depth == 0 => return bound[..i].trim(),
            _ => {}
        }
    }
    bound.trim()
}

/// Replace wildcards by their bounds and type variables by their erasure.
///
/// `?` becomes `Object`, `? extends X` and `? super X` become `X`, and any
/// name declared in `type_parameters` is replaced by its erased bound (its
/// own generic arguments and dimensions are kept).
///
/// # Arguments
///
/// * `text` - The declared type text
/// * `type_parameters` - Type parameter declarations in scope, e.g. `T extends Apple`
///
/// # Returns
///
/// The rewritten text, or `text` unchanged when it does not parse.
pub fn resolve_generic_types(text: &str, type_parameters: &[String]) -> String {
    let Ok(mut parsed) = parse_type_ref(text) else {
        return text.to_string();
    };
    let erasures: Vec<(&str, String)> = type_parameters
        .iter()
        .map(|p| (type_parameter_identifier(p), erase_bounds(p)))
        .collect();
    substitute(&mut parsed, &erasures);
    parsed.to_string()
}

fn substitute(t: &mut TypeRef, erasures: &[(&str, String)]) {
    if let Some((_, erased)) = erasures.iter().find(|(id, _)| *id == t.name) {
        t.name = erased.clone();
    }
    for arg in &mut t.arguments {
        let replacement = match arg {
            TypeArgument::Type(inner) => {
                substitute(inner, erasures);
                None
            }
            TypeArgument::Wildcard(None) => Some(TypeRef {
                name: OBJECT.to_string(),
                arguments: Vec::new(),
                dimensions: 0,
                varargs: false,
            }),
            TypeArgument::Wildcard(Some((_, bounded))) => {
                let mut bounded = bounded.clone();
                substitute(&mut bounded, erasures);
                Some(bounded)
            }
        };
        if let Some(replacement) = replacement {
            *arg = TypeArgument::Type(replacement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // Parser
    // =========================================================================

    #[test]
    fn test_parse_simple() {
        let t = parse_type_ref("String").unwrap();
        assert_eq!(t.name, "String");
        assert!(t.arguments.is_empty());
        assert_eq!(t.dimensions, 0);
        assert!(!t.varargs);
    }

    #[test]
    fn test_parse_qualified_array_and_varargs() {
        let t = parse_type_ref("java.util.List<String>[][]").unwrap();
        assert_eq!(t.name, "java.util.List");
        assert_eq!(t.dimensions, 2);

        let t = parse_type_ref("String...").unwrap();
        assert_eq!(t.name, "String");
        assert!(t.varargs);
    }

    #[test]
    fn test_parse_wildcards() {
        let t = parse_type_ref("Map<?, ? super Number>").unwrap();
        assert_eq!(t.arguments[0], TypeArgument::Wildcard(None));
        assert!(matches!(
            &t.arguments[1],
            TypeArgument::Wildcard(Some((WildcardBound::Super, b))) if b.name == "Number"
        ));
    }

    #[test]
    fn test_parse_diamond() {
        let t = parse_type_ref("ArrayList<>").unwrap();
        assert_eq!(t.name, "ArrayList");
        assert!(t.arguments.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_type_ref("List<").is_err());
        assert!(parse_type_ref("").is_err());
    }

    #[test]
    fn test_display_round_trips_canonical_text() {
        let text = "Map<String, List<? extends T>>[]";
        assert_eq!(parse_type_ref(text).unwrap().to_string(), text);
    }

    // =========================================================================
    // Text helpers
    // =========================================================================

    #[test]
    fn test_remove_generic_argument() {
        assert_eq!(remove_generic_argument("String<String>[]"), "String[]");
        assert_eq!(
            remove_generic_argument("String<String extends T, E>..."),
            "String..."
        );
        assert_eq!(remove_generic_argument("int"), "int");
    }

    #[test]
    fn test_extract_generic_argument() {
        assert_eq!(extract_generic_argument("List<String>"), "String");
        assert_eq!(extract_generic_argument("Map<K, List<V>>[]"), "K, List<V>");
        assert_eq!(extract_generic_argument("String"), "");
    }

    #[test]
    fn test_dimensions_and_base_name() {
        assert_eq!(dimensions("int"), 0);
        assert_eq!(dimensions("int[][]"), 2);
        assert_eq!(dimensions("String..."), 1);
        assert_eq!(dimensions("List<int[]>[]"), 1);
        assert_eq!(base_name("List<String>[]"), "List");
        assert_eq!(base_name("String..."), "String");
        assert_eq!(base_name("a.b.C"), "a.b.C");
    }

    #[test]
    fn test_normalize_varargs() {
        assert_eq!(normalize_varargs("String..."), "String[]");
        assert_eq!(normalize_varargs("String[]"), "String[]");
    }

    #[test]
    fn test_type_parameter_identifier() {
        assert_eq!(type_parameter_identifier("T extends String"), "T");
        assert_eq!(type_parameter_identifier("T"), "T");
    }

    #[test]
    fn test_erase_bounds() {
        assert_eq!(erase_bounds("T extends String"), "String");
        assert_eq!(erase_bounds("T super Object"), "Object");
        assert_eq!(erase_bounds("T"), "Object");
        assert_eq!(
            erase_bounds("T extends Comparable<T> & Serializable"),
            "Comparable<T>"
        );
    }

    // =========================================================================
    // Generic resolution
    // =========================================================================

    #[test]
    fn test_resolve_wildcards_without_parameters() {
        assert_eq!(resolve_generic_types("List<? extends T>", &[]), "List<T>");
        assert_eq!(resolve_generic_types("List<? super Object>", &[]), "List<Object>");
        assert_eq!(
            resolve_generic_types("List<? super Object, ? extends T<? extends Object>>", &[]),
            "List<Object, T<Object>>"
        );
    }

    #[test]
    fn test_resolve_unbounded_parameter() {
        assert_eq!(resolve_generic_types("T", &params(&["T"])), "Object");
        assert_eq!(
            resolve_generic_types("List<? extends T>", &params(&["T"])),
            "List<Object>"
        );
        assert_eq!(
            resolve_generic_types("List<T, ? super String>", &params(&["T"])),
            "List<Object, String>"
        );
    }

    #[test]
    fn test_resolve_bounded_parameter() {
        assert_eq!(
            resolve_generic_types("List<T, ? super String>", &params(&["T extends Apple"])),
            "List<Apple, String>"
        );
        assert_eq!(
            resolve_generic_types(
                "List<? super Object, ? extends T<? extends Object>>",
                &params(&["T extends Apple"])
            ),
            "List<Object, Apple<Object>>"
        );
    }

    #[test]
    fn test_resolve_keeps_dimensions() {
        assert_eq!(
            resolve_generic_types("T[]", &params(&["T extends Number"])),
            "Number[]"
        );
        assert_eq!(resolve_generic_types("T...", &params(&["T"])), "Object...");
    }

    #[test]
    fn test_resolve_unparseable_is_unchanged() {
        assert_eq!(resolve_generic_types("List<", &[]), "List<");
    }
}
