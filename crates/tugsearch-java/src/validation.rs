//! Java identifier validation.
//!
//! Refactor directives carry new names; these are checked before any
//! target is touched.

use tugsearch_core::SearchError;

/// Reserved words and literals that cannot be used as identifiers.
pub const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while", "_",
];

/// Check if a name is reserved.
pub fn is_java_keyword(name: &str) -> bool {
    JAVA_KEYWORDS.contains(&name)
}

/// Validate that a string is a Java identifier.
///
/// Checks:
/// - Non-empty
/// - Starts with a letter, `_` or `$`
/// - Contains only alphanumerics, `_` and `$`
/// - Not a reserved word
///
/// # Examples
///
/// ```
/// use tugsearch_java::validation::validate_java_identifier;
///
/// assert!(validate_java_identifier("foo").is_ok());
/// assert!(validate_java_identifier("$tmp").is_ok());
/// assert!(validate_java_identifier("").is_err());
/// assert!(validate_java_identifier("1st").is_err());
/// assert!(validate_java_identifier("class").is_err());
/// ```
pub fn validate_java_identifier(name: &str) -> Result<(), SearchError> {
    let invalid = |reason: String| SearchError::InvalidIdentifier {
        name: name.to_string(),
        reason,
    };

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(invalid("name cannot be empty".to_string()));
    };
    if !first.is_alphabetic() && first != '_' && first != '$' {
        return Err(invalid("must start with a letter, '_' or '$'".to_string()));
    }
    if let Some(ch) = chars.find(|ch| !ch.is_alphanumeric() && *ch != '_' && *ch != '$') {
        return Err(invalid(format!("invalid character: '{}'", ch)));
    }
    if is_java_keyword(name) {
        return Err(invalid("cannot use a reserved word as identifier".to_string()));
    }
    Ok(())
}
