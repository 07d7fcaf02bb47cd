//! Safe SQL identifier handling.
//!
//! This module provides [`Ident`] which represents a table or column name,
//! supporting dotted `table.column` notation.
//!
//! Each dotted part is stripped of every character outside `[A-Za-z0-9_]`
//! and rendered double quoted, so the rendered form can never break out of
//! its quoting. A part that sanitizes to nothing is rejected.
//!
//! # Example
//! ```
//! use querykit::escape_identifier;
//!
//! assert_eq!(escape_identifier("users.id")?, r#""users"."id""#);
//! # Ok::<(), querykit::QueryError>(())
//! ```

use crate::error::{QueryError, QueryResult};
use crate::value::QueryValue;

/// A sanitized SQL identifier (table or column name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Parse and sanitize an identifier, supporting the dotted form.
    ///
    /// - `users` -> `"users"`
    /// - `users.id` -> `"users"."id"`
    pub fn parse(raw: &str) -> QueryResult<Self> {
        if raw.is_empty() {
            return Err(QueryError::EmptyIdentifier);
        }

        let pieces: Vec<&str> = raw.split('.').collect();
        let dotted = pieces.len() > 1;
        let mut parts = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let clean: String = piece
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            if clean.is_empty() {
                return Err(if dotted {
                    QueryError::InvalidIdentifierPart(raw.to_string())
                } else {
                    QueryError::InvalidIdentifierAfterSanitization(raw.to_string())
                });
            }
            parts.push(clean);
        }

        Ok(Self { parts })
    }

    /// Render the identifier as SQL: `"part"` or `"part1"."part2"`.
    pub fn to_sql(&self) -> String {
        let mut cap = self.parts.len().saturating_sub(1); // dots
        for part in &self.parts {
            cap += part.len() + 2; // surrounding quotes
        }
        let mut out = String::with_capacity(cap);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push('"');
            out.push_str(part);
            out.push('"');
        }
    }
}

/// Heuristic separating raw SQL expressions from plain identifiers.
///
/// A field containing `(`, whitespace, or an `AS` alias (and the bare `*`)
/// bypasses identifier escaping and is inserted verbatim. This is a
/// documented trust boundary: expression fields must come from trusted code
/// paths, never from end-user input. Values always flow through parameters.
pub(crate) fn is_expression(field: &str) -> bool {
    field == "*"
        || field.contains('(')
        || field.chars().any(char::is_whitespace)
        || field.to_ascii_uppercase().contains(" AS ")
}

/// Convert an input into an [`Ident`].
///
/// This is mainly for ergonomics in builder APIs. The [`QueryValue`]
/// implementation is the runtime type check for identifier slots in
/// untrusted query descriptions: anything but text fails.
pub trait IntoIdent {
    fn into_ident(self) -> QueryResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> QueryResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> QueryResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> QueryResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> QueryResult<Ident> {
        Ident::parse(&self)
    }
}

impl IntoIdent for &QueryValue {
    fn into_ident(self) -> QueryResult<Ident> {
        match self {
            QueryValue::Text(s) => Ident::parse(s),
            other => Err(QueryError::InvalidIdentifierType(other.kind().to_string())),
        }
    }
}

/// Validate and quote an identifier in one call.
pub fn escape_identifier<I: IntoIdent>(raw: I) -> QueryResult<String> {
    Ok(raw.into_ident()?.to_sql())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        assert_eq!(escape_identifier("valid_column").unwrap(), r#""valid_column""#);
    }

    #[test]
    fn ident_dotted() {
        assert_eq!(escape_identifier("users.id").unwrap(), r#""users"."id""#);
    }

    #[test]
    fn ident_strips_unsafe_characters() {
        assert_eq!(escape_identifier(r#"na"me;--"#).unwrap(), r#""name""#);
    }

    #[test]
    fn ident_rejects_empty() {
        assert_eq!(escape_identifier(""), Err(QueryError::EmptyIdentifier));
    }

    #[test]
    fn ident_rejects_fully_stripped() {
        assert_eq!(
            escape_identifier("!!!@@@###"),
            Err(QueryError::InvalidIdentifierAfterSanitization(
                "!!!@@@###".to_string()
            ))
        );
    }

    #[test]
    fn ident_rejects_stripped_part() {
        assert_eq!(
            escape_identifier("valid.!!!"),
            Err(QueryError::InvalidIdentifierPart("valid.!!!".to_string()))
        );
    }

    #[test]
    fn ident_rejects_non_text_value() {
        let value = QueryValue::Int(1);
        assert_eq!(
            escape_identifier(&value),
            Err(QueryError::InvalidIdentifierType("int".to_string()))
        );
    }

    #[test]
    fn text_value_parses_as_identifier() {
        let value = QueryValue::Text("users".to_string());
        assert_eq!(escape_identifier(&value).unwrap(), r#""users""#);
    }

    #[test]
    fn expression_heuristic() {
        assert!(is_expression("*"));
        assert!(is_expression("COUNT(*)"));
        assert!(is_expression("price * quantity"));
        assert!(is_expression("total AS t"));
        assert!(!is_expression("class"));
        assert!(!is_expression("users.id"));
    }
}
