//! Error types for querykit

use thiserror::Error;

/// Result type alias for query building operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Validation failures raised while describing or building a query.
///
/// Every variant is a synchronous caller error: none are retryable and none
/// are recovered internally. Errors are `Clone` so a builder can record the
/// first offending setter call and report it from `build()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Identifier slot received a non-string value
    #[error("identifier must be a string, got {0}")]
    InvalidIdentifierType(String),

    /// Identifier was the empty string
    #[error("identifier cannot be empty")]
    EmptyIdentifier,

    /// Identifier had no valid characters left after sanitization
    #[error("identifier '{0}' contains no valid characters")]
    InvalidIdentifierAfterSanitization(String),

    /// One part of a dotted identifier sanitized to nothing
    #[error("identifier '{0}' has a part with no valid characters")]
    InvalidIdentifierPart(String),

    /// SELECT field failed identifier validation
    #[error("invalid field name '{0}'")]
    InvalidFieldName(String),

    /// FROM or JOIN table failed identifier validation
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    /// `build()` called with no SELECT fields
    #[error("at least one SELECT field is required")]
    SelectFieldsRequired,

    /// `build()` called with no FROM table
    #[error("a FROM table is required")]
    FromTableRequired,

    /// HAVING conditions present without any GROUP BY fields
    #[error("HAVING requires GROUP BY")]
    HavingRequiresGroupBy,

    /// Condition with an empty field name
    #[error("condition is missing a field name")]
    MissingFieldName,

    /// Operator name not in the supported set
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),

    /// IN / NOT IN condition whose value is not a list
    #[error("IN/NOT IN on '{0}' requires a list value")]
    InvalidInValue(String),

    /// Query description could not be deserialized
    #[error("malformed query description: {0}")]
    MalformedRequest(String),
}

impl QueryError {
    /// Check if this is an identifier validation error.
    pub fn is_identifier_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifierType(_)
                | Self::EmptyIdentifier
                | Self::InvalidIdentifierAfterSanitization(_)
                | Self::InvalidIdentifierPart(_)
                | Self::InvalidFieldName(_)
                | Self::InvalidTableName(_)
        )
    }
}
