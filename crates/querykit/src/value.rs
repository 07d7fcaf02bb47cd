//! Scalar values bound to query parameters.
//!
//! [`QueryValue`] is a closed set of scalars (plus homogeneous lists for
//! `IN` / `NOT IN`), so list-arity operators and no-value operators stay
//! statically distinguishable instead of relying on an open dynamic type.
//! It implements [`ToSql`] by delegation, letting callers hand a built query
//! straight to a tokio-postgres style driver.

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A bound query parameter value.
///
/// Deserialization is untagged: JSON `null` / booleans / numbers / strings /
/// arrays map to the obvious variants. JSON strings always become `Text`
/// (never `Timestamp`); the timestamp variant exists for the typed Rust API,
/// where the original system passes dates through to the driver.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// SQL NULL
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// Double-precision float
    Float(f64),
    /// Text
    Text(String),
    /// List of scalars, only meaningful for IN / NOT IN
    List(Vec<QueryValue>),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
}

impl QueryValue {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryValue::Null => "null",
            QueryValue::Bool(_) => "bool",
            QueryValue::Int(_) => "int",
            QueryValue::Float(_) => "float",
            QueryValue::Text(_) => "text",
            QueryValue::List(_) => "list",
            QueryValue::Timestamp(_) => "timestamp",
        }
    }

    /// Borrow the list elements, if this is a list.
    pub fn as_list(&self) -> Option<&[QueryValue]> {
        match self {
            QueryValue::List(values) => Some(values),
            _ => None,
        }
    }

    /// Borrow the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            QueryValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        QueryValue::Int(v as i64)
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Text(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Text(v)
    }
}

impl From<DateTime<Utc>> for QueryValue {
    fn from(v: DateTime<Utc>) -> Self {
        QueryValue::Timestamp(v)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => QueryValue::Null,
        }
    }
}

impl ToSql for QueryValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            QueryValue::Null => Ok(IsNull::Yes),
            QueryValue::Bool(v) => v.to_sql(ty, out),
            QueryValue::Int(v) => v.to_sql(ty, out),
            QueryValue::Float(v) => v.to_sql(ty, out),
            QueryValue::Text(v) => v.to_sql(ty, out),
            QueryValue::Timestamp(v) => v.to_sql(ty, out),
            QueryValue::List(_) => {
                Err("a list value cannot be bound to a single placeholder".into())
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The concrete variant decides at bind time.
        true
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_scalars() {
        assert_eq!(QueryValue::from(true), QueryValue::Bool(true));
        assert_eq!(QueryValue::from(7i32), QueryValue::Int(7));
        assert_eq!(QueryValue::from(7i64), QueryValue::Int(7));
        assert_eq!(QueryValue::from(1.5f64), QueryValue::Float(1.5));
        assert_eq!(QueryValue::from("a"), QueryValue::Text("a".to_string()));
    }

    #[test]
    fn from_vec_builds_list() {
        let value = QueryValue::from(vec!["admin", "user"]);
        assert_eq!(
            value,
            QueryValue::List(vec![
                QueryValue::Text("admin".to_string()),
                QueryValue::Text("user".to_string()),
            ])
        );
    }

    #[test]
    fn from_option() {
        assert_eq!(QueryValue::from(None::<i64>), QueryValue::Null);
        assert_eq!(QueryValue::from(Some(3i64)), QueryValue::Int(3));
    }

    #[test]
    fn deserialize_untagged() {
        let values: Vec<QueryValue> =
            serde_json::from_str(r#"[null, true, 2, 2.5, "x", [1, 2]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                QueryValue::Null,
                QueryValue::Bool(true),
                QueryValue::Int(2),
                QueryValue::Float(2.5),
                QueryValue::Text("x".to_string()),
                QueryValue::List(vec![QueryValue::Int(1), QueryValue::Int(2)]),
            ]
        );
    }

    #[test]
    fn date_like_strings_stay_text() {
        let value: QueryValue = serde_json::from_str(r#""2024-01-01T00:00:00Z""#).unwrap();
        assert_eq!(value, QueryValue::Text("2024-01-01T00:00:00Z".to_string()));
    }
}
