//! Filter condition types and the WHERE/HAVING clause compiler.
//!
//! A [`WhereCondition`] is one predicate of an accumulating clause:
//! `{ field, operator, value, logic }`. The `logic` connector is placed
//! *before* the condition when joining into the predicate string; the first
//! condition's logic is ignored.
//!
//! Placeholder numbering continues from the shared parameter list, so WHERE
//! and HAVING compiled against the same list stay strictly increasing and
//! contiguous with no global mutable counter.

use crate::error::{QueryError, QueryResult};
use crate::ident::{Ident, is_expression};
use crate::value::QueryValue;
use serde::Deserialize;
use std::str::FromStr;

/// Comparison operator for WHERE/HAVING conditions.
///
/// Closed set: unknown operator names in a query description fail with
/// [`QueryError::UnsupportedOperator`] at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum CondOp {
    /// `field = $n`
    Eq,
    /// `field != $n`
    Ne,
    /// `field > $n`
    Gt,
    /// `field >= $n`
    Gte,
    /// `field < $n`
    Lt,
    /// `field <= $n`
    Lte,
    /// `field IN ($n, ...)`, one placeholder per list element
    In,
    /// `field NOT IN ($n, ...)`
    NotIn,
    /// `field LIKE $n`
    Like,
    /// `field ILIKE $n` (case-insensitive)
    Ilike,
    /// `field IS NULL`, no placeholder
    IsNull,
    /// `field IS NOT NULL`, no placeholder
    IsNotNull,
    /// `(field IS NULL OR field = '')`, no placeholder
    IsEmpty,
    /// `(field IS NOT NULL AND field != '')`, no placeholder
    IsNotEmpty,
}

impl CondOp {
    /// Wire name as it appears in query descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            CondOp::Eq => "eq",
            CondOp::Ne => "ne",
            CondOp::Gt => "gt",
            CondOp::Gte => "gte",
            CondOp::Lt => "lt",
            CondOp::Lte => "lte",
            CondOp::In => "in",
            CondOp::NotIn => "nin",
            CondOp::Like => "like",
            CondOp::Ilike => "ilike",
            CondOp::IsNull => "is_null",
            CondOp::IsNotNull => "is_not_null",
            CondOp::IsEmpty => "isEmpty",
            CondOp::IsNotEmpty => "isNotEmpty",
        }
    }

    /// Number of placeholders the operator consumes.
    ///
    /// `None` means list arity: one placeholder per element of the value.
    pub fn arity(&self) -> Option<usize> {
        match self {
            CondOp::In | CondOp::NotIn => None,
            CondOp::IsNull | CondOp::IsNotNull | CondOp::IsEmpty | CondOp::IsNotEmpty => Some(0),
            _ => Some(1),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            CondOp::Eq => "=",
            CondOp::Ne => "!=",
            CondOp::Gt => ">",
            CondOp::Gte => ">=",
            CondOp::Lt => "<",
            CondOp::Lte => "<=",
            CondOp::Like => "LIKE",
            CondOp::Ilike => "ILIKE",
            CondOp::In => "IN",
            CondOp::NotIn => "NOT IN",
            CondOp::IsNull => "IS NULL",
            CondOp::IsNotNull => "IS NOT NULL",
            // Parenthesized forms are rendered inline by the compiler.
            CondOp::IsEmpty => "",
            CondOp::IsNotEmpty => "",
        }
    }
}

impl FromStr for CondOp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "eq" => CondOp::Eq,
            "ne" => CondOp::Ne,
            "gt" => CondOp::Gt,
            "gte" => CondOp::Gte,
            "lt" => CondOp::Lt,
            "lte" => CondOp::Lte,
            "in" => CondOp::In,
            "nin" => CondOp::NotIn,
            "like" => CondOp::Like,
            "ilike" => CondOp::Ilike,
            "is_null" => CondOp::IsNull,
            "is_not_null" => CondOp::IsNotNull,
            "isEmpty" => CondOp::IsEmpty,
            "isNotEmpty" => CondOp::IsNotEmpty,
            other => return Err(QueryError::UnsupportedOperator(other.to_string())),
        })
    }
}

impl TryFrom<String> for CondOp {
    type Error = QueryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Connector placed before a condition when joining predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[default]
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

impl Logic {
    fn connector(&self) -> &'static str {
        match self {
            Logic::And => " AND ",
            Logic::Or => " OR ",
        }
    }
}

/// One filter predicate in a WHERE or HAVING clause.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WhereCondition {
    /// Plain identifier, or an expression such as `COUNT(*)` which is
    /// passed through unescaped (trusted callers only).
    pub field: String,
    pub operator: CondOp,
    #[serde(default)]
    pub value: QueryValue,
    /// Connector before this condition; ignored for the first one.
    #[serde(default)]
    pub logic: Logic,
}

impl WhereCondition {
    /// Create a condition joined with AND.
    pub fn new(
        field: impl Into<String>,
        operator: CondOp,
        value: impl Into<QueryValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            logic: Logic::And,
        }
    }

    /// Join this condition with OR instead of AND.
    pub fn or(mut self) -> Self {
        self.logic = Logic::Or;
        self
    }

    /// Compile into a SQL fragment, appending bound values to `params`.
    pub(crate) fn compile(&self, params: &mut Vec<QueryValue>) -> QueryResult<String> {
        if self.field.is_empty() {
            return Err(QueryError::MissingFieldName);
        }
        let field = if is_expression(&self.field) {
            self.field.clone()
        } else {
            Ident::parse(&self.field)?.to_sql()
        };

        let sql = match self.operator {
            CondOp::Eq
            | CondOp::Ne
            | CondOp::Gt
            | CondOp::Gte
            | CondOp::Lt
            | CondOp::Lte
            | CondOp::Like
            | CondOp::Ilike => {
                params.push(self.value.clone());
                format!("{field} {} ${}", self.operator.symbol(), params.len())
            }
            CondOp::In | CondOp::NotIn => {
                let Some(values) = self.value.as_list() else {
                    return Err(QueryError::InvalidInValue(self.field.clone()));
                };
                if values.is_empty() {
                    // Empty IN can match nothing; empty NOT IN excludes nothing.
                    let fragment = if self.operator == CondOp::In { "1=0" } else { "1=1" };
                    return Ok(fragment.to_string());
                }
                let mut placeholders = Vec::with_capacity(values.len());
                for value in values {
                    params.push(value.clone());
                    placeholders.push(format!("${}", params.len()));
                }
                format!(
                    "{field} {} ({})",
                    self.operator.symbol(),
                    placeholders.join(", ")
                )
            }
            CondOp::IsNull | CondOp::IsNotNull => {
                format!("{field} {}", self.operator.symbol())
            }
            CondOp::IsEmpty => format!("({field} IS NULL OR {field} = '')"),
            CondOp::IsNotEmpty => format!("({field} IS NOT NULL AND {field} != '')"),
        };
        Ok(sql)
    }
}

/// Compile a condition list into one predicate string.
///
/// Each condition after the first is prefixed with its own `logic`
/// connector. Placeholder numbers continue from `params.len()`.
pub(crate) fn compile_conditions(
    conditions: &[WhereCondition],
    params: &mut Vec<QueryValue>,
) -> QueryResult<String> {
    let mut sql = String::new();
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            sql.push_str(condition.logic.connector());
        }
        sql.push_str(&condition.compile(params)?);
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_eq() {
        let mut params = Vec::new();
        let sql = WhereCondition::new("status", CondOp::Eq, "active")
            .compile(&mut params)
            .unwrap();
        assert_eq!(sql, r#""status" = $1"#);
        assert_eq!(params, vec![QueryValue::Text("active".to_string())]);
    }

    #[test]
    fn compile_in_list() {
        let mut params = Vec::new();
        let sql = WhereCondition::new("role", CondOp::In, vec!["admin", "user"])
            .compile(&mut params)
            .unwrap();
        assert_eq!(sql, r#""role" IN ($1, $2)"#);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn compile_in_rejects_scalar() {
        let mut params = Vec::new();
        let err = WhereCondition::new("role", CondOp::In, "admin")
            .compile(&mut params)
            .unwrap_err();
        assert_eq!(err, QueryError::InvalidInValue("role".to_string()));
        assert!(params.is_empty());
    }

    #[test]
    fn compile_empty_in_list() {
        let mut params = Vec::new();
        let sql = WhereCondition::new("id", CondOp::In, Vec::<i64>::new())
            .compile(&mut params)
            .unwrap();
        assert_eq!(sql, "1=0");
        let sql = WhereCondition::new("id", CondOp::NotIn, Vec::<i64>::new())
            .compile(&mut params)
            .unwrap();
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn compile_no_value_operators() {
        let mut params = Vec::new();
        let cases = [
            (CondOp::IsNull, r#""a" IS NULL"#),
            (CondOp::IsNotNull, r#""a" IS NOT NULL"#),
            (CondOp::IsEmpty, r#"("a" IS NULL OR "a" = '')"#),
            (CondOp::IsNotEmpty, r#"("a" IS NOT NULL AND "a" != '')"#),
        ];
        for (op, expected) in cases {
            let sql = WhereCondition::new("a", op, QueryValue::Null)
                .compile(&mut params)
                .unwrap();
            assert_eq!(sql, expected);
        }
        assert!(params.is_empty());
    }

    #[test]
    fn compile_expression_field_passes_through() {
        let mut params = Vec::new();
        let sql = WhereCondition::new("COUNT(*)", CondOp::Gt, 5i64)
            .compile(&mut params)
            .unwrap();
        assert_eq!(sql, "COUNT(*) > $1");
    }

    #[test]
    fn compile_rejects_empty_field() {
        let mut params = Vec::new();
        let err = WhereCondition::new("", CondOp::Eq, 1i64)
            .compile(&mut params)
            .unwrap_err();
        assert_eq!(err, QueryError::MissingFieldName);
    }

    #[test]
    fn conditions_join_with_per_condition_logic() {
        let mut params = Vec::new();
        let conditions = vec![
            WhereCondition::new("a", CondOp::Eq, 1i64),
            WhereCondition::new("b", CondOp::Eq, 2i64).or(),
            WhereCondition::new("c", CondOp::Eq, 3i64),
        ];
        let sql = compile_conditions(&conditions, &mut params).unwrap();
        assert_eq!(sql, r#""a" = $1 OR "b" = $2 AND "c" = $3"#);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn first_condition_logic_is_ignored() {
        let mut params = Vec::new();
        let conditions = vec![WhereCondition::new("a", CondOp::Eq, 1i64).or()];
        let sql = compile_conditions(&conditions, &mut params).unwrap();
        assert_eq!(sql, r#""a" = $1"#);
    }

    #[test]
    fn operator_round_trip() {
        for op in [
            CondOp::Eq,
            CondOp::Ne,
            CondOp::Gt,
            CondOp::Gte,
            CondOp::Lt,
            CondOp::Lte,
            CondOp::In,
            CondOp::NotIn,
            CondOp::Like,
            CondOp::Ilike,
            CondOp::IsNull,
            CondOp::IsNotNull,
            CondOp::IsEmpty,
            CondOp::IsNotEmpty,
        ] {
            assert_eq!(op.as_str().parse::<CondOp>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = "regex".parse::<CondOp>().unwrap_err();
        assert_eq!(err, QueryError::UnsupportedOperator("regex".to_string()));
    }

    #[test]
    fn arity_matches_operator_class() {
        assert_eq!(CondOp::Eq.arity(), Some(1));
        assert_eq!(CondOp::In.arity(), None);
        assert_eq!(CondOp::IsEmpty.arity(), Some(0));
    }
}
