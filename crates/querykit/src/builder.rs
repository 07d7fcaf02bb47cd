//! Fluent query builder state and final SQL assembly.

use crate::condition::{CondOp, WhereCondition, compile_conditions};
use crate::error::{QueryError, QueryResult};
use crate::ident::{Ident, is_expression};
use crate::value::QueryValue;
use serde::Deserialize;
use tokio_postgres::types::ToSql;

/// Hard upper bound applied to `limit()`.
pub const MAX_LIMIT: i64 = 10_000;

/// Join kind keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinKind {
    #[default]
    #[serde(alias = "inner")]
    Inner,
    #[serde(alias = "left")]
    Left,
    #[serde(alias = "right")]
    Right,
    #[serde(alias = "full")]
    Full,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
        }
    }
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One JOIN entry. Table is validated; the ON condition is raw trusted SQL.
#[derive(Debug, Clone)]
struct Join {
    table: String,
    on: String,
    kind: JoinKind,
}

/// Final parameterized statement: SQL text plus positional values.
///
/// Placeholders in `sql` are `$1..$N` and correspond 1:1, in order, to
/// `parameters`. Execution is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub parameters: Vec<QueryValue>,
}

impl BuiltQuery {
    /// Parameter references in the shape tokio-postgres drivers expect.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.parameters
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Dynamic SELECT statement builder.
///
/// State is owned exclusively by one builder instance; `clone()` produces a
/// fully independent deep copy. Setters consume and return the builder for
/// chaining. Identifier validation happens eagerly at the offending setter
/// call; the first failure is recorded and surfaces from
/// [`QueryBuilder::build`], which also performs the structural completeness
/// checks.
///
/// # Example
/// ```
/// use querykit::QueryBuilder;
///
/// let query = QueryBuilder::new()
///     .select("id")
///     .from("users")
///     .eq("status", "active")
///     .build()?;
///
/// assert_eq!(query.sql, "SELECT \"id\"\nFROM \"users\"\nWHERE \"status\" = $1");
/// assert_eq!(query.parameters.len(), 1);
/// # Ok::<(), querykit::QueryError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    select_fields: Vec<String>,
    from_table: Option<String>,
    joins: Vec<Join>,
    where_conditions: Vec<WhereCondition>,
    group_by_fields: Vec<String>,
    having_conditions: Vec<WhereCondition>,
    order_by: Option<(String, Direction)>,
    limit_value: Option<i64>,
    offset_value: Option<i64>,
    build_error: Option<QueryError>,
}

impl QueryBuilder {
    /// Create a fresh, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(mut self, err: QueryError) -> Self {
        // First violation wins.
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
        self
    }

    // ==================== SELECT ====================

    /// Set the SELECT list to a single field.
    ///
    /// Plain identifiers are escaped at build time; expression-shaped fields
    /// (containing `(`, whitespace, or an `AS` alias) and `*` pass through
    /// as raw SQL and must come from trusted code.
    pub fn select(mut self, field: impl Into<String>) -> Self {
        self.select_fields = vec![field.into()];
        self
    }

    /// Set the SELECT list to multiple fields.
    pub fn select_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Append one SELECT field.
    pub fn add_select(mut self, field: impl Into<String>) -> Self {
        self.select_fields.push(field.into());
        self
    }

    // ==================== FROM / JOIN ====================

    /// Set the FROM table. The name is validated immediately.
    pub fn from(mut self, table: &str) -> Self {
        match Ident::parse(table) {
            Ok(ident) => {
                self.from_table = Some(ident.to_sql());
                self
            }
            Err(_) => self.fail(QueryError::InvalidTableName(table.to_string())),
        }
    }

    /// Add a JOIN. The table name is validated; `on` is raw trusted SQL.
    pub fn join(mut self, table: &str, on: &str, kind: JoinKind) -> Self {
        match Ident::parse(table) {
            Ok(ident) => {
                self.joins.push(Join {
                    table: ident.to_sql(),
                    on: on.to_string(),
                    kind,
                });
                self
            }
            Err(_) => self.fail(QueryError::InvalidTableName(table.to_string())),
        }
    }

    /// Add INNER JOIN.
    pub fn inner_join(self, table: &str, on: &str) -> Self {
        self.join(table, on, JoinKind::Inner)
    }

    /// Add LEFT JOIN.
    pub fn left_join(self, table: &str, on: &str) -> Self {
        self.join(table, on, JoinKind::Left)
    }

    /// Add RIGHT JOIN.
    pub fn right_join(self, table: &str, on: &str) -> Self {
        self.join(table, on, JoinKind::Right)
    }

    /// Add FULL JOIN.
    pub fn full_join(self, table: &str, on: &str) -> Self {
        self.join(table, on, JoinKind::Full)
    }

    // ==================== WHERE ====================

    /// Append one WHERE condition.
    pub fn where_cond(mut self, condition: WhereCondition) -> Self {
        self.where_conditions.push(condition);
        self
    }

    /// Append multiple WHERE conditions.
    pub fn where_conds(mut self, conditions: Vec<WhereCondition>) -> Self {
        self.where_conditions.extend(conditions);
        self
    }

    /// Add WHERE: column = value
    pub fn eq(self, column: &str, value: impl Into<QueryValue>) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::Eq, value))
    }

    /// Add WHERE: column != value
    pub fn ne(self, column: &str, value: impl Into<QueryValue>) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::Ne, value))
    }

    /// Add WHERE: column > value
    pub fn gt(self, column: &str, value: impl Into<QueryValue>) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::Gt, value))
    }

    /// Add WHERE: column >= value
    pub fn gte(self, column: &str, value: impl Into<QueryValue>) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::Gte, value))
    }

    /// Add WHERE: column < value
    pub fn lt(self, column: &str, value: impl Into<QueryValue>) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::Lt, value))
    }

    /// Add WHERE: column <= value
    pub fn lte(self, column: &str, value: impl Into<QueryValue>) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::Lte, value))
    }

    /// Add WHERE: column LIKE pattern
    pub fn like(self, column: &str, pattern: impl Into<QueryValue>) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::Like, pattern))
    }

    /// Add WHERE: column ILIKE pattern (case-insensitive)
    pub fn ilike(self, column: &str, pattern: impl Into<QueryValue>) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::Ilike, pattern))
    }

    /// Add WHERE: column IN (values...)
    pub fn in_list<T: Into<QueryValue>>(self, column: &str, values: Vec<T>) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::In, values))
    }

    /// Add WHERE: column NOT IN (values...)
    pub fn not_in<T: Into<QueryValue>>(self, column: &str, values: Vec<T>) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::NotIn, values))
    }

    /// Add WHERE: column IS NULL
    pub fn is_null(self, column: &str) -> Self {
        self.where_cond(WhereCondition::new(column, CondOp::IsNull, QueryValue::Null))
    }

    /// Add WHERE: column IS NOT NULL
    pub fn is_not_null(self, column: &str) -> Self {
        self.where_cond(WhereCondition::new(
            column,
            CondOp::IsNotNull,
            QueryValue::Null,
        ))
    }

    // ==================== GROUP BY / HAVING ====================

    /// Append a GROUP BY field. The name is validated immediately.
    pub fn group_by(mut self, field: &str) -> Self {
        match Ident::parse(field) {
            Ok(ident) => {
                self.group_by_fields.push(ident.to_sql());
                self
            }
            Err(err) => self.fail(err),
        }
    }

    /// Append multiple GROUP BY fields.
    pub fn group_by_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            self = self.group_by(field.as_ref());
        }
        self
    }

    /// Append one HAVING condition. Only valid together with GROUP BY.
    pub fn having_cond(mut self, condition: WhereCondition) -> Self {
        self.having_conditions.push(condition);
        self
    }

    /// Append multiple HAVING conditions.
    pub fn having_conds(mut self, conditions: Vec<WhereCondition>) -> Self {
        self.having_conditions.extend(conditions);
        self
    }

    // ==================== ORDER BY / paging ====================

    /// Set ORDER BY. The field is validated immediately.
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        match Ident::parse(field) {
            Ok(ident) => {
                self.order_by = Some((ident.to_sql(), direction));
                self
            }
            Err(err) => self.fail(err),
        }
    }

    /// Set LIMIT, capped at [`MAX_LIMIT`]. Negative values are a no-op.
    pub fn limit(mut self, n: i64) -> Self {
        if n >= 0 {
            self.limit_value = Some(n.min(MAX_LIMIT));
        }
        self
    }

    /// Set OFFSET. Negative values are a no-op.
    pub fn offset(mut self, n: i64) -> Self {
        if n >= 0 {
            self.offset_value = Some(n);
        }
        self
    }

    // ==================== Lifecycle ====================

    /// Discard all accumulated state and start over.
    pub fn reset(self) -> Self {
        Self::new()
    }

    // ==================== Build ====================

    /// Assemble the final SQL and parameter vector.
    ///
    /// Fail-fast order: the earliest setter error, then missing SELECT
    /// fields, then missing FROM table, then HAVING without GROUP BY.
    pub fn build(&self) -> QueryResult<BuiltQuery> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        if self.select_fields.is_empty() {
            return Err(QueryError::SelectFieldsRequired);
        }
        let Some(from_table) = &self.from_table else {
            return Err(QueryError::FromTableRequired);
        };
        if !self.having_conditions.is_empty() && self.group_by_fields.is_empty() {
            return Err(QueryError::HavingRequiresGroupBy);
        }

        let mut fields = Vec::with_capacity(self.select_fields.len());
        for field in &self.select_fields {
            if is_expression(field) {
                fields.push(field.clone());
            } else {
                let ident = Ident::parse(field)
                    .map_err(|_| QueryError::InvalidFieldName(field.clone()))?;
                fields.push(ident.to_sql());
            }
        }

        let mut parameters = Vec::new();
        let mut sql = format!("SELECT {}", fields.join(", "));
        sql.push_str("\nFROM ");
        sql.push_str(from_table);

        for join in &self.joins {
            sql.push('\n');
            sql.push_str(join.kind.as_sql());
            sql.push(' ');
            sql.push_str(&join.table);
            sql.push_str(" ON ");
            sql.push_str(&join.on);
        }

        if !self.where_conditions.is_empty() {
            let predicate = compile_conditions(&self.where_conditions, &mut parameters)?;
            sql.push_str("\nWHERE ");
            sql.push_str(&predicate);
        }

        if !self.group_by_fields.is_empty() {
            sql.push_str("\nGROUP BY ");
            sql.push_str(&self.group_by_fields.join(", "));
        }

        // HAVING placeholders continue after WHERE: same parameter list.
        if !self.having_conditions.is_empty() {
            let predicate = compile_conditions(&self.having_conditions, &mut parameters)?;
            sql.push_str("\nHAVING ");
            sql.push_str(&predicate);
        }

        if let Some((field, direction)) = &self.order_by {
            sql.push_str("\nORDER BY ");
            sql.push_str(field);
            sql.push(' ');
            sql.push_str(direction.as_sql());
        }

        match (self.limit_value, self.offset_value) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!("\nLIMIT {limit} OFFSET {offset}"));
            }
            (Some(limit), None) => sql.push_str(&format!("\nLIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!("\nOFFSET {offset}")),
            (None, None) => {}
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %sql, params = parameters.len(), "built query");

        Ok(BuiltQuery { sql, parameters })
    }
}

/// One-shot convenience wiring select / from / where / order by / limit.
pub fn build_select(
    fields: &[&str],
    table: &str,
    conditions: Vec<WhereCondition>,
    order_by: Option<(&str, Direction)>,
    limit: Option<i64>,
) -> QueryResult<BuiltQuery> {
    let mut qb = QueryBuilder::new()
        .select_fields(fields.iter().copied())
        .from(table)
        .where_conds(conditions);
    if let Some((field, direction)) = order_by {
        qb = qb.order_by(field, direction);
    }
    if let Some(n) = limit {
        qb = qb.limit(n);
    }
    qb.build()
}
