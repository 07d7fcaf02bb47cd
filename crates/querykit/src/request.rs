//! Untrusted query descriptions.
//!
//! [`QueryRequest`] is the JSON front door: a structured description of a
//! SELECT (fields, joins, filters, grouping, ordering, paging) arriving from
//! callers that must not be trusted with raw SQL. Lowering into a
//! [`QueryBuilder`] applies all identifier and operator validation; values
//! only ever reach the statement through parameters.
//!
//! Join conditions remain raw SQL and are therefore still trusted input —
//! a service accepting requests from end users must fill them from internal
//! templates, never from the request itself.

use crate::builder::{BuiltQuery, Direction, JoinKind, QueryBuilder};
use crate::condition::WhereCondition;
use crate::error::{QueryError, QueryResult};
use serde::Deserialize;

/// A join entry inside a [`QueryRequest`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JoinRequest {
    pub table: String,
    /// Raw ON condition (trusted).
    pub condition: String,
    #[serde(default)]
    pub kind: JoinKind,
}

/// Ordering entry inside a [`QueryRequest`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderByRequest {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

/// Structured description of a SELECT query.
///
/// Keys are `camelCase` on the wire (`groupBy`, `orderBy`, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub select: Vec<String>,
    pub from: String,
    #[serde(default)]
    pub joins: Vec<JoinRequest>,
    #[serde(default, rename = "where")]
    pub where_conditions: Vec<WhereCondition>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub having: Vec<WhereCondition>,
    #[serde(default)]
    pub order_by: Option<OrderByRequest>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl QueryRequest {
    /// Parse a request from a JSON document.
    pub fn from_json(json: &str) -> QueryResult<Self> {
        serde_json::from_str(json).map_err(|e| QueryError::MalformedRequest(e.to_string()))
    }

    /// Lower into a [`QueryBuilder`].
    ///
    /// Validation errors are recorded in the builder and surface from
    /// `build()`, matching the fluent API.
    pub fn into_builder(self) -> QueryBuilder {
        let mut qb = QueryBuilder::new()
            .select_fields(self.select)
            .from(&self.from);
        for join in &self.joins {
            qb = qb.join(&join.table, &join.condition, join.kind);
        }
        qb = qb.where_conds(self.where_conditions);
        qb = qb.group_by_fields(&self.group_by);
        qb = qb.having_conds(self.having);
        if let Some(order) = &self.order_by {
            qb = qb.order_by(&order.field, order.direction);
        }
        if let Some(n) = self.limit {
            qb = qb.limit(n);
        }
        if let Some(n) = self.offset {
            qb = qb.offset(n);
        }
        qb
    }

    /// Lower and build in one step.
    pub fn build(self) -> QueryResult<BuiltQuery> {
        self.into_builder().build()
    }
}
