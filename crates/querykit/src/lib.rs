//! # querykit
//!
//! A dynamic, injection-safe SQL query builder for PostgreSQL.
//!
//! querykit translates a structured, untrusted description of a query
//! (field lists, filter predicates, joins, grouping, ordering, paging) into
//! a parameterized SQL statement plus a positional argument vector. No
//! user-supplied value or identifier can escape its parameter slot or its
//! quoting rules.
//!
//! ## Features
//!
//! - **Always parameterized**: every condition value becomes a `$n`
//!   placeholder; WHERE and HAVING share one strictly increasing counter
//! - **Sanitized identifiers**: table and column names are stripped to
//!   `[A-Za-z0-9_]` and double quoted, with dotted `table.column` support
//! - **Closed operator set**: unknown operators are rejected by name
//! - **JSON front door**: [`QueryRequest`] deserializes an untrusted
//!   description and lowers it through the same validation
//! - **No I/O**: the output pair `(sql, parameters)` is the entire contract;
//!   execution belongs to the caller's database driver
//!
//! ## Example
//!
//! ```
//! use querykit::QueryBuilder;
//!
//! let query = QueryBuilder::new()
//!     .select("*")
//!     .from("users")
//!     .in_list("role", vec!["admin", "user"])
//!     .build()?;
//!
//! assert_eq!(query.sql, "SELECT *\nFROM \"users\"\nWHERE \"role\" IN ($1, $2)");
//! assert_eq!(query.parameters.len(), 2);
//! # Ok::<(), querykit::QueryError>(())
//! ```
//!
//! Executing against a driver:
//!
//! ```ignore
//! let query = request.build()?;
//! let rows = client.query(&query.sql, &query.as_refs()).await?;
//! ```
//!
//! ## Trust boundary
//!
//! JOIN `ON` strings and expression-shaped SELECT fields (anything
//! containing `(`, whitespace, or an `AS` alias) are accepted as raw SQL.
//! They must originate from trusted code paths such as internal query
//! templates, never from end-user input. Values must always flow through
//! parameters.

pub mod builder;
pub mod condition;
pub mod error;
pub mod ident;
pub mod request;
pub mod value;

pub use builder::{BuiltQuery, Direction, JoinKind, MAX_LIMIT, QueryBuilder, build_select};
pub use condition::{CondOp, Logic, WhereCondition};
pub use error::{QueryError, QueryResult};
pub use ident::{Ident, IntoIdent, escape_identifier};
pub use request::{JoinRequest, OrderByRequest, QueryRequest};
pub use value::QueryValue;
