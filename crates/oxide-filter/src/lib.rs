//! # oxide-filter
//!
//! A dialect-aware compiler from structured CRUD descriptions to
//! parameterized SQL.
//!
//! This crate provides:
//! - [`Filter`], a mutable descriptor of one select/insert/update/delete
//!   statement: tables, fields, nested where/having predicates, joins,
//!   grouping, ordering and pagination
//! - A recursive predicate compiler and per-action statement assemblers
//! - A [`Dialect`] trait with a generic implementation and a
//!   [`DialectRegistry`] keyed by driver name
//!
//! The compiler never executes SQL and never inlines bound values: the
//! compiled text carries `?` or `:name` markers, and the matching values are
//! read off the filter separately.
//!
//! ## Building and compiling
//!
//! ```rust
//! use oxide_filter::{Compiler, Connector, Filter, SqlValue};
//!
//! let filter = Filter::select("users")
//!     .where_clause("active", true)
//!     .nest_with(
//!         |inner| inner.where_clause("role", "admin").where_clause("role", "owner"),
//!         Some(Connector::Or),
//!     )
//!     .where_clause("deleted", false);
//!
//! let sql = Compiler::generic().execute(&filter).unwrap();
//! assert_eq!(
//!     sql,
//!     concat!(
//!         r#"SELECT * FROM "users" WHERE "active" = ? "#,
//!         r#"AND ("role" = ? AND "role" = ?) OR "deleted" = ?"#,
//!     )
//! );
//! assert_eq!(filter.values().len(), 4);
//! ```
//!
//! ## Named bindings
//!
//! Insert and update statements assign from the named binding map:
//!
//! ```rust
//! use oxide_filter::{Compiler, Filter};
//!
//! let filter = Filter::update("users").set("name", "bob").key("id", 5).unwrap();
//! assert_eq!(
//!     Compiler::generic().execute(&filter).unwrap(),
//!     r#"UPDATE "users" SET "name" = :name WHERE "id" = :id"#
//! );
//! ```

pub mod compiler;
pub mod config;
pub mod dialect;
pub mod error;
pub mod expression;
pub mod filter;
pub mod join;
pub mod operator;
pub mod value;

pub use compiler::Compiler;
pub use config::CompilerConfig;
pub use dialect::{Dialect, DialectRegistry, GenericDialect, OperatorArgs};
pub use error::{FilterError, Result};
pub use expression::Expression;
pub use filter::lookup::{ColumnLookup, KnownColumns};
pub use filter::predicate::{Predicate, PredicateNode, PredicateValue, WhereValue};
pub use filter::property::{Property, PropertyRef};
pub use filter::{FieldRef, FieldSource, Filter, GroupSpec, LimitSpec, OrderSpec, TableRef};
pub use join::Join;
pub use operator::{Action, Connector, Direction, JoinKind, Operator};
pub use value::{SqlValue, ToSqlValue};

/// Common imports for building and compiling filters.
pub mod prelude {
    pub use crate::compiler::Compiler;
    pub use crate::dialect::{Dialect, DialectRegistry};
    pub use crate::error::{FilterError, Result};
    pub use crate::expression::Expression;
    pub use crate::filter::Filter;
    pub use crate::filter::predicate::WhereValue;
    pub use crate::join::Join;
    pub use crate::operator::{Action, Connector, Direction, JoinKind, Operator};
    pub use crate::value::{SqlValue, ToSqlValue};
}
