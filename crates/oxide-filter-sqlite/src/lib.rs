//! # oxide-filter-sqlite
//!
//! SQLite dialect for `oxide-filter`.
//!
//! # How SQLite differs from MySQL
//!
//! - **Identifier quoting**: double quotes (`"`), the standard style. See
//!   [SQLite keywords].
//! - **[INSERT]**: no `INSERT ... SET`; assignments render as a column
//!   list plus `VALUES`.
//! - **Full-text search**: [FTS5] tables use `column MATCH ?` instead of
//!   `MATCH ... AGAINST`, and take no search modifier.
//! - **Missing functions**: `STRCMP()` and `FIND_IN_SET()` do not exist, so
//!   predicates using them fail to compile.
//! - **Joins**: no `STRAIGHT_JOIN`.
//! - **No `TRUNCATE`**: emptying a table is a plain `DELETE FROM`.
//!
//! [SQLite keywords]: https://www.sqlite.org/lang_keywords.html
//! [INSERT]: https://www.sqlite.org/lang_insert.html
//! [FTS5]: https://www.sqlite.org/fts5.html
//!
//! ## Example
//!
//! ```rust
//! use oxide_filter::{Compiler, DialectRegistry, Filter};
//!
//! let mut registry = DialectRegistry::with_defaults();
//! oxide_filter_sqlite::register(&mut registry);
//!
//! let compiler = Compiler::for_driver("sqlite", &registry).unwrap();
//! let filter = Filter::insert("users").set("name", "bob");
//! assert_eq!(
//!     compiler.execute(&filter).unwrap(),
//!     r#"INSERT INTO "users" ("name") VALUES (:name)"#
//! );
//! ```

mod dialect;

use std::sync::Arc;

use oxide_filter::DialectRegistry;

pub use dialect::SqliteDialect;

/// Registers [`SqliteDialect`] under the `sqlite` driver name.
pub fn register(registry: &mut DialectRegistry) {
    registry.register("sqlite", Arc::new(SqliteDialect::new()));
}
