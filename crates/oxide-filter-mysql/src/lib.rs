//! # oxide-filter-mysql
//!
//! MySQL dialect for `oxide-filter`.
//!
//! # How MySQL differs from the generic dialect
//!
//! - **Identifier quoting**: backticks (`` ` ``). See [MySQL identifiers].
//! - **[LIMIT]**: the offset comes first, `LIMIT offset, count`.
//! - **Vendor operators**: `REGEXP`, `FIND_IN_SET()`, `STRCMP()` and
//!   [full-text] `MATCH ... AGAINST` with search modifiers.
//! - **`STRAIGHT_JOIN`**: a join that forces the left table to be read
//!   first.
//! - **Table status**: `SHOW TABLE STATUS LIKE 'name'`.
//!
//! [MySQL identifiers]: https://dev.mysql.com/doc/refman/8.0/en/identifiers.html
//! [LIMIT]: https://dev.mysql.com/doc/refman/8.0/en/select.html
//! [full-text]: https://dev.mysql.com/doc/refman/8.0/en/fulltext-search.html
//!
//! ## Example
//!
//! ```rust
//! use oxide_filter::{Compiler, DialectRegistry, Filter};
//!
//! let mut registry = DialectRegistry::with_defaults();
//! oxide_filter_mysql::register(&mut registry);
//!
//! let compiler = Compiler::for_driver("mysql", &registry).unwrap();
//! let filter = Filter::select("users").where_clause("id", 1).limit_offset(10, 20);
//! assert_eq!(
//!     compiler.execute(&filter).unwrap(),
//!     "SELECT * FROM `users` WHERE `id` = ? LIMIT 20, 10"
//! );
//! ```

mod dialect;

use std::sync::Arc;

use oxide_filter::DialectRegistry;

pub use dialect::MysqlDialect;

/// Registers [`MysqlDialect`] under the `mysql` driver name.
pub fn register(registry: &mut DialectRegistry) {
    registry.register("mysql", Arc::new(MysqlDialect::new()));
}
