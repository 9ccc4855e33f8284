//! Statement assembly.
//!
//! A [`Compiler`] pairs a [`Dialect`] with an optional table prefix and turns
//! a [`Filter`] into SQL text. It holds no per-statement state: compiling
//! the same filter twice yields the same string, and the parameters are read
//! off the filter separately through [`Filter::values`] and
//! [`Filter::bindings`].
//!
//! # Example
//!
//! ```rust
//! use oxide_filter::{Compiler, Filter};
//!
//! let compiler = Compiler::generic();
//! let filter = Filter::select("users").where_clause("a", 1).where_clause("b", 2);
//!
//! assert_eq!(
//!     compiler.execute(&filter).unwrap(),
//!     r#"SELECT * FROM "users" WHERE "a" = ? AND "b" = ?"#
//! );
//! ```

pub mod predicate;
pub mod wrap;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::CompilerConfig;
use crate::dialect::{Dialect, DialectRegistry, GenericDialect};
use crate::error::{FilterError, Result};
use crate::filter::predicate::{Predicate, PredicateValue};
use crate::filter::{FieldSource, Filter, TableRef};
use crate::operator::Action;

use predicate::PredicateRenderer;
use wrap::Wrapper;

/// Dialect-aware statement compiler.
#[derive(Debug, Clone)]
pub struct Compiler {
    dialect: Arc<dyn Dialect>,
    table_prefix: Option<String>,
}

impl Compiler {
    /// Creates a compiler for `dialect`.
    #[must_use]
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            table_prefix: None,
        }
    }

    /// Creates a compiler for the generic dialect.
    #[must_use]
    pub fn generic() -> Self {
        Self::new(Arc::new(GenericDialect::new()))
    }

    /// Creates a compiler for the dialect registered under `driver`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedDriver`] when the driver is unknown.
    pub fn for_driver(driver: &str, registry: &DialectRegistry) -> Result<Self> {
        Ok(Self::new(registry.get(driver)?))
    }

    /// Creates a compiler from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedDriver`] when the configured driver
    /// is unknown.
    pub fn from_config(config: &CompilerConfig, registry: &DialectRegistry) -> Result<Self> {
        let compiler = Self::for_driver(&config.driver, registry)?;
        Ok(match &config.table_prefix {
            Some(prefix) => compiler.with_table_prefix(prefix),
            None => compiler,
        })
    }

    /// Sets the prefix inserted before every table name.
    #[must_use]
    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.table_prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the table prefix.
    #[must_use]
    pub fn table_prefix(&self) -> Option<&str> {
        self.table_prefix.as_deref()
    }

    /// Compiles `filter` according to its action.
    ///
    /// # Errors
    ///
    /// Returns the error of the matching assembler, see
    /// [`Compiler::select`], [`Compiler::insert`], [`Compiler::update`] and
    /// [`Compiler::delete`].
    pub fn execute(&self, filter: &Filter) -> Result<String> {
        if filter.has_values() && filter.has_bindings() {
            warn!(
                action = %filter.action(),
                values = filter.values().len(),
                bindings = filter.bindings().len(),
                "filter carries both positional values and named bindings"
            );
        }
        let sql = match filter.action() {
            Action::Select => self.select(filter),
            Action::Insert => self.insert(filter),
            Action::Update => self.update(filter),
            Action::Delete => self.delete(filter),
        }?;
        debug!(
            action = %filter.action(),
            dialect = self.dialect.name(),
            sql = %sql,
            "compiled statement"
        );
        Ok(sql)
    }

    /// Assembles `SELECT [DISTINCT] fields FROM tables [joins] [WHERE]
    /// [GROUP BY] [HAVING] [ORDER BY] [LIMIT]`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingTable`] without a table,
    /// [`FilterError::UnsupportedJoin`] for a join kind the dialect lacks,
    /// and [`FilterError::UnsupportedWhereOperator`] for an operator it can
    /// not render.
    pub fn select(&self, filter: &Filter) -> Result<String> {
        let wrap = self.wrapper();
        let tables = require_tables(filter, Action::Select)?;

        let mut sql = vec![String::from("SELECT")];
        if filter.is_distinct() {
            sql.push(String::from("DISTINCT"));
        }
        sql.push(self.fields(filter));
        sql.push(String::from("FROM"));
        sql.push(
            tables
                .iter()
                .map(|t| self.table_ref(t))
                .collect::<Vec<_>>()
                .join(", "),
        );
        for join in filter.joins() {
            if !self.dialect.supports_join(join.kind()) {
                return Err(FilterError::UnsupportedJoin {
                    kind: String::from(join.kind().name()),
                    dialect: String::from(self.dialect.name()),
                });
            }
            let mut clause = format!("{} {}", join.kind().as_sql(), wrap.table(join.table()));
            if join.has_conditions() {
                clause.push_str(" ON ");
                clause.push_str(&self.renderer().render_nodes(join.conditions())?);
            }
            sql.push(clause);
        }
        self.push_where(&mut sql, filter.where_predicates())?;
        if let Some(last) = filter.groups().last() {
            let columns = filter
                .groups()
                .iter()
                .map(|g| wrap.column(&g.column))
                .collect::<Vec<_>>()
                .join(", ");
            let mut clause = format!("GROUP BY {columns}");
            if let Some(modifier) = last
                .modifier
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
            {
                clause.push(' ');
                clause.push_str(modifier);
            }
            sql.push(clause);
        }
        let having = self.renderer().render_list(filter.having_predicates())?;
        if !having.is_empty() {
            sql.push(format!("HAVING {having}"));
        }
        self.push_order_limit(&mut sql, filter);
        Ok(sql.join(" "))
    }

    /// Assembles an insert from the named bindings.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingTable`] without a table and
    /// [`FilterError::MissingBindings`] without bindings.
    pub fn insert(&self, filter: &Filter) -> Result<String> {
        let table = require_tables(filter, Action::Insert)?;
        let assignments = self.assignments(filter, &HashSet::new());
        if assignments.is_empty() {
            return Err(FilterError::MissingBindings {
                action: Action::Insert,
            });
        }
        Ok(self
            .dialect
            .insert_statement(&self.wrapper().table(&table[0].table), &assignments))
    }

    /// Assembles `UPDATE table SET ... [WHERE] [ORDER BY] [LIMIT]`.
    ///
    /// Bindings that address rows (a binding named like a top-level where
    /// column, or one referenced by a `key` predicate) stay out of SET.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingTable`] without a table,
    /// [`FilterError::MissingBindings`] when nothing is left to set, and
    /// [`FilterError::UnsupportedWhereOperator`] for an operator the dialect
    /// can not render.
    pub fn update(&self, filter: &Filter) -> Result<String> {
        let table = require_tables(filter, Action::Update)?;
        let assignments = self.assignments(filter, &addressing_bindings(filter.where_predicates()));
        if assignments.is_empty() {
            return Err(FilterError::MissingBindings {
                action: Action::Update,
            });
        }
        let set = assignments
            .iter()
            .map(|(column, marker)| format!("{column} = {marker}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = vec![
            String::from("UPDATE"),
            self.wrapper().table(&table[0].table),
            format!("SET {set}"),
        ];
        self.push_where(&mut sql, filter.where_predicates())?;
        self.push_order_limit(&mut sql, filter);
        Ok(sql.join(" "))
    }

    /// Assembles `DELETE FROM table [WHERE] [ORDER BY] [LIMIT]`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingTable`] without a table and
    /// [`FilterError::UnsupportedWhereOperator`] for an operator the dialect
    /// can not render.
    pub fn delete(&self, filter: &Filter) -> Result<String> {
        let table = require_tables(filter, Action::Delete)?;
        let mut sql = vec![
            String::from("DELETE FROM"),
            self.wrapper().table(&table[0].table),
        ];
        self.push_where(&mut sql, filter.where_predicates())?;
        self.push_order_limit(&mut sql, filter);
        Ok(sql.join(" "))
    }

    /// `SELECT MAX(column) AS max FROM table`
    #[must_use]
    pub fn max(&self, table: &str, column: &str) -> String {
        self.aggregate("MAX", "max", table, column)
    }

    /// `SELECT MIN(column) AS min FROM table`
    #[must_use]
    pub fn min(&self, table: &str, column: &str) -> String {
        self.aggregate("MIN", "min", table, column)
    }

    /// `SELECT AVG(column) AS avg FROM table`
    #[must_use]
    pub fn avg(&self, table: &str, column: &str) -> String {
        self.aggregate("AVG", "avg", table, column)
    }

    /// `SELECT SUM(column) AS sum FROM table`
    #[must_use]
    pub fn sum(&self, table: &str, column: &str) -> String {
        self.aggregate("SUM", "sum", table, column)
    }

    /// `SELECT COUNT(*) AS count FROM table`
    #[must_use]
    pub fn size(&self, table: &str) -> String {
        format!("SELECT COUNT(*) AS count FROM {}", self.wrapper().table(table))
    }

    /// Empties a table.
    #[must_use]
    pub fn truncate(&self, table: &str) -> String {
        self.dialect.truncate_table(&self.wrapper().table(table))
    }

    /// `DROP TABLE table`
    #[must_use]
    pub fn drop(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.wrapper().table(table))
    }

    /// Describes a table.
    #[must_use]
    pub fn show(&self, table: &str) -> String {
        let table = table.trim();
        match &self.table_prefix {
            Some(prefix) => self.dialect.show_table(&format!("{prefix}{table}")),
            None => self.dialect.show_table(table),
        }
    }

    fn aggregate(&self, function: &str, alias: &str, table: &str, column: &str) -> String {
        let wrap = self.wrapper();
        format!(
            "SELECT {function}({}) AS {alias} FROM {}",
            wrap.column(column),
            wrap.table(table)
        )
    }

    fn wrapper(&self) -> Wrapper<'_> {
        Wrapper::new(self.dialect.as_ref(), self.table_prefix.as_deref())
    }

    fn renderer(&self) -> PredicateRenderer<'_> {
        PredicateRenderer::new(self.dialect.as_ref(), self.wrapper())
    }

    fn table_ref(&self, table: &TableRef) -> String {
        let wrap = self.wrapper();
        match &table.alias {
            Some(alias) => format!("{} AS {}", wrap.table(&table.table), wrap.alias(alias)),
            None => wrap.table(&table.table),
        }
    }

    fn fields(&self, filter: &Filter) -> String {
        if filter.fields_ref().is_empty() {
            return String::from("*");
        }
        let wrap = self.wrapper();
        filter
            .fields_ref()
            .iter()
            .map(|f| {
                let field = match &f.field {
                    FieldSource::Column(column) => wrap.column(column),
                    FieldSource::Expr(expr) => expr.get(),
                };
                match &f.alias {
                    Some(alias) => format!("{field} AS {}", wrap.alias(alias)),
                    None => field,
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn assignments(&self, filter: &Filter, excluded: &HashSet<&str>) -> Vec<(String, String)> {
        let wrap = self.wrapper();
        filter
            .bindings()
            .keys()
            .filter(|name| !excluded.contains(name.as_str()))
            .map(|name| (wrap.column(name), self.dialect.named_placeholder(name)))
            .collect()
    }

    fn push_where(&self, sql: &mut Vec<String>, predicates: &[Predicate]) -> Result<()> {
        let body = self.renderer().render_list(predicates)?;
        if !body.is_empty() {
            sql.push(format!("WHERE {body}"));
        }
        Ok(())
    }

    fn push_order_limit(&self, sql: &mut Vec<String>, filter: &Filter) {
        if !filter.orders_ref().is_empty() {
            let wrap = self.wrapper();
            let order = filter
                .orders_ref()
                .iter()
                .map(|o| format!("{} {}", wrap.column(&o.column), o.direction.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push(format!("ORDER BY {order}"));
        }
        if let Some(limit) = filter.limit_ref() {
            sql.push(self.dialect.limit_clause(limit));
        }
    }
}

fn require_tables(filter: &Filter, action: Action) -> Result<&[TableRef]> {
    let tables = filter.tables_ref();
    if tables.is_empty() {
        return Err(FilterError::MissingTable { action });
    }
    Ok(tables)
}

/// Binding names that address rows rather than assign columns.
fn addressing_bindings(predicates: &[Predicate]) -> HashSet<&str> {
    let mut names = HashSet::new();
    for predicate in predicates {
        if let Predicate::Node(node) = predicate {
            names.insert(node.column.as_str());
        }
    }
    collect_named(predicates, &mut names);
    names
}

fn collect_named<'a>(predicates: &'a [Predicate], names: &mut HashSet<&'a str>) {
    for predicate in predicates {
        match predicate {
            Predicate::Node(node) => {
                if let PredicateValue::Named(markers) = &node.value {
                    names.extend(markers.iter().map(String::as_str));
                }
            }
            Predicate::Group(inner) => collect_named(inner, names),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;
    use crate::operator::{Connector, Direction, JoinKind, Operator};
    use crate::value::SqlValue;

    #[test]
    fn test_select_star_by_default() {
        let sql = Compiler::generic().execute(&Filter::select("users")).unwrap();
        assert_eq!(sql, r#"SELECT * FROM "users""#);
    }

    #[test]
    fn test_select_all_clauses_in_order() {
        let filter = Filter::select("users")
            .distinct()
            .field_as("users.name", "n")
            .field_expr(Expression::new("COUNT(*)"), Some("total"))
            .join_with("orders", JoinKind::Left, |j| {
                j.on("users.id", Operator::Equal, "orders.user_id")
            })
            .where_op("age", Operator::GreaterThan, 18)
            .group_with(&["users.name"], Some("WITH ROLLUP"))
            .having_with("total", 2, Operator::GreaterThanEqual, Connector::And)
            .order("n", Direction::Desc)
            .limit_offset(10, 20);

        assert_eq!(
            Compiler::generic().execute(&filter).unwrap(),
            concat!(
                r#"SELECT DISTINCT "users"."name" AS "n", COUNT(*) AS "total" FROM "users" "#,
                r#"LEFT JOIN "orders" ON "users"."id" = "orders"."user_id" "#,
                r#"WHERE "age" > ? GROUP BY "users"."name" WITH ROLLUP "#,
                r#"HAVING "total" >= ? ORDER BY "n" DESC LIMIT 10 OFFSET 20"#
            )
        );
        assert_eq!(filter.values(), &[SqlValue::Int(18), SqlValue::Int(2)]);
    }

    #[test]
    fn test_missing_table() {
        let err = Compiler::generic()
            .execute(&Filter::new(Action::Delete))
            .unwrap_err();
        assert_eq!(err, FilterError::MissingTable { action: Action::Delete });
    }

    #[test]
    fn test_insert_uses_named_markers() {
        let filter = Filter::insert("users").set("name", "bob").set("age", 3);
        assert_eq!(
            Compiler::generic().execute(&filter).unwrap(),
            r#"INSERT INTO "users" SET "name" = :name, "age" = :age"#
        );
    }

    #[test]
    fn test_insert_without_bindings() {
        let err = Compiler::generic().execute(&Filter::insert("users")).unwrap_err();
        assert_eq!(err, FilterError::MissingBindings { action: Action::Insert });
    }

    #[test]
    fn test_update_excludes_key_bindings() {
        let filter = Filter::update("users")
            .set("name", "bob")
            .key("id", 5)
            .unwrap()
            .set("id", 5);
        assert_eq!(
            Compiler::generic().execute(&filter).unwrap(),
            r#"UPDATE "users" SET "name" = :name WHERE "id" = :id"#
        );

        let filter = Filter::update("users")
            .set("active", false)
            .key_in("id", [1, 2])
            .unwrap();
        assert_eq!(
            Compiler::generic().execute(&filter).unwrap(),
            r#"UPDATE "users" SET "active" = :active WHERE "id" IN(:id0, :id1)"#
        );
    }

    #[test]
    fn test_empty_key_list_renders_null() {
        let filter = Filter::delete("users").key_in("id", Vec::<i64>::new()).unwrap();
        assert_eq!(
            Compiler::generic().execute(&filter).unwrap(),
            r#"DELETE FROM "users" WHERE "id" IN(NULL)"#
        );
        assert!(!filter.has_bindings());
    }

    #[test]
    fn test_update_with_only_key_has_nothing_to_set() {
        let filter = Filter::update("users").key("id", 1).unwrap();
        assert_eq!(
            Compiler::generic().execute(&filter).unwrap_err(),
            FilterError::MissingBindings { action: Action::Update }
        );
    }

    #[test]
    fn test_delete_with_order_and_limit() {
        let filter = Filter::delete("logs")
            .where_op("created", Operator::LesserThan, "2024-01-01")
            .order("created", Direction::Asc)
            .limit(100);
        assert_eq!(
            Compiler::generic().execute(&filter).unwrap(),
            r#"DELETE FROM "logs" WHERE "created" < ? ORDER BY "created" ASC LIMIT 100"#
        );
    }

    #[test]
    fn test_table_prefix_applies_to_tables_and_qualified_columns() {
        let compiler = Compiler::generic().with_table_prefix("app_");
        let filter = Filter::select("users")
            .table_as("orders", "o")
            .where_clause("users.id", 1);
        assert_eq!(
            compiler.execute(&filter).unwrap(),
            r#"SELECT * FROM "app_users", "app_orders" AS "o" WHERE "app_users"."id" = ?"#
        );
        assert_eq!(compiler.size("users"), r#"SELECT COUNT(*) AS count FROM "app_users""#);
    }

    #[test]
    fn test_aggregate_helpers() {
        let compiler = Compiler::generic();
        assert_eq!(
            compiler.max("orders", "total"),
            r#"SELECT MAX("total") AS max FROM "orders""#
        );
        assert_eq!(
            compiler.avg("orders", "total"),
            r#"SELECT AVG("total") AS avg FROM "orders""#
        );
        assert_eq!(compiler.drop("orders"), r#"DROP TABLE "orders""#);
        assert_eq!(compiler.truncate("orders"), r#"TRUNCATE TABLE "orders""#);
    }

    #[test]
    fn test_cross_join_without_conditions() {
        let filter = Filter::select("a").join_with("b", JoinKind::Cross, |j| j);
        assert_eq!(
            Compiler::generic().execute(&filter).unwrap(),
            r#"SELECT * FROM "a" CROSS JOIN "b""#
        );
    }

    #[test]
    fn test_from_config() {
        let config = CompilerConfig {
            table_prefix: Some(String::from("t_")),
            ..CompilerConfig::default()
        };
        let compiler = Compiler::from_config(&config, &DialectRegistry::with_defaults()).unwrap();
        assert_eq!(compiler.dialect().name(), "generic");
        assert_eq!(compiler.table_prefix(), Some("t_"));

        let config = CompilerConfig {
            driver: String::from("oracle"),
            ..CompilerConfig::default()
        };
        assert_eq!(
            Compiler::from_config(&config, &DialectRegistry::with_defaults()).unwrap_err(),
            FilterError::UnsupportedDriver(String::from("oracle"))
        );
    }
}
