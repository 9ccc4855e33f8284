//! SQL dialect support.
//!
//! Databases agree on the shape of a CRUD statement but not on identifier
//! quoting, pagination syntax, or which comparison operators exist. The
//! [`Dialect`] trait captures those differences; the compiler asks the
//! active dialect for each of them and renders everything else itself.
//!
//! Dialects are looked up by driver name through a [`DialectRegistry`].

mod generic;
mod registry;

pub use generic::GenericDialect;
pub use registry::DialectRegistry;

use std::fmt;

use crate::filter::LimitSpec;
use crate::operator::{JoinKind, Operator};

/// The operands of one predicate, already wrapped and masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorArgs<'a> {
    /// Wrapped column reference.
    pub column: &'a str,
    /// Masked value, or the literal/column text when masking is off.
    pub value: &'a str,
    /// Masked lower and upper bound for the BETWEEN family.
    pub range: Option<(&'a str, &'a str)>,
    /// Trailing modifier, e.g. `IN BOOLEAN MODE`.
    pub modifier: Option<&'a str>,
}

/// Trait for SQL dialect-specific behavior.
///
/// Operator rendering goes through two hooks: [`Dialect::render_operator`]
/// is an override slot consulted first, then [`Dialect::supports_operator`]
/// decides whether the shared default template may be used. An operator
/// that is neither overridden nor supported fails compilation.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the positional parameter placeholder.
    fn parameter_placeholder(&self) -> &'static str {
        "?"
    }

    /// Renders a named parameter marker.
    fn named_placeholder(&self, name: &str) -> String {
        format!(":{name}")
    }

    /// Quotes an identifier.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        format!("{quote}{name}{quote}")
    }

    /// Returns whether the default template may render `operator`.
    fn supports_operator(&self, operator: Operator) -> bool {
        let _ = operator;
        true
    }

    /// Renders `operator` in a dialect-specific way, or `None` to fall back
    /// to the default template.
    fn render_operator(&self, operator: Operator, args: &OperatorArgs<'_>) -> Option<String> {
        let _ = (operator, args);
        None
    }

    /// Returns whether the dialect knows the join kind.
    fn supports_join(&self, kind: JoinKind) -> bool {
        let _ = kind;
        true
    }

    /// Renders the LIMIT clause.
    fn limit_clause(&self, limit: &LimitSpec) -> String {
        match limit.offset {
            Some(offset) => format!("LIMIT {} OFFSET {offset}", limit.limit),
            None => format!("LIMIT {}", limit.limit),
        }
    }

    /// Renders an insert from a wrapped table and `(wrapped column, marker)`
    /// pairs.
    fn insert_statement(&self, table: &str, assignments: &[(String, String)]) -> String {
        let set = assignments
            .iter()
            .map(|(column, marker)| format!("{column} = {marker}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("INSERT INTO {table} SET {set}")
    }

    /// Renders the statement emptying an already wrapped table.
    fn truncate_table(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {table}")
    }

    /// Renders the statement describing a table, given its raw name.
    fn show_table(&self, table: &str) -> String {
        format!(
            "SELECT * FROM information_schema.tables WHERE table_name = '{}'",
            table.replace('\'', "''")
        )
    }
}
