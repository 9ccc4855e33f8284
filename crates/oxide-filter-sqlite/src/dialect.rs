//! SQLite dialect implementation.

use oxide_filter::dialect::{Dialect, OperatorArgs};
use oxide_filter::operator::{JoinKind, Operator};

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn supports_operator(&self, operator: Operator) -> bool {
        !matches!(operator, Operator::Strcmp | Operator::FindInSet)
    }

    fn render_operator(&self, operator: Operator, args: &OperatorArgs<'_>) -> Option<String> {
        // FTS5 matches on the table or column name and takes no modifier.
        (operator == Operator::MatchAgainst)
            .then(|| format!("{} MATCH {}", args.column, args.value))
    }

    fn supports_join(&self, kind: JoinKind) -> bool {
        kind != JoinKind::Straight
    }

    fn insert_statement(&self, table: &str, assignments: &[(String, String)]) -> String {
        let (columns, markers): (Vec<&str>, Vec<&str>) = assignments
            .iter()
            .map(|(column, marker)| (column.as_str(), marker.as_str()))
            .unzip();
        format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            markers.join(", ")
        )
    }

    fn truncate_table(&self, table: &str) -> String {
        format!("DELETE FROM {table}")
    }

    fn show_table(&self, table: &str) -> String {
        format!(
            "SELECT * FROM sqlite_master WHERE type = 'table' AND name = '{}'",
            table.replace('\'', "''")
        )
    }
}
