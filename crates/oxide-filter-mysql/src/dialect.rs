//! MySQL dialect implementation.

use oxide_filter::dialect::Dialect;
use oxide_filter::filter::LimitSpec;

/// MySQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn limit_clause(&self, limit: &LimitSpec) -> String {
        match limit.offset {
            Some(offset) => format!("LIMIT {offset}, {}", limit.limit),
            None => format!("LIMIT {}", limit.limit),
        }
    }

    fn truncate_table(&self, table: &str) -> String {
        format!("TRUNCATE {table}")
    }

    fn show_table(&self, table: &str) -> String {
        format!("SHOW TABLE STATUS LIKE '{}'", table.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_filter::operator::{JoinKind, Operator};

    #[test]
    fn test_mysql_dialect() {
        let dialect = MysqlDialect::new();
        assert_eq!(dialect.name(), "mysql");
        assert_eq!(dialect.identifier_quote(), '`');
        assert_eq!(dialect.quote_identifier("users"), "`users`");
        assert_eq!(dialect.parameter_placeholder(), "?");
        assert!(dialect.supports_operator(Operator::MatchAgainst));
        assert!(dialect.supports_join(JoinKind::Straight));
    }

    #[test]
    fn test_mysql_limit_puts_offset_first() {
        let dialect = MysqlDialect::new();
        assert_eq!(
            dialect.limit_clause(&LimitSpec {
                limit: 10,
                offset: Some(30)
            }),
            "LIMIT 30, 10"
        );
    }

    #[test]
    fn test_mysql_show_escapes_name() {
        assert_eq!(
            MysqlDialect::new().show_table("o'brien"),
            "SHOW TABLE STATUS LIKE 'o''brien'"
        );
    }
}
