//! Identifier quoting for columns and tables.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::dialect::Dialect;

static QUALIFIED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+)\.(\*|[A-Za-z0-9_]+)").ok());

/// Quotes identifiers for one dialect and optional table prefix.
#[derive(Debug, Clone, Copy)]
pub struct Wrapper<'a> {
    dialect: &'a dyn Dialect,
    prefix: Option<&'a str>,
}

impl<'a> Wrapper<'a> {
    /// Creates a wrapper.
    #[must_use]
    pub const fn new(dialect: &'a dyn Dialect, prefix: Option<&'a str>) -> Self {
        Self { dialect, prefix }
    }

    /// Wraps a column reference or a comma list of them.
    ///
    /// - `name` becomes one quoted token.
    /// - `table.column` has each segment quoted and the table prefixed;
    ///   `table.*` keeps the star bare.
    /// - Anything else (`*`, function calls, numbers) is left as written.
    #[must_use]
    pub fn column(&self, value: &str) -> String {
        split_top_level(value)
            .into_iter()
            .map(|piece| self.piece(piece))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Wraps a predicate column; a column list is parenthesized as a row
    /// constructor.
    #[must_use]
    pub fn where_column(&self, value: &str) -> String {
        let wrapped = self.column(value);
        if split_top_level(value).len() > 1 {
            format!("({wrapped})")
        } else {
            wrapped
        }
    }

    /// Wraps a table name, applying the prefix.
    #[must_use]
    pub fn table(&self, table: &str) -> String {
        let table = table.trim();
        if is_identifier(table) {
            self.dialect.quote_identifier(&self.prefixed(table))
        } else {
            self.column(table)
        }
    }

    /// Wraps an alias, which is never prefixed.
    #[must_use]
    pub fn alias(&self, alias: &str) -> String {
        let alias = alias.trim();
        if is_identifier(alias) {
            self.dialect.quote_identifier(alias)
        } else {
            String::from(alias)
        }
    }

    fn piece(&self, piece: &str) -> String {
        if is_identifier(piece) {
            return self.dialect.quote_identifier(piece);
        }
        if !piece.contains('.') {
            return String::from(piece);
        }
        let Some(pattern) = QUALIFIED.as_ref() else {
            return String::from(piece);
        };
        pattern
            .replace_all(piece, |caps: &Captures<'_>| {
                let whole = &caps[0];
                if !whole.chars().any(|c| c.is_ascii_alphabetic()) {
                    return String::from(whole);
                }
                let column = &caps[2];
                let column = if column == "*" {
                    String::from("*")
                } else {
                    self.dialect.quote_identifier(column)
                };
                format!(
                    "{}.{column}",
                    self.dialect.quote_identifier(&self.prefixed(&caps[1]))
                )
            })
            .into_owned()
    }

    fn prefixed(&self, table: &str) -> String {
        self.prefix
            .map_or_else(|| String::from(table), |prefix| format!("{prefix}{table}"))
    }
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits on commas that are not inside parentheses or quotes.
fn split_top_level(value: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                pieces.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(value[start..].trim());
    pieces
}
