//! Column-reference detection for string values.
//!
//! A `where` value such as `"orders.user_id"` may be meant as a column rather
//! than a string literal. Guessing wrong in either direction silently changes
//! the statement, so detection only happens when a [`ColumnLookup`] is
//! attached to the filter, and only through that lookup.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Decides whether a string value names a column.
pub trait ColumnLookup: fmt::Debug + Send + Sync {
    /// Returns true when `value` should be wrapped as a column reference
    /// instead of being bound as a parameter.
    fn is_column_reference(&self, value: &str) -> bool;
}

/// A lookup over a fixed set of `table -> columns`.
///
/// Matches values of the form `table.column` (exactly one dot) where the
/// table is known and owns the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownColumns {
    tables: HashMap<String, HashSet<String>>,
}

impl KnownColumns {
    /// Creates an empty lookup that never matches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers columns for a table.
    #[must_use]
    pub fn table<I, S>(mut self, table: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .entry(String::from(table))
            .or_default()
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Returns true when no table is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for KnownColumns {
    fn from_iter<T: IntoIterator<Item = (S, Vec<String>)>>(iter: T) -> Self {
        let mut tables: HashMap<String, HashSet<String>> = HashMap::new();
        for (table, columns) in iter {
            tables.entry(table.into()).or_default().extend(columns);
        }
        Self { tables }
    }
}

impl ColumnLookup for KnownColumns {
    fn is_column_reference(&self, value: &str) -> bool {
        let mut parts = value.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(table), Some(column), None) => self
                .tables
                .get(table)
                .is_some_and(|columns| columns.contains(column)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_columns_match() {
        let lookup = KnownColumns::new().table("orders", ["user_id", "total"]);
        assert!(lookup.is_column_reference("orders.user_id"));
        assert!(!lookup.is_column_reference("orders.missing"));
        assert!(!lookup.is_column_reference("users.user_id"));
        assert!(!lookup.is_column_reference("orders.user_id.x"));
        assert!(!lookup.is_column_reference("hello world."));
    }

    #[test]
    fn test_empty_lookup_never_matches() {
        assert!(KnownColumns::new().is_empty());
        assert!(!KnownColumns::new().is_column_reference("a.b"));
    }
}
