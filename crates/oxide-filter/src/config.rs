//! Compiler configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::filter::lookup::KnownColumns;

/// Settings a [`Compiler`](crate::compiler::Compiler) is built from.
///
/// Every field has a default, so `{}` is a valid JSON configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Driver name resolved through the dialect registry.
    pub driver: String,
    /// Prefix inserted before every table name.
    pub table_prefix: Option<String>,
    /// `table -> columns` used to recognise column references among string
    /// values.
    pub known_columns: BTreeMap<String, Vec<String>>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            driver: String::from("generic"),
            table_prefix: None,
            known_columns: BTreeMap::new(),
        }
    }
}

impl CompilerConfig {
    /// Builds the column lookup from `known_columns`, if any are configured.
    #[must_use]
    pub fn column_lookup(&self) -> Option<Arc<KnownColumns>> {
        if self.known_columns.is_empty() {
            return None;
        }
        Some(Arc::new(
            self.known_columns
                .iter()
                .map(|(table, columns)| (table.clone(), columns.clone()))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::lookup::ColumnLookup;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: CompilerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CompilerConfig::default());
        assert_eq!(config.driver, "generic");
        assert!(config.column_lookup().is_none());
    }

    #[test]
    fn test_known_columns_lookup() {
        let config: CompilerConfig = serde_json::from_str(
            r#"{
                "driver": "mysql",
                "table_prefix": "app_",
                "known_columns": {"orders": ["user_id"]}
            }"#,
        )
        .unwrap();
        assert_eq!(config.table_prefix.as_deref(), Some("app_"));
        let lookup = config.column_lookup().unwrap();
        assert!(lookup.is_column_reference("orders.user_id"));
        assert!(!lookup.is_column_reference("orders.total"));
    }
}
