//! Driver name to dialect lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{Dialect, GenericDialect};
use crate::error::{FilterError, Result};

/// Maps driver names to dialects.
///
/// Names are matched case-insensitively. Registering a name twice replaces
/// the earlier dialect.
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: HashMap<String, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the generic dialect under `generic`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("generic", Arc::new(GenericDialect::new()));
        registry
    }

    /// Registers `dialect` under `driver`.
    pub fn register(&mut self, driver: &str, dialect: Arc<dyn Dialect>) -> &mut Self {
        debug!(driver, dialect = dialect.name(), "registering dialect");
        self.dialects.insert(driver.trim().to_lowercase(), dialect);
        self
    }

    /// Looks up the dialect for `driver`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedDriver`] when nothing is registered
    /// under that name.
    pub fn get(&self, driver: &str) -> Result<Arc<dyn Dialect>> {
        self.dialects
            .get(&driver.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| FilterError::UnsupportedDriver(String::from(driver)))
    }

    /// Returns true when `driver` is registered.
    #[must_use]
    pub fn contains(&self, driver: &str) -> bool {
        self.dialects.contains_key(&driver.trim().to_lowercase())
    }

    /// Returns the registered driver names, sorted.
    #[must_use]
    pub fn drivers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_hold_generic() {
        let registry = DialectRegistry::with_defaults();
        assert_eq!(registry.drivers(), vec!["generic"]);
        assert_eq!(registry.get("GENERIC").unwrap().name(), "generic");
    }

    #[test]
    fn test_unknown_driver() {
        let registry = DialectRegistry::with_defaults();
        assert!(!registry.contains("oracle"));
        assert_eq!(
            registry.get("oracle").unwrap_err(),
            FilterError::UnsupportedDriver(String::from("oracle"))
        );
    }
}
