//! Generic SQL dialect.

use super::Dialect;

/// A generic SQL dialect: double-quoted identifiers, `LIMIT n OFFSET m`,
/// and the full default operator table.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }
}
