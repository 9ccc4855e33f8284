//! Error types for filter building and compilation.

use thiserror::Error;

use crate::operator::{Action, Operator};

/// Errors raised while building or compiling a filter.
///
/// Every variant is a caller contract violation: nothing here is transient
/// and nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The action is not one of select, insert, update or delete.
    #[error("unsupported action: '{0}' (only crud actions are allowed)")]
    UnsupportedAction(String),

    /// The operator token is unknown to the normalizer.
    #[error("operator: '{0}' is not supported")]
    UnsupportedOperator(String),

    /// The connector token is unknown to the normalizer.
    #[error("connector: '{0}' is not supported")]
    UnsupportedConnector(String),

    /// The order direction is neither ASC nor DESC.
    #[error("order direction: '{0}' is not supported")]
    UnsupportedDirection(String),

    /// The join kind is unknown or not available in the dialect.
    #[error("join type: '{kind}' is not supported by dialect '{dialect}'")]
    UnsupportedJoin {
        /// The offending join kind token.
        kind: String,
        /// The dialect that rejected it (`"filter"` for parse failures).
        dialect: String,
    },

    /// Parallel name/value lists differ in length.
    #[error("{columns} columns/keys but {values} values: lists must have equal length")]
    MismatchedArity {
        /// Number of column names given.
        columns: usize,
        /// Number of values given.
        values: usize,
    },

    /// A shorthand join was given no second column.
    #[error("join on table '{table}' requires a second column")]
    MissingColumn2 {
        /// The join target table.
        table: String,
    },

    /// `key()` was called on a select filter.
    #[error("key '{column}' is not allowed for select statements")]
    KeyNotAllowedForSelect {
        /// The key column.
        column: String,
    },

    /// A property name outside the closed property set.
    #[error("unable to access '{0}': property does not exist")]
    UnknownFilterProperty(String),

    /// The active dialect has no rendering for the operator.
    #[error("where condition operator: {operator} is not supported by dialect '{dialect}'")]
    UnsupportedWhereOperator {
        /// The operator without a template.
        operator: Operator,
        /// The dialect name.
        dialect: String,
    },

    /// No dialect is registered under the driver name.
    #[error("driver dependent compiler for '{0}' is not registered")]
    UnsupportedDriver(String),

    /// The statement has no table to operate on.
    #[error("{action} statement requires a table")]
    MissingTable {
        /// The statement action.
        action: Action,
    },

    /// An insert or update has nothing to assign.
    #[error("{action} statement requires at least one binding to set")]
    MissingBindings {
        /// The statement action.
        action: Action,
    },
}

/// Result type alias for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
