//! Join clauses.

use serde::{Deserialize, Serialize};

use crate::filter::predicate::{PredicateNode, PredicateValue};
use crate::operator::{Connector, JoinKind, Operator};

/// One join clause: target table, join kind and ON conditions.
///
/// ON conditions chain through each node's connector and compile like a
/// flat where list; there is no nesting inside a single join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    table: String,
    #[serde(default)]
    kind: JoinKind,
    #[serde(default)]
    on: Vec<PredicateNode>,
}

impl Join {
    /// Creates a join without conditions.
    #[must_use]
    pub fn new(table: impl Into<String>, kind: JoinKind) -> Self {
        Self {
            table: table.into(),
            kind,
            on: vec![],
        }
    }

    /// Appends an ON condition comparing two columns, bound with AND.
    #[must_use]
    pub fn on(self, column1: &str, operator: Operator, column2: &str) -> Self {
        self.on_with(column1, operator, column2, Connector::And)
    }

    /// Appends an ON condition bound to the next one through `connector`.
    #[must_use]
    pub fn on_with(
        mut self,
        column1: &str,
        operator: Operator,
        column2: &str,
        connector: Connector,
    ) -> Self {
        self.on.push(
            PredicateNode::new(
                column1,
                operator,
                PredicateValue::Column(String::from(column2)),
                connector,
            )
            .unmasked(),
        );
        self
    }

    /// Returns the target table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the join kind.
    #[must_use]
    pub const fn kind(&self) -> JoinKind {
        self.kind
    }

    /// Returns the ON conditions.
    #[must_use]
    pub fn conditions(&self) -> &[PredicateNode] {
        &self.on
    }

    /// Returns true when at least one ON condition exists.
    #[must_use]
    pub fn has_conditions(&self) -> bool {
        !self.on.is_empty()
    }
}
