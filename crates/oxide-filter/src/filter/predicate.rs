//! Predicate nodes and nested predicate groups.

use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::operator::{Connector, Operator};
use crate::value::{SqlValue, ToSqlValue};

/// Which builder call produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// `where`/`having` and the join ON conditions.
    #[default]
    Where,
    /// Primary-key addressing through named bindings.
    Key,
    /// `like`/`not_like`.
    Like,
    /// `match_against`.
    Match,
    /// `between`/`not_between`.
    Between,
    /// Opaque sub-statement.
    Subselect,
    /// Verbatim fragment, never wrapped or masked.
    Raw,
}

/// The right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateValue {
    /// No value (IS family, raw fragments).
    #[default]
    None,
    /// One value.
    Scalar(SqlValue),
    /// A list of values, one placeholder each.
    List(Vec<SqlValue>),
    /// Lower and upper bound, two independent placeholders.
    Range(SqlValue, SqlValue),
    /// An immediate fragment whose markers become placeholders.
    Expr(Expression),
    /// Another column, wrapped rather than masked.
    Column(String),
    /// Named binding markers, without the leading colon.
    Named(Vec<String>),
    /// Sub-statement text, rendered parenthesized.
    Statement(String),
}

impl PredicateValue {
    /// Returns the values this predicate contributes to the positional list.
    #[must_use]
    pub fn positional_values(&self) -> Vec<SqlValue> {
        match self {
            Self::Scalar(v) => vec![v.clone()],
            Self::List(values) => values.clone(),
            Self::Range(min, max) => vec![min.clone(), max.clone()],
            Self::Expr(expr) => expr.values().to_vec(),
            Self::None | Self::Column(_) | Self::Named(_) | Self::Statement(_) => vec![],
        }
    }
}

/// One column/operator/value/connector unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateNode {
    /// The builder call that produced the node.
    #[serde(default)]
    pub kind: NodeKind,
    /// Column reference, or the fragment itself for raw nodes.
    pub column: String,
    /// Comparison operator.
    #[serde(default = "default_operator")]
    pub operator: Operator,
    /// Right-hand side.
    #[serde(default)]
    pub value: PredicateValue,
    /// How this node binds to the next sibling.
    #[serde(default)]
    pub connector: Connector,
    /// Whether values are replaced by placeholders.
    #[serde(default = "default_mask")]
    pub mask: bool,
    /// Trailing modifier, e.g. `IN BOOLEAN MODE` for full-text search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
}

const fn default_operator() -> Operator {
    Operator::Equal
}

const fn default_mask() -> bool {
    true
}

impl PredicateNode {
    /// Creates a maskable `where` node.
    #[must_use]
    pub fn new(
        column: impl Into<String>,
        operator: Operator,
        value: PredicateValue,
        connector: Connector,
    ) -> Self {
        Self {
            kind: NodeKind::Where,
            column: column.into(),
            operator,
            value,
            connector,
            mask: true,
            modifier: None,
        }
    }

    /// Creates a raw node rendered verbatim.
    #[must_use]
    pub fn raw(fragment: impl Into<String>, connector: Connector) -> Self {
        Self {
            kind: NodeKind::Raw,
            column: fragment.into(),
            operator: Operator::Equal,
            value: PredicateValue::None,
            connector,
            mask: false,
            modifier: None,
        }
    }

    /// Sets the node kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Disables value masking.
    #[must_use]
    pub const fn unmasked(mut self) -> Self {
        self.mask = false;
        self
    }

    /// Sets the trailing modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: Option<String>) -> Self {
        self.modifier = modifier;
        self
    }
}

/// An element of a predicate list: a terminal node or a bracketed group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Predicate {
    /// A bracketed sub-expression.
    Group(Vec<Predicate>),
    /// A terminal node.
    Node(PredicateNode),
}

impl Predicate {
    /// Returns the connector that binds this element to its next sibling.
    ///
    /// For a group that is the connector of its deepest trailing node.
    #[must_use]
    pub fn trailing_connector(&self) -> Connector {
        match self {
            Self::Node(node) => node.connector,
            Self::Group(list) => list
                .last()
                .map_or(Connector::And, Self::trailing_connector),
        }
    }

    /// Returns the terminal node, if this is one.
    #[must_use]
    pub const fn as_node(&self) -> Option<&PredicateNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Group(_) => None,
        }
    }

    /// Counts terminal nodes, descending into groups.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Node(_) => 1,
            Self::Group(list) => list.iter().map(Self::node_count).sum(),
        }
    }
}

impl From<PredicateNode> for Predicate {
    fn from(node: PredicateNode) -> Self {
        Self::Node(node)
    }
}

/// Overwrites the connector of the deepest trailing node of `list`.
///
/// Descends through the last element of each nested list until a terminal
/// node is reached. Returns false when the list holds no terminal node.
pub fn renest(list: &mut [Predicate], connector: Connector) -> bool {
    match list.last_mut() {
        Some(Predicate::Node(node)) => {
            node.connector = connector;
            true
        }
        Some(Predicate::Group(inner)) => renest(inner, connector),
        None => false,
    }
}

/// A value accepted by the `where`/`having` family.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WhereValue {
    /// No value; the IS family ignores whatever is given anyway.
    #[default]
    None,
    /// A single value.
    Scalar(SqlValue),
    /// A list of values (`IN`, `NOT IN`, ...).
    List(Vec<SqlValue>),
    /// An immediate fragment.
    Expr(Expression),
}

impl WhereValue {
    /// Builds a list value.
    #[must_use]
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        Self::List(values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }

    /// Splits string values on whitespace into a list.
    #[must_use]
    pub(crate) fn split_terms(self) -> Self {
        match self {
            Self::Scalar(SqlValue::Text(text)) => Self::List(
                text.split_whitespace()
                    .map(|term| SqlValue::Text(String::from(term)))
                    .collect(),
            ),
            Self::Scalar(value) => Self::List(vec![value]),
            Self::List(values) => Self::List(
                values
                    .into_iter()
                    .flat_map(|value| match value {
                        SqlValue::Text(text) => text
                            .split_whitespace()
                            .map(|term| SqlValue::Text(String::from(term)))
                            .collect::<Vec<_>>(),
                        other => vec![other],
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    /// Converts into the stored predicate value.
    pub(crate) fn into_predicate_value(self) -> PredicateValue {
        match self {
            Self::None => PredicateValue::None,
            Self::Scalar(v) => PredicateValue::Scalar(v),
            Self::List(values) => PredicateValue::List(values),
            Self::Expr(expr) => PredicateValue::Expr(expr),
        }
    }
}

impl From<Expression> for WhereValue {
    fn from(expr: Expression) -> Self {
        Self::Expr(expr)
    }
}

impl From<Vec<SqlValue>> for WhereValue {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::List(values)
    }
}

impl From<()> for WhereValue {
    fn from((): ()) -> Self {
        Self::None
    }
}

macro_rules! scalar_where_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for WhereValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.to_sql_value())
                }
            }
        )*
    };
}

scalar_where_value!(
    SqlValue, bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, String, &String, &str
);

impl<T: ToSqlValue> From<Option<T>> for WhereValue {
    fn from(value: Option<T>) -> Self {
        Self::Scalar(value.to_sql_value())
    }
}
