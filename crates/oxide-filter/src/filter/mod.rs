//! The structured, mutable statement descriptor.
//!
//! A [`Filter`] describes one CRUD statement as data: action, tables,
//! fields, where/having predicate trees, grouping, ordering, pagination,
//! joins, and the parameter sources (positional values and named bindings).
//! It is built through chained calls, handed to a
//! [`Compiler`](crate::compiler::Compiler) once, then discarded.
//!
//! # Example
//!
//! ```rust
//! use oxide_filter::{Connector, Filter, SqlValue};
//!
//! let filter = Filter::select("users")
//!     .where_clause("active", true)
//!     .nest_with(
//!         |inner| inner.where_clause("role", "admin").or_where("role", "owner"),
//!         Some(Connector::And),
//!     )
//!     .limit(10);
//!
//! assert_eq!(
//!     filter.values(),
//!     &[
//!         SqlValue::Bool(true),
//!         SqlValue::Text(String::from("admin")),
//!         SqlValue::Text(String::from("owner")),
//!     ]
//! );
//! ```

pub mod lookup;
pub mod predicate;
pub mod property;

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{FilterError, Result};
use crate::expression::Expression;
use crate::join::Join;
use crate::operator::{Action, Connector, Direction, JoinKind, Operator};
use crate::value::{SqlValue, ToSqlValue};

use lookup::ColumnLookup;
use predicate::{renest, NodeKind, Predicate, PredicateNode, PredicateValue, WhereValue};
use property::{Property, PropertyRef};

/// A table reference with optional alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    /// Table name.
    pub table: String,
    /// Optional alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// What a selected field is made of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSource {
    /// A column, optionally `table.column`.
    Column(String),
    /// An immediate fragment rendered literally.
    Expr(Expression),
}

/// A selected field with optional alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    /// The field.
    pub field: FieldSource,
    /// Optional alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// A GROUP BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Column, optionally `table.column`.
    pub column: String,
    /// Trailing modifier such as `WITH ROLLUP`. Only the last entry's
    /// modifier is rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    /// Column, optionally `table.column`.
    pub column: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: Direction,
}

/// LIMIT with optional OFFSET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitSpec {
    /// Maximum number of rows.
    pub limit: u64,
    /// Rows to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// Structured description of one CRUD statement.
///
/// The action is fixed at construction. Every other property is mutated
/// through consuming builder calls; values appended by predicates land in
/// the positional list in call order, and `set`/`key` fill the named
/// binding map.
///
/// Cloning a filter keeps everything except the where predicates.
#[derive(Debug, Serialize, Deserialize)]
pub struct Filter {
    action: Action,
    #[serde(default)]
    distinct: bool,
    #[serde(default)]
    table: Vec<TableRef>,
    #[serde(default)]
    field: Vec<FieldRef>,
    #[serde(default, rename = "where")]
    where_: Vec<Predicate>,
    #[serde(default)]
    having: Vec<Predicate>,
    #[serde(default)]
    group: Vec<GroupSpec>,
    #[serde(default)]
    order: Vec<OrderSpec>,
    #[serde(default)]
    limit: Option<LimitSpec>,
    #[serde(default)]
    join: Vec<Join>,
    #[serde(default)]
    values: Vec<SqlValue>,
    #[serde(default, deserialize_with = "deserialize_bindings")]
    bindings: IndexMap<String, SqlValue>,
    #[serde(skip)]
    lookup: Option<Arc<dyn ColumnLookup>>,
}

impl Clone for Filter {
    fn clone(&self) -> Self {
        Self {
            action: self.action,
            distinct: self.distinct,
            table: self.table.clone(),
            field: self.field.clone(),
            where_: vec![],
            having: self.having.clone(),
            group: self.group.clone(),
            order: self.order.clone(),
            limit: self.limit,
            join: self.join.clone(),
            values: self.values.clone(),
            bindings: self.bindings.clone(),
            lookup: self.lookup.clone(),
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new(Action::Select)
    }
}

// Construction
impl Filter {
    /// Creates an empty filter for `action`.
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            action,
            distinct: false,
            table: vec![],
            field: vec![],
            where_: vec![],
            having: vec![],
            group: vec![],
            order: vec![],
            limit: None,
            join: vec![],
            values: vec![],
            bindings: IndexMap::new(),
            lookup: None,
        }
    }

    /// Creates an empty filter from an action name.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedAction`] for anything other than
    /// select, insert, update or delete.
    pub fn parse_action(action: &str) -> Result<Self> {
        Ok(Self::new(action.parse()?))
    }

    /// Creates a select filter on `table`.
    #[must_use]
    pub fn select(table: &str) -> Self {
        Self::new(Action::Select).table(table)
    }

    /// Creates an insert filter on `table`.
    #[must_use]
    pub fn insert(table: &str) -> Self {
        Self::new(Action::Insert).table(table)
    }

    /// Creates an update filter on `table`.
    #[must_use]
    pub fn update(table: &str) -> Self {
        Self::new(Action::Update).table(table)
    }

    /// Creates a delete filter on `table`.
    #[must_use]
    pub fn delete(table: &str) -> Self {
        Self::new(Action::Delete).table(table)
    }

    /// Shortcut for [`Expression::create`].
    #[must_use]
    pub fn expr(expr: &str, values: Vec<SqlValue>) -> Expression {
        Expression::create(expr, values)
    }

    /// Normalizes an operator token.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedOperator`] for unknown tokens.
    pub fn map_operator(operator: &str) -> Result<Operator> {
        operator.parse()
    }

    /// Normalizes a connector token.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedConnector`] for unknown tokens.
    pub fn map_connector(connector: &str) -> Result<Connector> {
        connector.parse()
    }

    /// Attaches the lookup deciding whether string values name columns.
    ///
    /// Only values appended after this call are checked.
    #[must_use]
    pub fn with_column_lookup(mut self, lookup: Arc<dyn ColumnLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Attaches `lookup` and re-checks the string values already stored in
    /// the where and having predicates, e.g. after loading a filter from JSON.
    ///
    /// Matching values become column references and leave the positional
    /// list. This needs the positional list to follow predicate order (where
    /// before having, no values from raw fragments or sub-statements);
    /// otherwise the existing values are left as they are.
    #[must_use]
    pub fn resolve_columns(mut self, lookup: Arc<dyn ColumnLookup>) -> Self {
        let mut expected = Vec::with_capacity(self.values.len());
        collect_positional(&self.where_, &mut expected);
        collect_positional(&self.having, &mut expected);

        if expected == self.values {
            let resolved = resolve_list(&mut self.where_, lookup.as_ref())
                + resolve_list(&mut self.having, lookup.as_ref());
            if resolved > 0 {
                self.values.clear();
                collect_positional(&self.where_, &mut self.values);
                collect_positional(&self.having, &mut self.values);
                trace!(resolved, "string values resolved to column references");
            }
        } else {
            warn!(
                values = self.values.len(),
                expected = expected.len(),
                "positional values do not follow predicate order, column references not resolved"
            );
        }
        self.lookup = Some(lookup);
        self
    }
}

// Tables, fields and bindings
impl Filter {
    /// Adds a table.
    #[must_use]
    pub fn table(mut self, table: &str) -> Self {
        self.table.push(TableRef {
            table: String::from(table),
            alias: None,
        });
        self
    }

    /// Adds an aliased table.
    #[must_use]
    pub fn table_as(mut self, table: &str, alias: &str) -> Self {
        self.table.push(TableRef {
            table: String::from(table),
            alias: Some(String::from(alias)),
        });
        self
    }

    /// Adds tables with aliases taken positionally; missing aliases are none.
    #[must_use]
    pub fn tables(mut self, tables: &[&str], aliases: &[&str]) -> Self {
        self.table.extend(tables.iter().enumerate().map(|(i, t)| TableRef {
            table: String::from(*t),
            alias: aliases.get(i).map(|a| String::from(*a)),
        }));
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: &str) -> Self {
        self.field.push(FieldRef {
            field: FieldSource::Column(String::from(field)),
            alias: None,
        });
        self
    }

    /// Adds an aliased field.
    #[must_use]
    pub fn field_as(mut self, field: &str, alias: &str) -> Self {
        self.field.push(FieldRef {
            field: FieldSource::Column(String::from(field)),
            alias: Some(String::from(alias)),
        });
        self
    }

    /// Adds fields with aliases taken positionally; missing aliases are none.
    #[must_use]
    pub fn fields(mut self, fields: &[&str], aliases: &[&str]) -> Self {
        self.field.extend(fields.iter().enumerate().map(|(i, f)| FieldRef {
            field: FieldSource::Column(String::from(*f)),
            alias: aliases.get(i).map(|a| String::from(*a)),
        }));
        self
    }

    /// Adds an expression as a field, rendered literally.
    #[must_use]
    pub fn field_expr(mut self, expr: Expression, alias: Option<&str>) -> Self {
        self.field.push(FieldRef {
            field: FieldSource::Expr(expr),
            alias: alias.map(String::from),
        });
        self
    }

    /// Sets one named binding.
    #[must_use]
    pub fn set<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        self.bind(column, value.to_sql_value());
        self
    }

    /// Sets named bindings from parallel column and value lists.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MismatchedArity`] when the lists differ in
    /// length. No binding is set in that case.
    pub fn set_many(mut self, columns: &[&str], values: Vec<SqlValue>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(FilterError::MismatchedArity {
                columns: columns.len(),
                values: values.len(),
            });
        }
        for (column, value) in columns.iter().zip(values) {
            self.bind(column, value);
        }
        Ok(self)
    }

    /// Sets named bindings from column/value pairs.
    #[must_use]
    pub fn set_map<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToSqlValue,
    {
        for (column, value) in pairs {
            self.bind(column.as_ref(), value.to_sql_value());
        }
        self
    }

    /// Replaces the whole binding map; keys are normalized.
    #[must_use]
    pub fn with_bindings(mut self, bindings: IndexMap<String, SqlValue>) -> Self {
        self.bindings.clear();
        for (name, value) in bindings {
            self.bind(&name, value);
        }
        self
    }

    /// Replaces the whole positional value list.
    #[must_use]
    pub fn with_values(mut self, values: Vec<SqlValue>) -> Self {
        self.values = values;
        self
    }

    /// Addresses the row by primary key through a named binding.
    ///
    /// Produces `key = :key` with the binding `key -> value`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::KeyNotAllowedForSelect`] on a select filter.
    pub fn key<T: ToSqlValue>(self, column: &str, value: T) -> Result<Self> {
        self.push_key(column, KeyValue::One(value.to_sql_value()))
    }

    /// Addresses several rows by primary key.
    ///
    /// Produces `key IN(:key0, :key1, ...)` with one binding per element.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::KeyNotAllowedForSelect`] on a select filter.
    pub fn key_in<I, T>(self, column: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        let values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        self.push_key(column, KeyValue::Many(values))
    }

    fn push_key(mut self, column: &str, value: KeyValue) -> Result<Self> {
        if self.action == Action::Select {
            return Err(FilterError::KeyNotAllowedForSelect {
                column: String::from(column),
            });
        }
        let name = normalize_binding(column);
        let (operator, names) = match value {
            KeyValue::One(value) => {
                self.bindings.insert(name.clone(), value);
                (Operator::Equal, vec![name])
            }
            KeyValue::Many(values) => {
                let mut names = Vec::with_capacity(values.len());
                for (i, value) in values.into_iter().enumerate() {
                    let indexed = format!("{name}{i}");
                    self.bindings.insert(indexed.clone(), value);
                    names.push(indexed);
                }
                (Operator::In, names)
            }
        };
        let node = PredicateNode::new(
            column,
            operator,
            PredicateValue::Named(names),
            Connector::And,
        )
        .with_kind(NodeKind::Key)
        .unmasked();
        self.where_.push(node.into());
        Ok(self)
    }

    fn bind(&mut self, name: &str, value: SqlValue) {
        self.bindings.insert(normalize_binding(name), value);
    }
}

enum KeyValue {
    One(SqlValue),
    Many(Vec<SqlValue>),
}

/// Trims whitespace and binding markers (`:`) from a binding name.
#[must_use]
pub fn normalize_binding(name: &str) -> String {
    String::from(name.trim().trim_matches(':').trim())
}

fn deserialize_bindings<'de, D>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, SqlValue>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let bindings = IndexMap::<String, SqlValue>::deserialize(deserializer)?;
    Ok(bindings
        .into_iter()
        .map(|(name, value)| (normalize_binding(&name), value))
        .collect())
}

fn collect_positional(list: &[Predicate], out: &mut Vec<SqlValue>) {
    for predicate in list {
        match predicate {
            Predicate::Node(node) => out.extend(node.value.positional_values()),
            Predicate::Group(inner) => collect_positional(inner, out),
        }
    }
}

/// Turns string scalars naming a column into column references; returns
/// how many were turned.
fn resolve_list(list: &mut [Predicate], lookup: &dyn ColumnLookup) -> usize {
    let mut resolved = 0;
    for predicate in list {
        match predicate {
            Predicate::Node(node) => {
                let skipped = !node.mask
                    || matches!(node.kind, NodeKind::Raw | NodeKind::Key | NodeKind::Subselect);
                if skipped {
                    continue;
                }
                let column = match &node.value {
                    PredicateValue::Scalar(SqlValue::Text(text))
                        if lookup.is_column_reference(text) =>
                    {
                        text.clone()
                    }
                    _ => continue,
                };
                node.value = PredicateValue::Column(column);
                resolved += 1;
            }
            Predicate::Group(inner) => resolved += resolve_list(inner, lookup),
        }
    }
    resolved
}

// Predicates
impl Filter {
    /// Appends `column = value`, bound with AND.
    #[must_use]
    pub fn where_clause(self, column: &str, value: impl Into<WhereValue>) -> Self {
        self.where_with(column, value, Operator::Equal, Connector::And)
    }

    /// Appends `column = value`, bound with OR.
    #[must_use]
    pub fn or_where(self, column: &str, value: impl Into<WhereValue>) -> Self {
        self.where_with(column, value, Operator::Equal, Connector::Or)
    }

    /// Appends `column <operator> value`, bound with AND.
    #[must_use]
    pub fn where_op(self, column: &str, operator: Operator, value: impl Into<WhereValue>) -> Self {
        self.where_with(column, value, operator, Connector::And)
    }

    /// Appends `column IN (values)`, bound with AND.
    #[must_use]
    pub fn where_in<I, T>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        self.where_with(column, WhereValue::list(values), Operator::In, Connector::And)
    }

    /// Appends `column IS NULL`, bound with AND.
    #[must_use]
    pub fn where_null(self, column: &str) -> Self {
        self.where_with(column, (), Operator::IsNull, Connector::And)
    }

    /// Appends `column IS NOT NULL`, bound with AND.
    #[must_use]
    pub fn where_not_null(self, column: &str) -> Self {
        self.where_with(column, (), Operator::IsNotNull, Connector::And)
    }

    /// Appends a where predicate.
    ///
    /// `FIND_IN_SET` and `MATCH_AGAINST` split string values on whitespace
    /// first. The IS family consumes no value; every other operator appends
    /// its value(s) to the positional list.
    #[must_use]
    pub fn where_with(
        mut self,
        column: &str,
        value: impl Into<WhereValue>,
        operator: Operator,
        connector: Connector,
    ) -> Self {
        let node = self.value_node(column, value.into(), operator, connector);
        self.where_.push(node.into());
        self
    }

    /// Appends `column LIKE value`.
    #[must_use]
    pub fn like(self, column: &str, value: impl Into<WhereValue>) -> Self {
        self.like_with(column, value, Connector::And)
    }

    /// Appends `column LIKE value` bound through `connector`.
    #[must_use]
    pub fn like_with(
        self,
        column: &str,
        value: impl Into<WhereValue>,
        connector: Connector,
    ) -> Self {
        self.push_kind(column, value.into(), Operator::Like, connector, NodeKind::Like)
    }

    /// Appends `column NOT LIKE value`.
    #[must_use]
    pub fn not_like(self, column: &str, value: impl Into<WhereValue>) -> Self {
        self.not_like_with(column, value, Connector::And)
    }

    /// Appends `column NOT LIKE value` bound through `connector`.
    #[must_use]
    pub fn not_like_with(
        self,
        column: &str,
        value: impl Into<WhereValue>,
        connector: Connector,
    ) -> Self {
        self.push_kind(column, value.into(), Operator::NotLike, connector, NodeKind::Like)
    }

    /// Appends a full-text `MATCH (columns) AGAINST (value [modifier])`.
    ///
    /// List values are joined with spaces into a single search string.
    #[must_use]
    pub fn match_against(
        mut self,
        columns: &[&str],
        value: impl Into<WhereValue>,
        modifier: Option<&str>,
        connector: Connector,
    ) -> Self {
        let value = match value.into() {
            WhereValue::List(terms) => WhereValue::Scalar(SqlValue::Text(
                terms
                    .iter()
                    .map(SqlValue::to_plain)
                    .collect::<Vec<_>>()
                    .join(" "),
            )),
            other => other,
        };
        let node = PredicateNode::new(
            columns.join(", "),
            Operator::MatchAgainst,
            self.absorb(value),
            connector,
        )
        .with_kind(NodeKind::Match)
        .with_modifier(modifier.map(String::from));
        self.where_.push(node.into());
        self
    }

    /// Appends `column BETWEEN min AND max`.
    #[must_use]
    pub fn between<T: ToSqlValue, U: ToSqlValue>(self, column: &str, min: T, max: U) -> Self {
        self.push_range(column, min.to_sql_value(), max.to_sql_value(), Connector::And, false)
    }

    /// Appends `column BETWEEN min AND max` bound through `connector`.
    #[must_use]
    pub fn between_with<T: ToSqlValue, U: ToSqlValue>(
        self,
        column: &str,
        min: T,
        max: U,
        connector: Connector,
    ) -> Self {
        self.push_range(column, min.to_sql_value(), max.to_sql_value(), connector, false)
    }

    /// Appends `column NOT BETWEEN min AND max`.
    #[must_use]
    pub fn not_between<T: ToSqlValue, U: ToSqlValue>(self, column: &str, min: T, max: U) -> Self {
        self.push_range(column, min.to_sql_value(), max.to_sql_value(), Connector::And, true)
    }

    /// Appends `column NOT BETWEEN min AND max` bound through `connector`.
    #[must_use]
    pub fn not_between_with<T: ToSqlValue, U: ToSqlValue>(
        self,
        column: &str,
        min: T,
        max: U,
        connector: Connector,
    ) -> Self {
        self.push_range(column, min.to_sql_value(), max.to_sql_value(), connector, true)
    }

    /// Appends `column <operator> (query)` with an opaque sub-statement.
    ///
    /// The statement is rendered verbatim inside parentheses; `values` feed
    /// its placeholders and are appended to the positional list.
    #[must_use]
    pub fn subselect(
        mut self,
        column: &str,
        query: &str,
        values: Vec<SqlValue>,
        operator: Operator,
        connector: Connector,
    ) -> Self {
        let node = PredicateNode::new(
            column,
            operator,
            PredicateValue::Statement(String::from(query)),
            connector,
        )
        .with_kind(NodeKind::Subselect)
        .unmasked();
        self.where_.push(node.into());
        self.values.extend(values);
        self
    }

    /// Appends raw fragments, rendered verbatim.
    ///
    /// Connectors are taken positionally; fragments without one bind with
    /// AND. `values` are appended to the positional list as given.
    #[must_use]
    pub fn where_raw(
        mut self,
        fragments: &[&str],
        values: Vec<SqlValue>,
        connectors: &[Connector],
    ) -> Self {
        for (i, fragment) in fragments.iter().enumerate() {
            let connector = connectors.get(i).copied().unwrap_or_default();
            self.where_
                .push(PredicateNode::raw(*fragment, connector).into());
        }
        self.values.extend(values);
        self
    }

    /// Appends a having predicate `column = value`, bound with AND.
    #[must_use]
    pub fn having(self, column: &str, value: impl Into<WhereValue>) -> Self {
        self.having_with(column, value, Operator::Equal, Connector::And)
    }

    /// Appends a having predicate, with the same value rules as
    /// [`Filter::where_with`].
    #[must_use]
    pub fn having_with(
        mut self,
        column: &str,
        value: impl Into<WhereValue>,
        operator: Operator,
        connector: Connector,
    ) -> Self {
        let node = self.value_node(column, value.into(), operator, connector);
        self.having.push(node.into());
        self
    }

    /// Appends a bracketed group built by `build` on a fresh child filter.
    #[must_use]
    pub fn nest(self, build: impl FnOnce(Self) -> Self) -> Self {
        self.nest_with(build, None)
    }

    /// Appends a bracketed group built by `build` on a fresh child filter.
    ///
    /// The child's where list becomes one group and its positional values
    /// are merged into this filter's. With an explicit `connector`, the
    /// connector of the group's deepest trailing node is overwritten, which
    /// decides how the group binds to whatever follows it.
    #[must_use]
    pub fn nest_with(
        mut self,
        build: impl FnOnce(Self) -> Self,
        connector: Option<Connector>,
    ) -> Self {
        let mut child = Self::new(Action::Select);
        child.lookup.clone_from(&self.lookup);
        let mut child = build(child);

        if !child.where_.is_empty() {
            if let Some(connector) = connector {
                renest(&mut child.where_, connector);
            }
            trace!(
                nodes = child.where_.iter().map(Predicate::node_count).sum::<usize>(),
                "nesting predicate group"
            );
            self.where_.push(Predicate::Group(child.where_));
        }
        self.values.append(&mut child.values);
        self
    }

    /// Like [`Filter::nest_with`] for builders that can fail.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `build`.
    pub fn try_nest_with(
        self,
        build: impl FnOnce(Self) -> Result<Self>,
        connector: Option<Connector>,
    ) -> Result<Self> {
        let mut child = Self::new(Action::Select);
        child.lookup.clone_from(&self.lookup);
        let child = build(child)?;
        Ok(self.nest_with(|_| child, connector))
    }

    fn push_kind(
        mut self,
        column: &str,
        value: WhereValue,
        operator: Operator,
        connector: Connector,
        kind: NodeKind,
    ) -> Self {
        let node =
            PredicateNode::new(column, operator, self.absorb(value), connector).with_kind(kind);
        self.where_.push(node.into());
        self
    }

    fn push_range(
        mut self,
        column: &str,
        min: SqlValue,
        max: SqlValue,
        connector: Connector,
        not: bool,
    ) -> Self {
        let operator = if not {
            Operator::NotBetween
        } else {
            Operator::Between
        };
        self.values.push(min.clone());
        self.values.push(max.clone());
        let node = PredicateNode::new(column, operator, PredicateValue::Range(min, max), connector)
            .with_kind(NodeKind::Between);
        self.where_.push(node.into());
        self
    }

    fn value_node(
        &mut self,
        column: &str,
        value: WhereValue,
        operator: Operator,
        connector: Connector,
    ) -> PredicateNode {
        let value = if operator.is_valueless() {
            PredicateValue::None
        } else if operator.splits_terms() {
            self.absorb(value.split_terms())
        } else {
            self.absorb(value)
        };
        PredicateNode::new(column, operator, value, connector)
    }

    /// Converts a builder value, appending whatever it binds positionally.
    fn absorb(&mut self, value: WhereValue) -> PredicateValue {
        if let WhereValue::Scalar(SqlValue::Text(text)) = &value {
            if self
                .lookup
                .as_ref()
                .is_some_and(|lookup| lookup.is_column_reference(text))
            {
                return PredicateValue::Column(text.clone());
            }
        }
        if let WhereValue::Expr(expr) = &value {
            if expr.marker_count() != expr.values().len() {
                warn!(
                    expr = expr.expr(),
                    markers = expr.marker_count(),
                    values = expr.values().len(),
                    "expression markers and values differ in number"
                );
            }
        }
        let value = value.into_predicate_value();
        self.values.extend(value.positional_values());
        value
    }
}

// Structure
impl Filter {
    /// Adds a GROUP BY column.
    #[must_use]
    pub fn group(self, column: &str) -> Self {
        self.group_with(&[column], None)
    }

    /// Adds GROUP BY columns; `modifier` is attached to each entry and
    /// rendered once after the last one.
    #[must_use]
    pub fn group_with(mut self, columns: &[&str], modifier: Option<&str>) -> Self {
        self.group.extend(columns.iter().map(|c| GroupSpec {
            column: String::from(*c),
            modifier: modifier.map(String::from),
        }));
        self
    }

    /// Adds an ORDER BY column.
    #[must_use]
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(OrderSpec {
            column: String::from(column),
            direction,
        });
        self
    }

    /// Adds an ORDER BY column with a direction token (`asc`/`desc`, any
    /// case).
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedDirection`] for any other token.
    pub fn order_by(self, column: &str, direction: &str) -> Result<Self> {
        Ok(self.order(column, direction.parse()?))
    }

    /// Adds ORDER BY columns with directions taken positionally; missing
    /// directions are ascending.
    #[must_use]
    pub fn orders(mut self, columns: &[&str], directions: &[Direction]) -> Self {
        self.order.extend(columns.iter().enumerate().map(|(i, c)| OrderSpec {
            column: String::from(*c),
            direction: directions.get(i).copied().unwrap_or_default(),
        }));
        self
    }

    /// Sets LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(LimitSpec {
            limit,
            offset: None,
        });
        self
    }

    /// Sets LIMIT with OFFSET.
    #[must_use]
    pub const fn limit_offset(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(LimitSpec {
            limit,
            offset: Some(offset),
        });
        self
    }

    /// Sets DISTINCT.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a join with one ON condition `column1 <operator> column2`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingColumn2`] when `column2` is `None`.
    pub fn join(
        mut self,
        table: &str,
        column1: &str,
        operator: Operator,
        column2: Option<&str>,
        kind: JoinKind,
    ) -> Result<Self> {
        let Some(column2) = column2 else {
            return Err(FilterError::MissingColumn2 {
                table: String::from(table),
            });
        };
        self.join
            .push(Join::new(table, kind).on(column1, operator, column2));
        Ok(self)
    }

    /// Adds a join whose ON conditions are built by `build`.
    #[must_use]
    pub fn join_with(
        mut self,
        table: &str,
        kind: JoinKind,
        build: impl FnOnce(Join) -> Join,
    ) -> Self {
        let join = build(Join::new(table, kind));
        trace!(table, conditions = join.conditions().len(), "adding join");
        self.join.push(join);
        self
    }
}

// Accessors
impl Filter {
    /// Returns the statement action.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Returns the table references.
    #[must_use]
    pub fn tables_ref(&self) -> &[TableRef] {
        &self.table
    }

    /// Returns the selected fields.
    #[must_use]
    pub fn fields_ref(&self) -> &[FieldRef] {
        &self.field
    }

    /// Returns the where predicates.
    #[must_use]
    pub fn where_predicates(&self) -> &[Predicate] {
        &self.where_
    }

    /// Returns the having predicates.
    #[must_use]
    pub fn having_predicates(&self) -> &[Predicate] {
        &self.having
    }

    /// Returns the GROUP BY entries.
    #[must_use]
    pub fn groups(&self) -> &[GroupSpec] {
        &self.group
    }

    /// Returns the ORDER BY entries.
    #[must_use]
    pub fn orders_ref(&self) -> &[OrderSpec] {
        &self.order
    }

    /// Returns LIMIT/OFFSET.
    #[must_use]
    pub const fn limit_ref(&self) -> Option<&LimitSpec> {
        self.limit.as_ref()
    }

    /// Returns the joins.
    #[must_use]
    pub fn joins(&self) -> &[Join] {
        &self.join
    }

    /// Returns the DISTINCT flag.
    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Returns the positional values, in append order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Returns true when positional values exist.
    #[must_use]
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Returns the named bindings.
    #[must_use]
    pub const fn bindings(&self) -> &IndexMap<String, SqlValue> {
        &self.bindings
    }

    /// Returns true when named bindings exist.
    #[must_use]
    pub fn has_bindings(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Returns true when the property holds a value.
    ///
    /// Empty lists, a missing limit and a false distinct flag count as
    /// absent; the action is always present.
    #[must_use]
    pub fn has(&self, property: Property) -> bool {
        match property {
            Property::Table => !self.table.is_empty(),
            Property::Field => !self.field.is_empty(),
            Property::Where => !self.where_.is_empty(),
            Property::Having => !self.having.is_empty(),
            Property::Group => !self.group.is_empty(),
            Property::Order => !self.order.is_empty(),
            Property::Limit => self.limit.is_some(),
            Property::Values => self.has_values(),
            Property::Bindings => self.has_bindings(),
            Property::Join => !self.join.is_empty(),
            Property::Distinct => self.distinct,
            Property::Action => true,
        }
    }

    /// Returns the property's value, or `None` when it is absent.
    #[must_use]
    pub fn get(&self, property: Property) -> Option<PropertyRef<'_>> {
        if !self.has(property) {
            return None;
        }
        Some(match property {
            Property::Table => PropertyRef::Table(&self.table),
            Property::Field => PropertyRef::Field(&self.field),
            Property::Where => PropertyRef::Where(&self.where_),
            Property::Having => PropertyRef::Having(&self.having),
            Property::Group => PropertyRef::Group(&self.group),
            Property::Order => PropertyRef::Order(&self.order),
            Property::Limit => PropertyRef::Limit(self.limit.as_ref()?),
            Property::Values => PropertyRef::Values(&self.values),
            Property::Bindings => PropertyRef::Bindings(&self.bindings),
            Property::Join => PropertyRef::Join(&self.join),
            Property::Distinct => PropertyRef::Distinct(self.distinct),
            Property::Action => PropertyRef::Action(self.action),
        })
    }

    /// Clears the property. The action can not be reset.
    pub fn reset(&mut self, property: Property) {
        match property {
            Property::Table => self.table.clear(),
            Property::Field => self.field.clear(),
            Property::Where => self.where_.clear(),
            Property::Having => self.having.clear(),
            Property::Group => self.group.clear(),
            Property::Order => self.order.clear(),
            Property::Limit => self.limit = None,
            Property::Values => self.values.clear(),
            Property::Bindings => self.bindings.clear(),
            Property::Join => self.join.clear(),
            Property::Distinct => self.distinct = false,
            Property::Action => {}
        }
    }

    /// Clears the where predicates.
    pub fn reset_where(&mut self) {
        self.reset(Property::Where);
    }

    /// [`Filter::has`] by property name.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownFilterProperty`] for unknown names.
    pub fn has_named(&self, name: &str) -> Result<bool> {
        Ok(self.has(name.parse()?))
    }

    /// [`Filter::get`] by property name.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownFilterProperty`] for unknown names.
    pub fn get_named(&self, name: &str) -> Result<Option<PropertyRef<'_>>> {
        Ok(self.get(name.parse()?))
    }

    /// [`Filter::reset`] by property name.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownFilterProperty`] for unknown names.
    pub fn reset_named(&mut self, name: &str) -> Result<()> {
        self.reset(name.parse()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::lookup::KnownColumns;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(String::from(s))
    }

    #[test]
    fn test_values_follow_append_order() {
        let filter = Filter::select("users")
            .where_clause("a", 1)
            .where_null("deleted_at")
            .between("age", 18, 65)
            .like("name", "%bob%")
            .where_op("flag", Operator::Is, true)
            .where_in("id", [7, 8]);

        assert_eq!(
            filter.values(),
            &[
                SqlValue::Int(1),
                SqlValue::Int(18),
                SqlValue::Int(65),
                text("%bob%"),
                SqlValue::Int(7),
                SqlValue::Int(8),
            ]
        );
    }

    #[test]
    fn test_tables_and_fields_parallel_aliases() {
        let filter = Filter::new(Action::Select)
            .tables(&["users", "orders"], &["u"])
            .fields(&["id", "total"], &["user_id"]);

        assert_eq!(filter.tables_ref()[0].alias.as_deref(), Some("u"));
        assert_eq!(filter.tables_ref()[1].alias, None);
        assert_eq!(filter.fields_ref()[0].alias.as_deref(), Some("user_id"));
        assert_eq!(filter.fields_ref()[1].alias, None);
    }

    #[test]
    fn test_set_normalizes_binding_names() {
        let filter = Filter::insert("users")
            .set(":name", "bob")
            .set(" email: ", "b@example.com");

        let keys: Vec<&str> = filter.bindings().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "email"]);
    }

    #[test]
    fn test_set_many_arity() {
        let err = Filter::insert("users")
            .set_many(&["a", "b"], vec![SqlValue::Int(1)])
            .unwrap_err();
        assert_eq!(err, FilterError::MismatchedArity { columns: 2, values: 1 });

        let filter = Filter::insert("users")
            .set_many(&["a", "b"], vec![SqlValue::Int(1), SqlValue::Int(2)])
            .unwrap();
        assert_eq!(filter.bindings().len(), 2);
    }

    #[test]
    fn test_set_map() {
        let filter = Filter::update("users").set_map([("name", "x"), (":role", "admin")]);
        assert_eq!(filter.bindings().get("role"), Some(&text("admin")));
    }

    #[test]
    fn test_key_single_and_many() {
        let filter = Filter::update("users").key("id", 5).unwrap();
        assert_eq!(filter.bindings().get("id"), Some(&SqlValue::Int(5)));
        let node = filter.where_predicates()[0].as_node().unwrap();
        assert_eq!(node.operator, Operator::Equal);
        assert_eq!(node.value, PredicateValue::Named(vec![String::from("id")]));
        assert!(!filter.has_values());

        let filter = Filter::delete("users").key_in("id", [3, 4]).unwrap();
        let names: Vec<&str> = filter.bindings().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["id0", "id1"]);
        let node = filter.where_predicates()[0].as_node().unwrap();
        assert_eq!(node.operator, Operator::In);
    }

    #[test]
    fn test_key_rejected_for_select() {
        let err = Filter::select("users").key("id", 5).unwrap_err();
        assert_eq!(
            err,
            FilterError::KeyNotAllowedForSelect {
                column: String::from("id")
            }
        );
    }

    #[test]
    fn test_find_in_set_splits_terms() {
        let filter = Filter::select("posts").where_op("tags", Operator::FindInSet, "rust sql");
        assert_eq!(filter.values(), &[text("rust"), text("sql")]);
    }

    #[test]
    fn test_match_against_joins_list() {
        let filter = Filter::select("posts").match_against(
            &["title", "body"],
            WhereValue::list(["fast", "query"]),
            Some("IN BOOLEAN MODE"),
            Connector::And,
        );
        assert_eq!(filter.values(), &[text("fast query")]);
        let node = filter.where_predicates()[0].as_node().unwrap();
        assert_eq!(node.column, "title, body");
        assert_eq!(node.modifier.as_deref(), Some("IN BOOLEAN MODE"));
    }

    #[test]
    fn test_expression_values_are_flattened() {
        let filter = Filter::select("events")
            .where_clause("a", 1)
            .where_op(
                "created",
                Operator::GreaterThan,
                Filter::expr(
                    "DATE_SUB(%s, INTERVAL %d DAY)",
                    vec![text("2024-01-31"), SqlValue::Int(7)],
                ),
            )
            .where_clause("b", 2);

        assert_eq!(
            filter.values(),
            &[SqlValue::Int(1), text("2024-01-31"), SqlValue::Int(7), SqlValue::Int(2)]
        );
    }

    #[test]
    fn test_expression_with_extra_values_keeps_them() {
        let filter = Filter::select("events").where_op(
            "created",
            Operator::GreaterThan,
            Filter::expr("NOW() - %d", vec![SqlValue::Int(7), SqlValue::Int(8)]),
        );

        assert_eq!(filter.values(), &[SqlValue::Int(7), SqlValue::Int(8)]);
    }

    #[test]
    fn test_where_raw_connectors_positional() {
        let filter = Filter::select("t").where_raw(
            &["a=1", "b=2", "c=3"],
            vec![SqlValue::Int(9)],
            &[Connector::Or],
        );
        let connectors: Vec<Connector> = filter
            .where_predicates()
            .iter()
            .map(Predicate::trailing_connector)
            .collect();
        assert_eq!(connectors, vec![Connector::Or, Connector::And, Connector::And]);
        assert_eq!(filter.values(), &[SqlValue::Int(9)]);
    }

    #[test]
    fn test_nest_merges_values_and_overrides_connector() {
        let filter = Filter::select("t")
            .where_clause("x", 0)
            .nest_with(|inner| inner.where_clause("a", 1).where_clause("b", 2), Some(Connector::Or))
            .where_clause("y", 3);

        assert_eq!(
            filter.values(),
            &[SqlValue::Int(0), SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
        );
        let Predicate::Group(group) = &filter.where_predicates()[1] else {
            panic!("expected a group");
        };
        assert_eq!(group[0].trailing_connector(), Connector::And);
        assert_eq!(group[1].trailing_connector(), Connector::Or);
    }

    #[test]
    fn test_empty_nest_adds_nothing() {
        let filter = Filter::select("t").nest(|inner| inner);
        assert!(!filter.has(Property::Where));
    }

    #[test]
    fn test_try_nest_propagates_error() {
        let err = Filter::select("t")
            .try_nest_with(|inner| inner.key("id", 1), None)
            .unwrap_err();
        assert!(matches!(err, FilterError::KeyNotAllowedForSelect { .. }));
    }

    #[test]
    fn test_join_requires_second_column() {
        let err = Filter::select("users")
            .join("orders", "users.id", Operator::Equal, None, JoinKind::Inner)
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::MissingColumn2 {
                table: String::from("orders")
            }
        );
    }

    #[test]
    fn test_clone_resets_only_where() {
        let filter = Filter::select("users")
            .field("id")
            .where_clause("a", 1)
            .group("role")
            .order("id", Direction::Desc)
            .limit(5)
            .join_with("orders", JoinKind::Left, |j| {
                j.on("users.id", Operator::Equal, "orders.user_id")
            });

        let copy = filter.clone();
        assert!(!copy.has(Property::Where));
        assert_eq!(copy.tables_ref(), filter.tables_ref());
        assert_eq!(copy.fields_ref(), filter.fields_ref());
        assert_eq!(copy.joins(), filter.joins());
        assert_eq!(copy.groups(), filter.groups());
        assert_eq!(copy.orders_ref(), filter.orders_ref());
        assert_eq!(copy.limit_ref(), filter.limit_ref());
        assert!(filter.has(Property::Where));
    }

    #[test]
    fn test_named_property_access() {
        let mut filter = Filter::select("users").distinct().limit(3);
        assert_eq!(filter.has_named("distinct"), Ok(true));
        assert!(matches!(
            filter.get_named("limit"),
            Ok(Some(PropertyRef::Limit(LimitSpec { limit: 3, offset: None })))
        ));
        assert_eq!(filter.get_named("order"), Ok(None));
        filter.reset_named("limit").unwrap();
        assert!(!filter.has(Property::Limit));
        assert_eq!(
            filter.has_named("nope"),
            Err(FilterError::UnknownFilterProperty(String::from("nope")))
        );
        assert!(filter.reset_named("columns").is_err());
    }

    #[test]
    fn test_parse_action_rejects_unknown_action() {
        assert!(Filter::parse_action("UPDATE").is_ok());
        assert_eq!(
            Filter::parse_action("merge").unwrap_err(),
            FilterError::UnsupportedAction(String::from("merge"))
        );
    }

    #[test]
    fn test_column_lookup_turns_value_into_column() {
        let lookup = Arc::new(KnownColumns::new().table("orders", ["user_id"]));
        let filter = Filter::select("users")
            .with_column_lookup(lookup)
            .where_clause("users.id", "orders.user_id")
            .where_clause("name", "orders.note");

        assert_eq!(filter.values(), &[text("orders.note")]);
        let node = filter.where_predicates()[0].as_node().unwrap();
        assert_eq!(node.value, PredicateValue::Column(String::from("orders.user_id")));
    }

    #[test]
    fn test_json_bindings_are_normalized() {
        let filter: Filter = serde_json::from_str(
            r#"{
                "action": "insert",
                "table": [{"table": "users"}],
                "bindings": {":name": "bob", " age: ": 30}
            }"#,
        )
        .unwrap();

        let keys: Vec<&str> = filter.bindings().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "age"]);
        assert_eq!(filter.bindings().get("name"), Some(&text("bob")));
    }

    #[test]
    fn test_resolve_columns_after_loading() {
        let filter: Filter = serde_json::from_str(
            r#"{
                "action": "select",
                "table": [{"table": "users"}],
                "where": [
                    {"column": "a", "value": {"scalar": 1}},
                    [{"column": "users.id", "value": {"scalar": "orders.user_id"}}],
                    {"column": "note", "value": {"scalar": "orders.note"}}
                ],
                "having": [{"column": "total", "value": {"scalar": 2}}],
                "values": [1, "orders.user_id", "orders.note", 2]
            }"#,
        )
        .unwrap();

        let lookup = Arc::new(KnownColumns::new().table("orders", ["user_id"]));
        let filter = filter.resolve_columns(lookup);

        assert_eq!(
            filter.values(),
            &[SqlValue::Int(1), text("orders.note"), SqlValue::Int(2)]
        );
        let Predicate::Group(group) = &filter.where_predicates()[1] else {
            panic!("expected a group");
        };
        assert_eq!(
            group[0].as_node().unwrap().value,
            PredicateValue::Column(String::from("orders.user_id"))
        );
    }

    #[test]
    fn test_resolve_columns_keeps_values_out_of_order() {
        let filter = Filter::select("users")
            .where_raw(&["x = ?"], vec![SqlValue::Int(9)], &[])
            .where_clause("users.id", "orders.user_id");

        let lookup = Arc::new(KnownColumns::new().table("orders", ["user_id"]));
        let filter = filter.resolve_columns(lookup);

        assert_eq!(filter.values(), &[SqlValue::Int(9), text("orders.user_id")]);
        assert_eq!(
            filter.where_predicates()[1].as_node().unwrap().value,
            PredicateValue::Scalar(text("orders.user_id"))
        );
    }

    #[test]
    fn test_order_by_direction_token() {
        let filter = Filter::select("users")
            .order_by("id", "desc")
            .unwrap()
            .order_by("name", " ASC ")
            .unwrap();
        let directions: Vec<Direction> =
            filter.orders_ref().iter().map(|o| o.direction).collect();
        assert_eq!(directions, vec![Direction::Desc, Direction::Asc]);

        assert_eq!(
            Filter::select("users").order_by("id", "up").unwrap_err(),
            FilterError::UnsupportedDirection(String::from("up"))
        );
    }

    #[test]
    fn test_json_description() {
        let filter: Filter = serde_json::from_str(
            r#"{
                "action": "select",
                "table": [{"table": "users"}],
                "where": [
                    {"column": "a", "value": {"scalar": 1}},
                    [
                        {"column": "b", "value": {"scalar": 2}, "connector": "OR"},
                        {"column": "c", "operator": "IS_NULL"}
                    ]
                ],
                "values": [1, 2]
            }"#,
        )
        .unwrap();

        assert_eq!(filter.action(), Action::Select);
        assert_eq!(filter.where_predicates().len(), 2);
        assert_eq!(filter.values().len(), 2);
    }
}
