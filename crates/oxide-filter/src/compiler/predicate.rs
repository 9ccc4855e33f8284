//! Recursive rendering of predicate lists.
//!
//! Each element of a list is rendered and followed by its trailing
//! connector, except the last rendered element. Groups render inside
//! parentheses and bind to their next sibling through the connector of
//! their deepest trailing node. Empty groups render nothing.

use tracing::trace;

use super::wrap::Wrapper;
use crate::dialect::{Dialect, OperatorArgs};
use crate::error::{FilterError, Result};
use crate::filter::predicate::{NodeKind, Predicate, PredicateNode, PredicateValue};
use crate::operator::{Connector, Operator};
use crate::value::SqlValue;

/// Renders predicate lists for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct PredicateRenderer<'a> {
    dialect: &'a dyn Dialect,
    wrap: Wrapper<'a>,
}

impl<'a> PredicateRenderer<'a> {
    /// Creates a renderer.
    #[must_use]
    pub const fn new(dialect: &'a dyn Dialect, wrap: Wrapper<'a>) -> Self {
        Self { dialect, wrap }
    }

    /// Renders a possibly nested list into a clause body, without keyword.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedWhereOperator`] when a node's
    /// operator has no rendering in the dialect.
    pub fn render_list(&self, list: &[Predicate]) -> Result<String> {
        let mut parts = Vec::with_capacity(list.len());
        for item in list {
            match item {
                Predicate::Node(node) => {
                    parts.push((self.render_node(node)?, node.connector));
                }
                Predicate::Group(inner) => {
                    let body = self.render_list(inner)?;
                    if body.is_empty() {
                        continue;
                    }
                    trace!(nodes = item.node_count(), "rendering predicate group");
                    parts.push((format!("({body})"), item.trailing_connector()));
                }
            }
        }
        Ok(join_parts(parts))
    }

    /// Renders flat nodes, e.g. the ON conditions of a join.
    ///
    /// # Errors
    ///
    /// Same as [`PredicateRenderer::render_list`].
    pub fn render_nodes(&self, nodes: &[PredicateNode]) -> Result<String> {
        let parts = nodes
            .iter()
            .map(|node| Ok((self.render_node(node)?, node.connector)))
            .collect::<Result<Vec<_>>>()?;
        Ok(join_parts(parts))
    }

    /// Renders one terminal node.
    ///
    /// # Errors
    ///
    /// Same as [`PredicateRenderer::render_list`].
    pub fn render_node(&self, node: &PredicateNode) -> Result<String> {
        if node.kind == NodeKind::Raw {
            return Ok(String::from(node.column.trim()));
        }
        let column = if node.operator == Operator::MatchAgainst {
            self.wrap.column(&node.column)
        } else {
            self.wrap.where_column(&node.column)
        };
        let value = self.render_value(&node.value, node.mask);
        let range = self.render_range(&node.value, node.mask);
        let args = OperatorArgs {
            column: &column,
            value: &value,
            range: range.as_ref().map(|(min, max)| (min.as_str(), max.as_str())),
            modifier: node.modifier.as_deref().map(str::trim).filter(|m| !m.is_empty()),
        };
        if let Some(sql) = self.dialect.render_operator(node.operator, &args) {
            return Ok(sql);
        }
        if !self.dialect.supports_operator(node.operator) {
            return Err(FilterError::UnsupportedWhereOperator {
                operator: node.operator,
                dialect: String::from(self.dialect.name()),
            });
        }
        Ok(render_default(node.operator, &args))
    }

    fn render_value(&self, value: &PredicateValue, mask: bool) -> String {
        let placeholder = self.dialect.parameter_placeholder();
        match value {
            PredicateValue::None => String::new(),
            PredicateValue::Scalar(v) => self.scalar(v, mask),
            PredicateValue::List(values) if values.is_empty() => String::from("NULL"),
            PredicateValue::List(values) => values
                .iter()
                .map(|v| self.scalar(v, mask))
                .collect::<Vec<_>>()
                .join(", "),
            PredicateValue::Range(min, max) => {
                format!("{}, {}", self.scalar(min, mask), self.scalar(max, mask))
            }
            PredicateValue::Expr(expr) if mask => expr.to_placeholders(placeholder),
            PredicateValue::Expr(expr) => expr.get(),
            PredicateValue::Column(column) => self.wrap.column(column),
            PredicateValue::Named(names) if names.is_empty() => String::from("NULL"),
            PredicateValue::Named(names) => names
                .iter()
                .map(|name| self.dialect.named_placeholder(name))
                .collect::<Vec<_>>()
                .join(", "),
            PredicateValue::Statement(statement) => {
                format!("({})", strip_outer_parens(statement))
            }
        }
    }

    /// Bounds for the BETWEEN family, kept as two independent tokens.
    fn render_range(&self, value: &PredicateValue, mask: bool) -> Option<(String, String)> {
        match value {
            PredicateValue::Range(min, max) => {
                Some((self.scalar(min, mask), self.scalar(max, mask)))
            }
            PredicateValue::List(values) if values.len() == 2 => {
                Some((self.scalar(&values[0], mask), self.scalar(&values[1], mask)))
            }
            _ => None,
        }
    }

    fn scalar(&self, value: &SqlValue, mask: bool) -> String {
        if mask {
            String::from(self.dialect.parameter_placeholder())
        } else {
            value.to_sql_inline()
        }
    }
}

/// The default operator templates.
///
/// Dialects without an override for an operator they support render
/// through this table.
#[must_use]
pub fn render_default(operator: Operator, args: &OperatorArgs<'_>) -> String {
    let OperatorArgs {
        column,
        value,
        range,
        modifier,
    } = *args;
    match operator {
        Operator::Equal => format!("{column} = {value}"),
        Operator::NotEqual => format!("{column} != {value}"),
        Operator::GreaterThan => format!("{column} > {value}"),
        Operator::GreaterThanEqual => format!("{column} >= {value}"),
        Operator::LesserThan => format!("{column} < {value}"),
        Operator::LesserThanEqual => format!("{column} <= {value}"),
        Operator::Is => format!("{column} IS TRUE"),
        Operator::IsNot => format!("{column} IS FALSE"),
        Operator::IsNull => format!("{column} IS NULL"),
        Operator::IsNotNull => format!("{column} IS NOT NULL"),
        Operator::In => format!("{column} IN({value})"),
        Operator::NotIn => format!("{column} NOT IN({value})"),
        Operator::FindInSet => format!("FIND_IN_SET({column}, {value})"),
        Operator::Regexp => format!("{column} REGEXP {value}"),
        Operator::NotRegexp => format!("{column} NOT REGEXP {value}"),
        Operator::MatchAgainst => match modifier {
            Some(modifier) => format!("MATCH ({column}) AGAINST ({value} {modifier})"),
            None => format!("MATCH ({column}) AGAINST ({value})"),
        },
        Operator::Like => format!("{column} LIKE {value}"),
        Operator::NotLike => format!("{column} NOT LIKE {value}"),
        Operator::Strcmp => format!("STRCMP({column}, {value}) = 0"),
        Operator::Between => match range {
            Some((min, max)) => format!("{column} BETWEEN {min} AND {max}"),
            None => format!("{column} BETWEEN {value}"),
        },
        Operator::NotBetween => match range {
            Some((min, max)) => format!("{column} NOT BETWEEN {min} AND {max}"),
            None => format!("{column} NOT BETWEEN {value}"),
        },
        Operator::SubSelect => format!("{column} IN {value}"),
    }
}

fn join_parts(parts: Vec<(String, Connector)>) -> String {
    let last = parts.len().saturating_sub(1);
    let mut out = String::new();
    for (i, (fragment, connector)) in parts.into_iter().enumerate() {
        out.push_str(&fragment);
        if i < last {
            out.push(' ');
            out.push_str(connector.as_sql());
            out.push(' ');
        }
    }
    out
}

/// Strips whitespace and outer parentheses that enclose the whole text.
fn strip_outer_parens(statement: &str) -> &str {
    let mut inner = statement.trim();
    while inner.starts_with('(') && inner.ends_with(')') && encloses(inner) {
        inner = inner[1..inner.len() - 1].trim();
    }
    inner
}

/// True when the opening parenthesis at 0 closes at the last character.
fn encloses(text: &str) -> bool {
    let mut depth = 0_usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == text.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}
