//! Immediate SQL fragments.
//!
//! An [`Expression`] is the escape hatch for SQL the structured filter can
//! not describe: a fragment with printf-style markers (`%s`, `%d`, `%f`,
//! `%%` for a literal percent sign) and its own substitution values.
//!
//! Rendered on its own with [`Expression::get`], the values are substituted
//! as escaped literals. Used as a predicate value, the values are flattened
//! into the enclosing filter's positional list and the markers become
//! placeholders instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{SqlValue, ToSqlValue};

/// An immediate SQL fragment with its own substitution values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Expression {
    expr: String,
    #[serde(default)]
    values: Vec<SqlValue>,
}

impl Expression {
    /// Creates an expression without values.
    #[must_use]
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            values: vec![],
        }
    }

    /// Creates an expression with substitution values.
    #[must_use]
    pub fn create<I, T>(expr: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        Self {
            expr: expr.into(),
            values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
        }
    }

    /// Replaces both the fragment and the values.
    pub fn set(&mut self, expr: impl Into<String>, values: Vec<SqlValue>) -> &mut Self {
        self.expr = expr.into();
        self.values = values;
        self
    }

    /// Returns the raw fragment, markers included.
    #[must_use]
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Replaces the fragment.
    pub fn set_expr(&mut self, expr: impl Into<String>) -> &mut Self {
        self.expr = expr.into();
        self
    }

    /// Returns the substitution values.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Replaces the substitution values.
    pub fn set_values(&mut self, values: Vec<SqlValue>) -> &mut Self {
        self.values = values;
        self
    }

    /// Renders the fragment with every marker replaced by its value as an
    /// escaped literal. Markers without a matching value are kept verbatim.
    #[must_use]
    pub fn get(&self) -> String {
        let mut values = self.values.iter();
        substitute(&self.expr, |marker| {
            values
                .next()
                .map_or_else(|| format!("%{marker}"), SqlValue::to_sql_inline)
        })
    }

    /// Renders the fragment with every marker replaced by `placeholder`.
    #[must_use]
    pub fn to_placeholders(&self, placeholder: &str) -> String {
        substitute(&self.expr, |_| String::from(placeholder))
    }

    /// Counts the substitution markers in the fragment.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        let mut count = 0;
        substitute(&self.expr, |_| {
            count += 1;
            String::new()
        });
        count
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get())
    }
}

/// Walks `expr`, replacing `%s`, `%d` and `%f` through `replace` and `%%`
/// with `%`. Any other `%` sequence is copied unchanged.
fn substitute(expr: &str, mut replace: impl FnMut(char) -> String) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut chars = expr.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(marker @ ('s' | 'd' | 'f')) => {
                chars.next();
                out.push_str(&replace(marker));
            }
            _ => out.push('%'),
        }
    }
    out
}
