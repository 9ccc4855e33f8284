//! Named access to filter properties.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::FilterError;
use crate::join::Join;
use crate::operator::Action;
use crate::value::SqlValue;

use super::predicate::Predicate;
use super::{FieldRef, GroupSpec, LimitSpec, OrderSpec, TableRef};

/// The closed set of filter properties reachable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Table references.
    Table,
    /// Selected fields.
    Field,
    /// Where predicates.
    Where,
    /// Having predicates.
    Having,
    /// GROUP BY entries.
    Group,
    /// ORDER BY entries.
    Order,
    /// LIMIT/OFFSET.
    Limit,
    /// Positional values.
    Values,
    /// Named bindings.
    Bindings,
    /// Join clauses.
    Join,
    /// DISTINCT flag.
    Distinct,
    /// The statement action.
    Action,
}

impl Property {
    /// All properties.
    pub const ALL: [Self; 12] = [
        Self::Table,
        Self::Field,
        Self::Where,
        Self::Having,
        Self::Group,
        Self::Order,
        Self::Limit,
        Self::Values,
        Self::Bindings,
        Self::Join,
        Self::Distinct,
        Self::Action,
    ];

    /// Returns the property name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Field => "field",
            Self::Where => "where",
            Self::Having => "having",
            Self::Group => "group",
            Self::Order => "order",
            Self::Limit => "limit",
            Self::Values => "values",
            Self::Bindings => "bindings",
            Self::Join => "join",
            Self::Distinct => "distinct",
            Self::Action => "action",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = FilterError;

    /// Parses a property name, ignoring surrounding whitespace, underscores
    /// and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_matches('_').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| FilterError::UnknownFilterProperty(String::from(s)))
    }
}

/// A borrowed view of one property's value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyRef<'a> {
    /// See [`Property::Table`].
    Table(&'a [TableRef]),
    /// See [`Property::Field`].
    Field(&'a [FieldRef]),
    /// See [`Property::Where`].
    Where(&'a [Predicate]),
    /// See [`Property::Having`].
    Having(&'a [Predicate]),
    /// See [`Property::Group`].
    Group(&'a [GroupSpec]),
    /// See [`Property::Order`].
    Order(&'a [OrderSpec]),
    /// See [`Property::Limit`].
    Limit(&'a LimitSpec),
    /// See [`Property::Values`].
    Values(&'a [SqlValue]),
    /// See [`Property::Bindings`].
    Bindings(&'a IndexMap<String, SqlValue>),
    /// See [`Property::Join`].
    Join(&'a [Join]),
    /// See [`Property::Distinct`].
    Distinct(bool),
    /// See [`Property::Action`].
    Action(Action),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property() {
        assert_eq!("where".parse::<Property>(), Ok(Property::Where));
        assert_eq!(" _Bindings ".parse::<Property>(), Ok(Property::Bindings));
        for p in Property::ALL {
            assert_eq!(p.name().parse::<Property>(), Ok(p));
        }
    }

    #[test]
    fn test_unknown_property() {
        assert_eq!(
            "columns".parse::<Property>(),
            Err(FilterError::UnknownFilterProperty(String::from("columns")))
        );
    }
}
