//! Operator, connector and other token normalization.
//!
//! Every token type here maps in both directions between a canonical name
//! (`GREATER_THAN`, `AND`, `LEFT_JOIN`, ...) and, where one exists, a
//! shorthand alias (`>`, `&&`, ...). Parsing is case-insensitive and rejects
//! anything outside the table with a typed error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// The CRUD action a filter describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// `SELECT`
    Select,
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
}

impl Action {
    /// Returns the lowercase action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "select" => Ok(Self::Select),
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(FilterError::UnsupportedAction(String::from(s))),
        }
    }
}

/// Comparison and matching operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqual,
    /// `<`
    LesserThan,
    /// `<=`
    LesserThanEqual,
    /// `IS TRUE`
    Is,
    /// `IS FALSE`
    IsNot,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
    /// `IN (...)`
    In,
    /// `NOT IN (...)`
    NotIn,
    /// `FIND_IN_SET(col, ...)`
    FindInSet,
    /// `REGEXP`
    Regexp,
    /// `NOT REGEXP`
    NotRegexp,
    /// `MATCH (col) AGAINST (...)`
    MatchAgainst,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `STRCMP(col, ...) = 0`
    Strcmp,
    /// `BETWEEN ? AND ?`
    Between,
    /// `NOT BETWEEN ? AND ?`
    NotBetween,
    /// `IN (<statement>)`
    SubSelect,
}

impl Operator {
    /// All operators, in canonical order.
    pub const ALL: [Self; 22] = [
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterThanEqual,
        Self::LesserThan,
        Self::LesserThanEqual,
        Self::Is,
        Self::IsNot,
        Self::IsNull,
        Self::IsNotNull,
        Self::In,
        Self::NotIn,
        Self::FindInSet,
        Self::Regexp,
        Self::NotRegexp,
        Self::MatchAgainst,
        Self::Like,
        Self::NotLike,
        Self::Strcmp,
        Self::Between,
        Self::NotBetween,
        Self::SubSelect,
    ];

    /// Returns the canonical token.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanEqual => "GREATER_THAN_EQUAL",
            Self::LesserThan => "LESSER_THAN",
            Self::LesserThanEqual => "LESSER_THAN_EQUAL",
            Self::Is => "IS",
            Self::IsNot => "IS_NOT",
            Self::IsNull => "IS_NULL",
            Self::IsNotNull => "IS_NOT_NULL",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
            Self::FindInSet => "FIND_IN_SET",
            Self::Regexp => "REGEXP",
            Self::NotRegexp => "NOT_REGEXP",
            Self::MatchAgainst => "MATCH_AGAINST",
            Self::Like => "LIKE",
            Self::NotLike => "NOT_LIKE",
            Self::Strcmp => "STRCMP",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT_BETWEEN",
            Self::SubSelect => "SUB_SELECT",
        }
    }

    /// Returns the shorthand alias.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
            Self::LesserThan => "<",
            Self::LesserThanEqual => "<=",
            Self::Is => "is",
            Self::IsNot => "is_not",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::FindInSet => "find_in_set",
            Self::Regexp => "regexp",
            Self::NotRegexp => "not_regexp",
            Self::MatchAgainst => "match_against",
            Self::Like => "%",
            Self::NotLike => "!%",
            Self::Strcmp => "strcmp",
            Self::Between => "<>",
            Self::NotBetween => "!<>",
            Self::SubSelect => "sub_select",
        }
    }

    /// Returns true for the IS family, which never consumes a bound value.
    #[must_use]
    pub const fn is_valueless(self) -> bool {
        matches!(self, Self::Is | Self::IsNot | Self::IsNull | Self::IsNotNull)
    }

    /// Returns true for operators whose string value is split on whitespace.
    #[must_use]
    pub const fn splits_terms(self) -> bool {
        matches!(self, Self::FindInSet | Self::MatchAgainst)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let upper = token.to_uppercase();
        let lower = token.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.name() == upper)
            .or_else(|| Self::ALL.into_iter().find(|op| op.alias() == lower))
            .ok_or_else(|| FilterError::UnsupportedOperator(String::from(s)))
    }
}

impl TryFrom<&str> for Operator {
    type Error = FilterError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Boolean connector binding a predicate to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    /// `AND`
    #[default]
    And,
    /// `OR`
    Or,
    /// `XOR`
    Xor,
}

impl Connector {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
        }
    }

    /// Returns the shorthand alias.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Xor => "xor",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Connector {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AND" | "&&" => Ok(Self::And),
            "OR" | "||" => Ok(Self::Or),
            "XOR" => Ok(Self::Xor),
            _ => Err(FilterError::UnsupportedConnector(String::from(s))),
        }
    }
}

impl TryFrom<&str> for Connector {
    type Error = FilterError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Ascending (ASC)
    #[default]
    Asc,
    /// Descending (DESC)
    Desc,
}

impl Direction {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(FilterError::UnsupportedDirection(String::from(s))),
        }
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JoinKind {
    /// `INNER JOIN`
    #[default]
    #[serde(rename = "INNER_JOIN")]
    Inner,
    /// `CROSS JOIN`
    #[serde(rename = "CROSS_JOIN")]
    Cross,
    /// `STRAIGHT_JOIN`
    #[serde(rename = "STRAIGHT_JOIN")]
    Straight,
    /// `LEFT JOIN`
    #[serde(rename = "LEFT_JOIN")]
    Left,
    /// `LEFT OUTER JOIN`
    #[serde(rename = "LEFT_OUTER_JOIN")]
    LeftOuter,
    /// `RIGHT JOIN`
    #[serde(rename = "RIGHT_JOIN")]
    Right,
    /// `RIGHT OUTER JOIN`
    #[serde(rename = "RIGHT_OUTER_JOIN")]
    RightOuter,
}

impl JoinKind {
    /// Returns the canonical token.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inner => "INNER_JOIN",
            Self::Cross => "CROSS_JOIN",
            Self::Straight => "STRAIGHT_JOIN",
            Self::Left => "LEFT_JOIN",
            Self::LeftOuter => "LEFT_OUTER_JOIN",
            Self::Right => "RIGHT_JOIN",
            Self::RightOuter => "RIGHT_OUTER_JOIN",
        }
    }

    /// Returns the SQL keyword(s).
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Straight => "STRAIGHT_JOIN",
            Self::Left => "LEFT JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
            Self::Right => "RIGHT JOIN",
            Self::RightOuter => "RIGHT OUTER JOIN",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JoinKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_uppercase().replace(' ', "_");
        match token.as_str() {
            "INNER_JOIN" | "INNER" | "JOIN" => Ok(Self::Inner),
            "CROSS_JOIN" | "CROSS" => Ok(Self::Cross),
            "STRAIGHT_JOIN" | "STRAIGHT" => Ok(Self::Straight),
            "LEFT_JOIN" | "LEFT" => Ok(Self::Left),
            "LEFT_OUTER_JOIN" | "LEFT_OUTER" => Ok(Self::LeftOuter),
            "RIGHT_JOIN" | "RIGHT" => Ok(Self::Right),
            "RIGHT_OUTER_JOIN" | "RIGHT_OUTER" => Ok(Self::RightOuter),
            _ => Err(FilterError::UnsupportedJoin {
                kind: String::from(s),
                dialect: String::from("filter"),
            }),
        }
    }
}
