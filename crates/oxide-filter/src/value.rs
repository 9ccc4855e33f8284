//! SQL values and parameter handling.
//!
//! Values appended to a filter are never interpolated into the compiled SQL:
//! they travel beside it as the positional list or the named binding map.
//! Only the literal escape hatches (`Expression::get`, inline rendering of
//! unmasked values) go through [`SqlValue::to_sql_inline`].

use serde::{Deserialize, Serialize};

/// A SQL value that can be bound to a placeholder.
///
/// Serializes untagged, so JSON `null`, booleans, numbers, strings and byte
/// arrays map directly onto the variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Renders the value as an escaped SQL literal.
    ///
    /// **Warning**: only the literal escape hatches use this. Filter values
    /// are bound, not inlined.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(true) => String::from("TRUE"),
            Self::Bool(false) => String::from("FALSE"),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    /// Renders the value as bare text, without quoting.
    ///
    /// Used for `%s`-style substitution of numbers and for error context.
    #[must_use]
    pub fn to_plain(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            other => other.to_sql_inline(),
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! int_to_sql_value {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )*
    };
}

int_to_sql_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        self.map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_literals() {
        assert_eq!(SqlValue::Null.to_sql_inline(), "NULL");
        assert_eq!(SqlValue::Bool(false).to_sql_inline(), "FALSE");
        assert_eq!(SqlValue::Int(-7).to_sql_inline(), "-7");
        assert_eq!(SqlValue::Blob(vec![0xCA, 0xFE]).to_sql_inline(), "X'CAFE'");
    }

    #[test]
    fn test_inline_text_is_quoted() {
        assert_eq!(
            SqlValue::Text(String::from("O'Brien")).to_sql_inline(),
            "'O''Brien'"
        );
        assert_eq!(
            SqlValue::Text(String::from("'; DROP TABLE users; --")).to_sql_inline(),
            "'''; DROP TABLE users; --'"
        );
    }

    #[test]
    fn test_plain_text_is_not_quoted() {
        assert_eq!(SqlValue::Text(String::from("abc")).to_plain(), "abc");
        assert_eq!(SqlValue::Int(3).to_plain(), "3");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(7_u8.to_sql_value(), SqlValue::Int(7));
        assert_eq!(7_u32.to_sql_value(), SqlValue::Int(7));
        assert_eq!("x".to_sql_value(), SqlValue::Text(String::from("x")));
        assert_eq!(None::<i64>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(1.5_f64).to_sql_value(), SqlValue::Float(1.5));
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<SqlValue> =
            serde_json::from_str(r#"[null, true, 5, 2.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Null,
                SqlValue::Bool(true),
                SqlValue::Int(5),
                SqlValue::Float(2.5),
                SqlValue::Text(String::from("x")),
            ]
        );
    }
}
