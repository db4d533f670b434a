//! Primitive values exchanged between the binder and handlers.

use std::fmt;

/// The declared type of a query-bound handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// Text, passed through unchanged.
    String,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// Boolean.
    Bool,
}

impl TargetType {
    /// Coerces a resolved query string to this type.
    ///
    /// Coercion never fails:
    /// - empty or malformed numbers become `0`
    /// - only a case-insensitive `"true"` is `true`
    ///
    /// # Example
    ///
    /// ```
    /// use microweb_core::{TargetType, Value};
    ///
    /// assert_eq!(TargetType::Int.coerce(""), Value::Int(0));
    /// assert_eq!(TargetType::Long.coerce("42"), Value::Long(42));
    /// assert_eq!(TargetType::Bool.coerce("TRUE"), Value::Bool(true));
    /// assert_eq!(TargetType::Bool.coerce("yes"), Value::Bool(false));
    /// ```
    #[must_use]
    pub fn coerce(self, raw: &str) -> Value {
        match self {
            Self::String => Value::Text(raw.to_string()),
            Self::Int => Value::Int(parse_or_zero(raw)),
            Self::Long => Value::Long(parse_or_zero(raw)),
            Self::Bool => Value::Bool(raw.eq_ignore_ascii_case("true")),
        }
    }

    /// Returns the type name as used in diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Bool => "Bool",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_or_zero<T>(raw: &str) -> T
where
    T: std::str::FromStr + Default,
{
    if raw.is_empty() {
        return T::default();
    }
    raw.parse().unwrap_or_else(|_| {
        tracing::debug!(value = %raw, "non-numeric query value coerced to zero");
        T::default()
    })
}

/// The declared return type of a GET mapping.
///
/// Only [`ReturnType::Text`] is accepted at registration time; the other
/// variants exist so that a misdeclared mapping is rejected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnType {
    /// A textual payload (plain text or JSON).
    Text,
    /// A 32-bit integer.
    Int,
    /// A 64-bit integer.
    Long,
    /// A boolean.
    Bool,
    /// No value.
    Unit,
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "Text",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Bool => "Bool",
            Self::Unit => "Unit",
        };
        f.write_str(name)
    }
}

/// A bound argument or a handler result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Text.
    Text(String),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Boolean.
    Bool(bool),
}

impl Value {
    /// Returns true for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text if this is a [`Value::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`Value::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`Value::Long`].
    #[must_use]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the variant, used in argument mismatch messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Text(_) => "String",
            Self::Int(_) => "Int",
            Self::Long(_) => "Long",
            Self::Bool(_) => "Bool",
        }
    }

    /// Renders the value as a response body; `Null` is the empty string.
    #[must_use]
    pub fn into_body(self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => s,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Long(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_string_unchanged() {
        assert_eq!(TargetType::String.coerce(" Ada "), Value::Text(" Ada ".into()));
        assert_eq!(TargetType::String.coerce(""), Value::Text(String::new()));
    }

    #[test]
    fn test_coerce_empty_numbers_are_zero() {
        assert_eq!(TargetType::Int.coerce(""), Value::Int(0));
        assert_eq!(TargetType::Long.coerce(""), Value::Long(0));
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(TargetType::Int.coerce("-17"), Value::Int(-17));
        assert_eq!(TargetType::Long.coerce("9000000000"), Value::Long(9_000_000_000));
    }

    #[test]
    fn test_coerce_malformed_numbers_are_zero() {
        assert_eq!(TargetType::Int.coerce("abc"), Value::Int(0));
        assert_eq!(TargetType::Int.coerce("9000000000"), Value::Int(0));
        assert_eq!(TargetType::Long.coerce("1.5"), Value::Long(0));
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(TargetType::Bool.coerce("true"), Value::Bool(true));
        assert_eq!(TargetType::Bool.coerce("TrUe"), Value::Bool(true));
        assert_eq!(TargetType::Bool.coerce("1"), Value::Bool(false));
        assert_eq!(TargetType::Bool.coerce(""), Value::Bool(false));
        assert_eq!(TargetType::Bool.coerce(" true"), Value::Bool(false));
    }

    #[test]
    fn test_value_into_body() {
        assert_eq!(Value::Null.into_body(), "");
        assert_eq!(Value::from("hi").into_body(), "hi");
        assert_eq!(Value::Int(3).into_body(), "3");
        assert_eq!(Value::Bool(false).into_body(), "false");
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some(5_i64)), Value::Long(5));
    }
}
