//! NSQLite value types.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::error::NsqliteError;

/// A scalar value sent as a query parameter or returned in a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum NsqliteValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Binary(Vec<u8>),
}

impl NsqliteValue {
    /// Returns the value as a string reference, if it is a `Text` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Integer` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as an f64. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Decodes one JSON value from a result row.
    ///
    /// Numbers are read from their literal text: integers that fit in an
    /// i64 become `Integer`, larger integer literals are kept exactly as
    /// `Text`, anything else numeric becomes `Float`. Nested arrays and
    /// objects are kept as their JSON text.
    pub fn from_raw_json(raw: &RawValue) -> Result<Self, NsqliteError> {
        let text = raw.get().trim();
        match text.as_bytes().first() {
            Some(b'-' | b'0'..=b'9') => Ok(decode_number(text)),
            Some(b'n') if text == "null" => Ok(Self::Null),
            Some(b't') if text == "true" => Ok(Self::Boolean(true)),
            Some(b'f') if text == "false" => Ok(Self::Boolean(false)),
            Some(b'"') => serde_json::from_str::<String>(text)
                .map(Self::Text)
                .map_err(NsqliteError::protocol),
            Some(b'[' | b'{') => Ok(Self::Text(text.to_string())),
            _ => Err(NsqliteError::Protocol(format!("invalid JSON value {text:?}"))),
        }
    }
}

fn decode_number(literal: &str) -> NsqliteValue {
    if let Ok(i) = literal.parse::<i64>() {
        return NsqliteValue::Integer(i);
    }
    let is_integer_literal = literal
        .strip_prefix('-')
        .unwrap_or(literal)
        .bytes()
        .all(|b| b.is_ascii_digit());
    if is_integer_literal {
        return NsqliteValue::Text(literal.to_string());
    }
    match literal.parse::<f64>() {
        Ok(f) => NsqliteValue::Float(f),
        Err(_) => NsqliteValue::Text(literal.to_string()),
    }
}

/// JSON encoding used for query parameters. Binary values travel as
/// standard base64 strings.
impl Serialize for NsqliteValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Binary(b) => serializer.serialize_str(&BASE64.encode(b)),
        }
    }
}

// -- Convenience conversions --

impl From<bool> for NsqliteValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for NsqliteValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for NsqliteValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u32> for NsqliteValue {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for NsqliteValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for NsqliteValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for NsqliteValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<Vec<u8>> for NsqliteValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(b)
    }
}

impl From<&[u8]> for NsqliteValue {
    fn from(b: &[u8]) -> Self {
        Self::Binary(b.to_vec())
    }
}

impl<T: Into<NsqliteValue>> From<Option<T>> for NsqliteValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for NsqliteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Binary(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> NsqliteValue {
        let raw = RawValue::from_string(text.to_string()).unwrap();
        NsqliteValue::from_raw_json(&raw).unwrap()
    }

    #[test]
    fn decode_scalars() {
        assert_eq!(decode("null"), NsqliteValue::Null);
        assert_eq!(decode("true"), NsqliteValue::Boolean(true));
        assert_eq!(decode("false"), NsqliteValue::Boolean(false));
        assert_eq!(decode("\"a\\nb\""), NsqliteValue::Text("a\nb".into()));
        assert_eq!(decode("42"), NsqliteValue::Integer(42));
        assert_eq!(decode("-7"), NsqliteValue::Integer(-7));
        assert_eq!(decode("1.5"), NsqliteValue::Float(1.5));
        assert_eq!(decode("1e3"), NsqliteValue::Float(1000.0));
    }

    #[test]
    fn decode_keeps_integer_precision() {
        // 2^53 + 1 cannot be represented as an f64.
        assert_eq!(
            decode("9007199254740993"),
            NsqliteValue::Integer(9_007_199_254_740_993)
        );
        assert_eq!(decode("9223372036854775807"), NsqliteValue::Integer(i64::MAX));
        assert_eq!(
            decode("123456789012345678901234567890"),
            NsqliteValue::Text("123456789012345678901234567890".into())
        );
    }

    #[test]
    fn decode_nested_as_text() {
        assert_eq!(decode("[1,2]"), NsqliteValue::Text("[1,2]".into()));
    }

    #[test]
    fn serialize_params() {
        let values = vec![
            NsqliteValue::Null,
            NsqliteValue::from(3),
            NsqliteValue::from(2.5),
            NsqliteValue::from("x"),
            NsqliteValue::from(true),
            NsqliteValue::from(vec![1u8, 2, 3]),
        ];
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[null,3,2.5,"x",true,"AQID"]"#
        );
    }

    #[test]
    fn option_conversion() {
        assert_eq!(NsqliteValue::from(None::<i64>), NsqliteValue::Null);
        assert_eq!(NsqliteValue::from(Some("a")), NsqliteValue::Text("a".into()));
    }
}
