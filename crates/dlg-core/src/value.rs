use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ValueType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Text(_) => ValueType::Text,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Parses a script literal, trying integer, float and boolean before
/// falling back to text. One pair of surrounding double quotes is removed
/// from text literals.
pub fn parse_literal(raw: &str) -> Value {
    let raw = raw.trim();

    if let Ok(value) = raw.parse::<i64>() {
        return Value::Integer(value);
    }

    if looks_numeric(raw) {
        if let Ok(value) = raw.parse::<f64>() {
            return Value::Float(value);
        }
    }

    if raw.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    Value::Text(unquote(raw).to_string())
}

pub fn unquote(raw: &str) -> &str {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

// `f64::from_str` also accepts "inf" and "NaN", which are identifiers here.
fn looks_numeric(raw: &str) -> bool {
    raw.bytes().any(|byte| byte.is_ascii_digit())
        && raw
            .bytes()
            .all(|byte| byte.is_ascii_digit() || matches!(byte, b'.' | b'-' | b'+' | b'e' | b'E'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literal_prefers_integer_then_float_then_boolean() {
        assert_eq!(parse_literal("10"), Value::Integer(10));
        assert_eq!(parse_literal("-3"), Value::Integer(-3));
        assert_eq!(parse_literal("2.5"), Value::Float(2.5));
        assert_eq!(parse_literal("True"), Value::Boolean(true));
        assert_eq!(parse_literal("false"), Value::Boolean(false));
    }

    #[test]
    fn parse_literal_falls_back_to_text_and_strips_quotes() {
        assert_eq!(parse_literal("\"Hello there\""), Value::from("Hello there"));
        assert_eq!(parse_literal("bare"), Value::from("bare"));
        assert_eq!(parse_literal("NaN"), Value::from("NaN"));
        assert_eq!(parse_literal("\"\""), Value::from(""));
    }

    #[test]
    fn equality_is_exact_per_variant() {
        assert_ne!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::Text("1".to_string()), Value::Integer(1));
        assert_eq!(Value::Boolean(true), Value::from(true));
    }

    #[test]
    fn display_renders_plain_values() {
        assert_eq!(Value::Integer(5).to_string(), "5");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::from("Alex").to_string(), "Alex");
    }

    #[test]
    fn serde_untagged_roundtrip_keeps_variants() {
        let encoded = serde_json::to_string(&vec![
            Value::Integer(3),
            Value::Float(0.5),
            Value::Boolean(true),
            Value::from("x"),
        ])
        .expect("values should serialize");
        assert_eq!(encoded, r#"[3,0.5,true,"x"]"#);
        let decoded: Vec<Value> = serde_json::from_str(&encoded).expect("values should parse");
        assert_eq!(decoded[0], Value::Integer(3));
        assert_eq!(decoded[1], Value::Float(0.5));
    }
}
