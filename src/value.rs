use std::collections::BTreeMap;
use std::fmt;

/// A value as returned by an attribute read or an operation invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum JmxValue {
    /// No value, e.g. the result of a void operation.
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<JmxValue>),
    Composite(BTreeMap<String, JmxValue>),
}

impl JmxValue {
    /// Returns the value as a number if it is one. Strings are never coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JmxValue::Integer(i) => Some(*i as f64),
            JmxValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JmxValue::Null)
    }

    /// Returns a single item of a composite value.
    pub fn composite_key(&self, key: &str) -> Option<&JmxValue> {
        match self {
            JmxValue::Composite(items) => items.get(key),
            _ => None,
        }
    }

    /// Parses a numeric literal, keeping integers as integers.
    pub fn parse_number(s: &str) -> Option<JmxValue> {
        if let Ok(i) = s.parse::<i64>() {
            return Some(JmxValue::Integer(i));
        }

        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(JmxValue::Float)
    }
}

impl fmt::Display for JmxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JmxValue::Null => f.write_str("null"),
            JmxValue::Bool(b) => write!(f, "{}", b),
            JmxValue::Integer(i) => write!(f, "{}", i),
            JmxValue::Float(x) => write!(f, "{}", x),
            JmxValue::String(s) => f.write_str(s),
            JmxValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            JmxValue::Composite(items) => {
                f.write_str("{")?;
                for (i, (key, item)) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, item)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<serde_json::Value> for JmxValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => JmxValue::Null,
            Value::Bool(b) => JmxValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => JmxValue::Integer(i),
                // u64 beyond i64::MAX ends up here as well
                None => JmxValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => JmxValue::String(s),
            Value::Array(items) => JmxValue::Array(items.into_iter().map(JmxValue::from).collect()),
            Value::Object(items) => JmxValue::Composite(
                items
                    .into_iter()
                    .map(|(k, v)| (k, JmxValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for JmxValue {
    fn from(i: i64) -> Self {
        JmxValue::Integer(i)
    }
}

impl From<f64> for JmxValue {
    fn from(x: f64) -> Self {
        JmxValue::Float(x)
    }
}

impl From<&str> for JmxValue {
    fn from(s: &str) -> Self {
        JmxValue::String(s.to_owned())
    }
}
