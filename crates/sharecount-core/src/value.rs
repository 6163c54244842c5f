//! Attribute values reported by platform parsers.
//!
//! Platforms disagree on how they encode counts: some send integers, some
//! floats, some numeric strings. [`StatValue`] keeps the original shape so the
//! report can echo it back unchanged while the normalizer decides what counts.

use std::collections::BTreeMap;

use serde::Serialize;

/// Attribute bag produced by a single platform.
pub type Attributes = BTreeMap<String, StatValue>;

/// Dynamically-shaped attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<StatValue>),
    Map(BTreeMap<String, StatValue>),
}

impl StatValue {
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<i64> for StatValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for StatValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for StatValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for StatValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<bool> for StatValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for StatValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for StatValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values.into_iter().map(Self::Text).collect())
    }
}

impl From<serde_json::Value> for StatValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => Self::Int(value),
                // u64 beyond i64::MAX and every fractional number land here
                None => Self::Float(number.as_f64().unwrap_or(0.0)),
            },
            Value::String(value) => Self::Text(value),
            Value::Array(values) => Self::List(values.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Option<&serde_json::Value>> for StatValue {
    fn from(value: Option<&serde_json::Value>) -> Self {
        value.cloned().map_or(Self::Null, Self::from)
    }
}
