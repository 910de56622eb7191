//! Generic claim values.
//!
//! Claims are mapped by the JSON kind of their decoded value, never by claim
//! name. Node kinds outside the supported set become [`ClaimValue::Absent`];
//! conversion never fails.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A decoded claim value.
///
/// Serializes back to plain JSON; `Absent` becomes `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClaimValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<ClaimValue>),
    Object(BTreeMap<String, ClaimValue>),
    /// No usable value (JSON `null`, or a number outside `i64`/`f64`).
    Absent,
}

impl ClaimValue {
    /// Convert a decoded JSON node into a claim value.
    #[must_use]
    pub fn extract(node: &Value) -> Self {
        match node {
            Value::String(s) => Self::String(s.clone()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if n.is_f64() {
                    n.as_f64().map_or(Self::Absent, Self::Float)
                } else {
                    // u64 above i64::MAX
                    Self::Absent
                }
            }
            Value::Bool(b) => Self::Boolean(*b),
            Value::Array(items) => Self::Array(items.iter().map(Self::extract).collect()),
            Value::Object(fields) => Self::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::extract(value)))
                    .collect(),
            ),
            Value::Null => Self::Absent,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as `f64`; integers are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[ClaimValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, ClaimValue>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<&Value> for ClaimValue {
    fn from(node: &Value) -> Self {
        Self::extract(node)
    }
}
