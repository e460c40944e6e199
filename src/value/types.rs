//! The `QbValue` tree

use super::dates::{format_datetime, parse_datetime};
use chrono::{DateTime, Utc};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// A JSON value that may also hold a date-time
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QbValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    DateTime(DateTime<Utc>),
    Array(Vec<QbValue>),
    Object(BTreeMap<String, QbValue>),
}

static NULL: QbValue = QbValue::Null;

impl QbValue {
    /// Convert a JSON value, reviving ISO-8601 strings at any depth when
    /// `convert_dates` is set
    pub fn from_json(value: Value, convert_dates: bool) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => {
                if convert_dates {
                    if let Some(dt) = parse_datetime(&s) {
                        return Self::DateTime(dt);
                    }
                }
                Self::String(s)
            }
            Value::Array(items) => Self::Array(
                items
                    .into_iter()
                    .map(|v| Self::from_json(v, convert_dates))
                    .collect(),
            ),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v, convert_dates)))
                    .collect(),
            ),
        }
    }

    /// Lower to plain JSON; date-times become ISO-8601 strings
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::DateTime(dt) => Value::String(format_datetime(dt)),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    /// Field of an object
    pub fn get(&self, key: &str) -> Option<&QbValue> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<QbValue>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, QbValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl From<Value> for QbValue {
    /// Plain conversion; strings stay strings
    fn from(value: Value) -> Self {
        Self::from_json(value, false)
    }
}

impl From<&QbValue> for Value {
    fn from(value: &QbValue) -> Self {
        value.to_json()
    }
}

impl From<QbValue> for Value {
    fn from(value: QbValue) -> Self {
        value.to_json()
    }
}

impl From<DateTime<Utc>> for QbValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<&str> for QbValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for QbValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for QbValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<bool> for QbValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<'a> Index<&'a str> for QbValue {
    type Output = QbValue;

    /// Missing keys and non-objects index to `Null`, like `serde_json::Value`
    fn index(&self, key: &'a str) -> &QbValue {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for QbValue {
    type Output = QbValue;

    fn index(&self, index: usize) -> &QbValue {
        match self {
            Self::Array(items) => items.get(index).unwrap_or(&NULL),
            _ => &NULL,
        }
    }
}

impl Serialize for QbValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::DateTime(dt) => serializer.serialize_str(&format_datetime(dt)),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for QbValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl fmt::Display for QbValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
