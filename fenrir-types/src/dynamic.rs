//! The untyped value boundary.
//!
//! Builders and backends hand the engine loosely typed values. [`Dynamic`]
//! models that input explicitly; [`detect_type`] and [`normalize`] are the
//! only places it is inspected. Past this boundary everything is a [`Value`].

use crate::{Error, PrimitiveType, Result, Value};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A loosely typed value as it arrives from outside the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum Dynamic {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    /// A list whose elements have not been checked for homogeneity.
    List(Vec<Dynamic>),
    Map(BTreeMap<String, Dynamic>),
}

impl Dynamic {
    /// Type of a scalar input. Lists, maps and null are `Unknown`.
    fn scalar_type(&self) -> PrimitiveType {
        match self {
            Self::String(_) => PrimitiveType::String,
            Self::Integer(_) => PrimitiveType::Integer,
            Self::Float(_) => PrimitiveType::Float,
            Self::Boolean(_) => PrimitiveType::Boolean,
            Self::Timestamp(_) => PrimitiveType::Timestamp,
            Self::Null | Self::List(_) | Self::Map(_) => PrimitiveType::Unknown,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::List(_) => "nested list",
            Self::Map(_) => "map",
            _ => "scalar",
        }
    }
}

/// Detects the primitive type of a dynamic value.
///
/// A list is only typed when every element shares one scalar type; mixed,
/// nested and empty lists are `Unknown`. Nothing is coerced.
pub fn detect_type(value: &Dynamic) -> PrimitiveType {
    match value {
        Dynamic::List(items) => {
            let Some(first) = items.first() else {
                return PrimitiveType::Unknown;
            };
            let element = first.scalar_type();
            if element.is_unknown() || items.iter().any(|v| v.scalar_type() != element) {
                return PrimitiveType::Unknown;
            }
            element.plural()
        }
        scalar => scalar.scalar_type(),
    }
}

/// Converts a dynamic value into a typed [`Value`].
///
/// Returns `Ok(None)` for null and for an empty list, whose element type
/// cannot be inferred. Fails with [`Error::TypeMismatch`] when list elements
/// disagree and with [`Error::Unsupported`] for maps and nested lists.
pub fn normalize(value: Dynamic) -> Result<Option<Value>> {
    let normalized = match value {
        Dynamic::Null => return Ok(None),
        Dynamic::String(v) => Value::String(v),
        Dynamic::Integer(v) => Value::Integer(v),
        Dynamic::Float(v) => Value::Float(v),
        Dynamic::Boolean(v) => Value::Boolean(v),
        Dynamic::Timestamp(v) => Value::Timestamp(v),
        Dynamic::Map(_) => return Err(Error::Unsupported("map".into())),
        Dynamic::List(items) => return normalize_list(items),
    };
    Ok(Some(normalized))
}

fn normalize_list(items: Vec<Dynamic>) -> Result<Option<Value>> {
    let Some(first) = items.first() else {
        return Ok(None);
    };
    let element = first.scalar_type();
    if element.is_unknown() {
        return Err(Error::Unsupported(format!(
            "list of {}",
            first.describe()
        )));
    }

    let mismatch = |found: &Dynamic| Error::TypeMismatch {
        expected: element,
        found: detect_type(found),
    };

    // Each arm collects exactly one element type; anything else is a mismatch.
    let value = match element {
        PrimitiveType::String => Value::StringList(
            items
                .into_iter()
                .map(|v| match v {
                    Dynamic::String(s) => Ok(s),
                    other => Err(mismatch(&other)),
                })
                .collect::<Result<_>>()?,
        ),
        PrimitiveType::Integer => Value::IntegerList(
            items
                .into_iter()
                .map(|v| match v {
                    Dynamic::Integer(i) => Ok(i),
                    other => Err(mismatch(&other)),
                })
                .collect::<Result<_>>()?,
        ),
        PrimitiveType::Float => Value::FloatList(
            items
                .into_iter()
                .map(|v| match v {
                    Dynamic::Float(f) => Ok(f),
                    other => Err(mismatch(&other)),
                })
                .collect::<Result<_>>()?,
        ),
        PrimitiveType::Boolean => Value::BooleanList(
            items
                .into_iter()
                .map(|v| match v {
                    Dynamic::Boolean(b) => Ok(b),
                    other => Err(mismatch(&other)),
                })
                .collect::<Result<_>>()?,
        ),
        PrimitiveType::Timestamp => Value::TimestampList(
            items
                .into_iter()
                .map(|v| match v {
                    Dynamic::Timestamp(ts) => Ok(ts),
                    other => Err(mismatch(&other)),
                })
                .collect::<Result<_>>()?,
        ),
        other => return Err(Error::Unsupported(format!("list of {other}"))),
    };
    Ok(Some(value))
}

impl From<serde_json::Value> for Dynamic {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<Value> for Dynamic {
    fn from(value: Value) -> Self {
        fn list<T>(items: Vec<T>, f: impl Fn(T) -> Dynamic) -> Dynamic {
            Dynamic::List(items.into_iter().map(f).collect())
        }

        match value {
            Value::String(v) => Self::String(v),
            Value::Integer(v) => Self::Integer(v),
            Value::Float(v) => Self::Float(v),
            Value::Boolean(v) => Self::Boolean(v),
            Value::Timestamp(v) => Self::Timestamp(v),
            Value::StringList(v) => list(v, Self::String),
            Value::IntegerList(v) => list(v, Self::Integer),
            Value::FloatList(v) => list(v, Self::Float),
            Value::BooleanList(v) => list(v, Self::Boolean),
            Value::TimestampList(v) => list(v, Self::Timestamp),
        }
    }
}

impl From<&str> for Dynamic {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for Dynamic {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Dynamic {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Dynamic {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<DateTime<Utc>> for Dynamic {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Vec<Dynamic>> for Dynamic {
    fn from(v: Vec<Dynamic>) -> Self {
        Self::List(v)
    }
}
