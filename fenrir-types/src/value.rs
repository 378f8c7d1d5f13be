//! Typed feature values.
//!
//! A [`Value`] always carries exactly one [`PrimitiveType`]. List variants are
//! backed by a `Vec` of the singular type, so homogeneity holds by
//! construction.

use crate::{Error, PrimitiveType, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A strongly typed feature value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),

    StringList(Vec<String>),
    IntegerList(Vec<i64>),
    FloatList(Vec<f64>),
    BooleanList(Vec<bool>),
    TimestampList(Vec<DateTime<Utc>>),
}

impl Value {
    /// Returns the type tag of this value.
    #[must_use]
    pub const fn primitive_type(&self) -> PrimitiveType {
        match self {
            Self::String(_) => PrimitiveType::String,
            Self::Integer(_) => PrimitiveType::Integer,
            Self::Float(_) => PrimitiveType::Float,
            Self::Boolean(_) => PrimitiveType::Boolean,
            Self::Timestamp(_) => PrimitiveType::Timestamp,
            Self::StringList(_) => PrimitiveType::StringList,
            Self::IntegerList(_) => PrimitiveType::IntegerList,
            Self::FloatList(_) => PrimitiveType::FloatList,
            Self::BooleanList(_) => PrimitiveType::BooleanList,
            Self::TimestampList(_) => PrimitiveType::TimestampList,
        }
    }

    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        self.primitive_type().is_scalar()
    }

    /// Returns the zero value of a type. List types yield an empty list.
    /// `Unknown` has no zero value.
    #[must_use]
    pub fn zero(primitive: PrimitiveType) -> Option<Self> {
        let zero = match primitive {
            PrimitiveType::Unknown => return None,
            PrimitiveType::String => Self::String(String::new()),
            PrimitiveType::Integer => Self::Integer(0),
            PrimitiveType::Float => Self::Float(0.0),
            PrimitiveType::Boolean => Self::Boolean(false),
            PrimitiveType::Timestamp => Self::Timestamp(DateTime::<Utc>::default()),
            PrimitiveType::StringList => Self::StringList(Vec::new()),
            PrimitiveType::IntegerList => Self::IntegerList(Vec::new()),
            PrimitiveType::FloatList => Self::FloatList(Vec::new()),
            PrimitiveType::BooleanList => Self::BooleanList(Vec::new()),
            PrimitiveType::TimestampList => Self::TimestampList(Vec::new()),
        };
        Some(zero)
    }

    /// Encodes a scalar value as a string.
    ///
    /// Timestamps are encoded as microseconds since the Unix epoch. The
    /// output is accepted back by [`Value::from_scalar_string`].
    pub fn scalar_string(&self) -> Result<String> {
        match self {
            Self::String(s) => Ok(s.clone()),
            Self::Integer(i) => Ok(i.to_string()),
            Self::Float(f) => Ok(f.to_string()),
            Self::Boolean(b) => Ok(b.to_string()),
            Self::Timestamp(ts) => Ok(ts.timestamp_micros().to_string()),
            other => Err(Error::InvalidArgument(format!(
                "{} is not a scalar type",
                other.primitive_type()
            ))),
        }
    }

    /// Decodes a scalar value of the given type from its string form.
    pub fn from_scalar_string(input: &str, scalar: PrimitiveType) -> Result<Self> {
        let parse_err = |reason: String| Error::Parse {
            primitive: scalar,
            input: input.to_string(),
            reason,
        };

        match scalar {
            PrimitiveType::String => Ok(Self::String(input.to_string())),
            PrimitiveType::Integer => input
                .parse::<i64>()
                .map(Self::Integer)
                .map_err(|e| parse_err(e.to_string())),
            PrimitiveType::Float => input
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|e| parse_err(e.to_string())),
            PrimitiveType::Boolean => parse_bool(input)
                .map(Self::Boolean)
                .ok_or_else(|| parse_err("expected a boolean literal".into())),
            PrimitiveType::Timestamp => {
                let micros = input
                    .parse::<i64>()
                    .map_err(|e| parse_err(e.to_string()))?;
                DateTime::<Utc>::from_timestamp_micros(micros)
                    .map(Self::Timestamp)
                    .ok_or_else(|| parse_err("timestamp out of range".into()))
            }
            other => Err(Error::InvalidArgument(format!(
                "{other} is not a scalar type"
            ))),
        }
    }

    /// Appends a singular item to a list value.
    pub fn push(&mut self, item: Value) -> Result<()> {
        match (self, item) {
            (Self::StringList(list), Self::String(v)) => list.push(v),
            (Self::IntegerList(list), Self::Integer(v)) => list.push(v),
            (Self::FloatList(list), Self::Float(v)) => list.push(v),
            (Self::BooleanList(list), Self::Boolean(v)) => list.push(v),
            (Self::TimestampList(list), Self::Timestamp(v)) => list.push(v),
            (list, item) => {
                return Err(Error::TypeMismatch {
                    expected: list.primitive_type().singular(),
                    found: item.primitive_type(),
                });
            }
        }
        Ok(())
    }

    /// Adds a numeric delta of the same type.
    pub fn checked_add(&self, by: &Value) -> Result<Value> {
        match (self, by) {
            (Self::Integer(a), Self::Integer(b)) => a
                .checked_add(*b)
                .map(Self::Integer)
                .ok_or_else(|| Error::InvalidArgument(format!("{a} + {b} overflows"))),
            (Self::Float(a), Self::Float(b)) => Ok(Self::Float(a + b)),
            (a, _) if !a.primitive_type().is_numeric() => Err(Error::InvalidArgument(format!(
                "{} is not a numeric type",
                a.primitive_type()
            ))),
            (a, b) => Err(Error::TypeMismatch {
                expected: a.primitive_type(),
                found: b.primitive_type(),
            }),
        }
    }

    /// Number of elements of a list value, `None` for scalars.
    #[must_use]
    pub fn list_len(&self) -> Option<usize> {
        match self {
            Self::StringList(v) => Some(v.len()),
            Self::IntegerList(v) => Some(v.len()),
            Self::FloatList(v) => Some(v.len()),
            Self::BooleanList(v) => Some(v.len()),
            Self::TimestampList(v) => Some(v.len()),
            _ => None,
        }
    }

    /// The singular items of a list value; a scalar is its own single item.
    #[must_use]
    pub fn items(&self) -> Vec<Value> {
        match self {
            Self::StringList(v) => v.iter().cloned().map(Self::String).collect(),
            Self::IntegerList(v) => v.iter().copied().map(Self::Integer).collect(),
            Self::FloatList(v) => v.iter().copied().map(Self::Float).collect(),
            Self::BooleanList(v) => v.iter().copied().map(Self::Boolean).collect(),
            Self::TimestampList(v) => v.iter().copied().map(Self::Timestamp).collect(),
            scalar => vec![scalar.clone()],
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
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    match input {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::StringList(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Self::IntegerList(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::FloatList(v)
    }
}

impl From<Vec<bool>> for Value {
    fn from(v: Vec<bool>) -> Self {
        Self::BooleanList(v)
    }
}

impl From<Vec<DateTime<Utc>>> for Value {
    fn from(v: Vec<DateTime<Utc>>) -> Self {
        Self::TimestampList(v)
    }
}

/// A value read back from a state backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureValue {
    pub value: Value,
    /// When the value was last written.
    pub timestamp: DateTime<Utc>,
    /// Whether the value is within the feature's freshness window.
    #[serde(default)]
    pub fresh: bool,
}

impl FeatureValue {
    #[must_use]
    pub fn new(value: Value, timestamp: DateTime<Utc>) -> Self {
        Self {
            value,
            timestamp,
            fresh: false,
        }
    }
}
