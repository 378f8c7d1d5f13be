//! The closed set of primitive value types.
//!
//! Every scalar type has exactly one list counterpart. `Unknown` is the soft
//! failure tag returned for unrecognized aliases and undetectable values; it
//! is a fixed point of both [`PrimitiveType::singular`] and
//! [`PrimitiveType::plural`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A primitive value type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    #[default]
    Unknown,
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,

    StringList,
    IntegerList,
    FloatList,
    BooleanList,
    TimestampList,
}

impl PrimitiveType {
    /// All scalar tags, in declaration order.
    pub const SCALARS: [Self; 5] = [
        Self::String,
        Self::Integer,
        Self::Float,
        Self::Boolean,
        Self::Timestamp,
    ];

    /// All list tags, index-aligned with [`Self::SCALARS`].
    pub const LISTS: [Self; 5] = [
        Self::StringList,
        Self::IntegerList,
        Self::FloatList,
        Self::BooleanList,
        Self::TimestampList,
    ];

    /// Looks a type up by alias, case-insensitively.
    ///
    /// Unrecognized input yields [`PrimitiveType::Unknown`] rather than an
    /// error so callers can treat it as a soft failure.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => Self::String,
            "integer" | "int" | "int32" | "int64" => Self::Integer,
            "float" | "double" | "float32" | "float64" => Self::Float,
            "time" | "datetime" | "timestamp" | "time.time" | "datetime.datetime" => {
                Self::Timestamp
            }
            "bool" | "boolean" => Self::Boolean,
            "[]string" | "[]text" => Self::StringList,
            "[]integer" | "[]int" | "[]int32" | "[]int64" => Self::IntegerList,
            "[]float" | "[]double" | "[]float32" | "[]float64" => Self::FloatList,
            "[]bool" | "[]boolean" => Self::BooleanList,
            "[]time" | "[]datetime" | "[]timestamp" | "[]time.time" | "[]datetime.datetime" => {
                Self::TimestampList
            }
            _ => Self::Unknown,
        }
    }

    /// Returns true unless this is a list tag. `Unknown` counts as scalar.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(
            self,
            Self::StringList
                | Self::IntegerList
                | Self::FloatList
                | Self::BooleanList
                | Self::TimestampList
        )
    }

    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns true for `Integer` and `Float`.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Returns the element type of a list tag; scalar tags map to themselves.
    #[must_use]
    pub const fn singular(self) -> Self {
        match self {
            Self::StringList => Self::String,
            Self::IntegerList => Self::Integer,
            Self::FloatList => Self::Float,
            Self::BooleanList => Self::Boolean,
            Self::TimestampList => Self::Timestamp,
            other => other,
        }
    }

    /// Returns the list tag of a scalar tag; list tags map to themselves.
    #[must_use]
    pub const fn plural(self) -> Self {
        match self {
            Self::String => Self::StringList,
            Self::Integer => Self::IntegerList,
            Self::Float => Self::FloatList,
            Self::Boolean => Self::BooleanList,
            Self::Timestamp => Self::TimestampList,
            other => other,
        }
    }

    /// Canonical name, accepted back by [`PrimitiveType::parse`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "(unknown)",
            Self::String => "string",
            Self::Integer => "int",
            Self::Float => "float",
            Self::Boolean => "bool",
            Self::Timestamp => "timestamp",
            Self::StringList => "[]string",
            Self::IntegerList => "[]int",
            Self::FloatList => "[]float",
            Self::BooleanList => "[]bool",
            Self::TimestampList => "[]timestamp",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for PrimitiveType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PrimitiveType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}
