//! Fully-qualified feature names.
//!
//! Grammar: `[namespace.]name` with an optional `[fn]` aggregation suffix,
//! e.g. `clicks`, `web.clicks`, `web.clicks[sum]`. Name segments are lower
//! case alphanumerics, `_` and `-`, and may not start or end with `_`/`-`.

use crate::{Error, PrimitiveType, Result, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Aggregation function applied over a feature's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggrFn {
    Sum,
    Avg,
    Max,
    Min,
    Count,
    DistinctCount,
    ApproxDistinctCount,
}

impl AggrFn {
    pub const ALL: [Self; 7] = [
        Self::Sum,
        Self::Avg,
        Self::Max,
        Self::Min,
        Self::Count,
        Self::DistinctCount,
        Self::ApproxDistinctCount,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Max => "max",
            Self::Min => "min",
            Self::Count => "count",
            Self::DistinctCount => "distinct_count",
            Self::ApproxDistinctCount => "approx_distinct_count",
        }
    }

    /// Arithmetic aggregations only apply to numeric features; counting
    /// applies to any known type.
    #[must_use]
    pub const fn supports(self, primitive: PrimitiveType) -> bool {
        match self {
            Self::Sum | Self::Avg | Self::Max | Self::Min => primitive.is_numeric(),
            Self::Count | Self::DistinctCount | Self::ApproxDistinctCount => {
                !primitive.is_unknown()
            }
        }
    }

    /// Type of the aggregate over a feature of type `primitive`.
    #[must_use]
    pub const fn output_type(self, primitive: PrimitiveType) -> PrimitiveType {
        match self {
            Self::Sum | Self::Max | Self::Min => primitive.singular(),
            Self::Avg => PrimitiveType::Float,
            Self::Count | Self::DistinctCount | Self::ApproxDistinctCount => {
                PrimitiveType::Integer
            }
        }
    }

    /// Aggregates the items of `value`. A scalar is a window of one item.
    ///
    /// Returns `None` for `avg`, `max` and `min` over an empty list.
    pub fn apply(self, value: &Value) -> Result<Option<Value>> {
        let item_type = value.primitive_type().singular();
        if !self.supports(item_type) {
            return Err(Error::InvalidArgument(format!(
                "{self} does not apply to {}",
                value.primitive_type()
            )));
        }
        let items = value.items();
        let count = i64::try_from(items.len()).unwrap_or(i64::MAX);

        match self {
            Self::Sum => sum(item_type, &items).map(Some),
            Self::Avg if items.is_empty() => Ok(None),
            Self::Avg => {
                let total = match sum(item_type, &items)? {
                    Value::Integer(n) => n as f64,
                    Value::Float(f) => f,
                    other => {
                        return Err(Error::InvalidArgument(format!(
                            "cannot average {}",
                            other.primitive_type()
                        )));
                    }
                };
                Ok(Some(Value::Float(total / count as f64)))
            }
            Self::Max | Self::Min => {
                let want_max = self == Self::Max;
                Ok(items.into_iter().reduce(|best, next| {
                    let replace = match (&best, &next) {
                        (Value::Integer(a), Value::Integer(b)) => (b > a) == want_max && b != a,
                        (Value::Float(a), Value::Float(b)) => (b > a) == want_max && b != a,
                        _ => false,
                    };
                    if replace { next } else { best }
                }))
            }
            Self::Count => Ok(Some(Value::Integer(count))),
            Self::DistinctCount | Self::ApproxDistinctCount => {
                let distinct = items
                    .iter()
                    .map(Value::scalar_string)
                    .collect::<Result<HashSet<_>>>()?;
                Ok(Some(Value::Integer(
                    i64::try_from(distinct.len()).unwrap_or(i64::MAX),
                )))
            }
        }
    }
}

fn sum(item_type: PrimitiveType, items: &[Value]) -> Result<Value> {
    let zero = Value::zero(item_type)
        .ok_or_else(|| Error::InvalidArgument(format!("{item_type} has no zero value")))?;
    items.iter().try_fold(zero, |acc, item| acc.checked_add(item))
}

impl fmt::Display for AggrFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggrFn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| Error::InvalidFqn(format!("unknown aggregation function `{s}`")))
    }
}

/// A parsed fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fqn {
    namespace: Option<String>,
    name: String,
    aggr: Option<AggrFn>,
}

impl Fqn {
    /// Builds an FQN from its parts, validating each segment.
    pub fn new(namespace: Option<&str>, name: &str) -> Result<Self> {
        if let Some(ns) = namespace {
            validate_segment(ns, "namespace")?;
        }
        validate_segment(name, "name")?;
        Ok(Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            aggr: None,
        })
    }

    /// Parses `[namespace.]name[aggr]`.
    pub fn parse(s: &str) -> Result<Self> {
        let (base, aggr) = match s.strip_suffix(']') {
            Some(rest) => {
                let (base, func) = rest
                    .split_once('[')
                    .ok_or_else(|| Error::InvalidFqn(format!("unbalanced `]` in `{s}`")))?;
                (base, Some(func.parse::<AggrFn>()?))
            }
            None => (s, None),
        };

        let fqn = match base.split_once('.') {
            Some((ns, name)) => Self::new(Some(ns), name)?,
            None => Self::new(None, base)?,
        };
        Ok(Self { aggr, ..fqn })
    }

    #[must_use]
    pub fn with_aggr(mut self, aggr: AggrFn) -> Self {
        self.aggr = Some(aggr);
        self
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aggr(&self) -> Option<AggrFn> {
        self.aggr
    }

    /// The FQN of the underlying feature, without the aggregation suffix.
    #[must_use]
    pub fn feature_fqn(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.feature_fqn())?;
        if let Some(aggr) = self.aggr {
            write!(f, "[{aggr}]")?;
        }
        Ok(())
    }
}

impl FromStr for Fqn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn validate_segment(segment: &str, what: &str) -> Result<()> {
    let legal_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let valid = !segment.is_empty()
        && segment.chars().all(|c| legal_char(c) || c == '_' || c == '-')
        && segment.chars().next().is_some_and(legal_char)
        && segment.chars().last().is_some_and(legal_char);

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidFqn(format!("illegal {what} `{segment}`")))
    }
}
