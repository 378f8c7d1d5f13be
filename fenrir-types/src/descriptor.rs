//! Declarative descriptors and their validated form.
//!
//! A [`FeatureDescriptor`] is what the authoring front-end produces. The
//! engine validates it into [`Metadata`] before resolving a builder. The
//! builder's own configuration stays opaque here: [`BuilderSpec::options`]
//! is handed to the builder plugin untouched.

use crate::duration::serde_go;
use crate::{AggrFn, Error, Fqn, PrimitiveType, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Builder selection plus its plugin-specific options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuilderSpec {
    /// Name of the feature-builder plugin (e.g. "headless", "expression").
    pub kind: String,
    /// Everything else in the builder table, uninterpreted.
    #[serde(flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl BuilderSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: serde_json::Map::new(),
        }
    }

    /// Adds an option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Reads an option as `T`. Missing keys are `Ok(None)`.
    pub fn option<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.options
            .get(key)
            .map(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    Error::InvalidDescriptor(format!("builder option `{key}`: {e}"))
                })
            })
            .transpose()
    }
}

/// Declarative description of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub primitive: PrimitiveType,
    /// Target recompute interval.
    #[serde(default, with = "serde_go")]
    pub freshness: Duration,
    /// Maximum age before a stored value is treated as absent. Zero disables.
    #[serde(default, with = "serde_go")]
    pub staleness: Duration,
    /// Per-operation backend timeout. Zero means the caller's context decides.
    #[serde(default, with = "serde_go")]
    pub timeout: Duration,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggr: Vec<AggrFn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    pub builder: BuilderSpec,
}

impl FeatureDescriptor {
    pub fn new(name: impl Into<String>, primitive: PrimitiveType, builder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            primitive,
            freshness: Duration::ZERO,
            staleness: Duration::ZERO,
            timeout: Duration::ZERO,
            aggr: Vec::new(),
            data_source: None,
            builder: BuilderSpec::new(builder),
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    #[must_use]
    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_aggr(mut self, aggr: AggrFn) -> Self {
        self.aggr.push(aggr);
        self
    }

    #[must_use]
    pub fn with_data_source(mut self, fqn: impl Into<String>) -> Self {
        self.data_source = Some(fqn.into());
        self
    }

    #[must_use]
    pub fn with_builder(mut self, builder: BuilderSpec) -> Self {
        self.builder = builder;
        self
    }

    /// Parses a descriptor from a TOML table.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::InvalidDescriptor(e.to_string()))
    }

    /// Parses a descriptor from JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::InvalidDescriptor(e.to_string()))
    }

    /// The feature's FQN.
    pub fn fqn(&self) -> Result<Fqn> {
        Fqn::new(self.namespace.as_deref(), &self.name)
    }

    /// Validates the descriptor into engine metadata.
    pub fn metadata(&self) -> Result<Metadata> {
        let invalid = |msg: String| Error::InvalidDescriptor(format!("{}: {msg}", self.name));

        let fqn = self.fqn().map_err(|e| invalid(e.to_string()))?;
        if self.primitive.is_unknown() {
            return Err(invalid("unknown primitive type".into()));
        }
        if self.builder.kind.trim().is_empty() {
            return Err(invalid("builder kind is required".into()));
        }
        if !self.staleness.is_zero() && self.staleness < self.freshness {
            return Err(invalid(format!(
                "staleness ({}) must not be shorter than freshness ({})",
                crate::duration::format(self.staleness),
                crate::duration::format(self.freshness),
            )));
        }
        if let Some(aggr) = self.aggr.iter().find(|a| !a.supports(self.primitive)) {
            return Err(invalid(format!(
                "aggregation `{aggr}` does not support {}",
                self.primitive
            )));
        }

        Ok(Metadata {
            fqn: fqn.feature_fqn(),
            primitive: self.primitive,
            aggr: self.aggr.clone(),
            freshness: self.freshness,
            staleness: self.staleness,
            timeout: self.timeout,
            builder: self.builder.kind.clone(),
            data_source: self.data_source.clone(),
        })
    }
}

/// Validated, descriptive fields of a bound feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub fqn: String,
    pub primitive: PrimitiveType,
    #[serde(default)]
    pub aggr: Vec<AggrFn>,
    #[serde(with = "serde_go")]
    pub freshness: Duration,
    #[serde(with = "serde_go")]
    pub staleness: Duration,
    #[serde(with = "serde_go")]
    pub timeout: Duration,
    pub builder: String,
    #[serde(default)]
    pub data_source: Option<String>,
}

impl Metadata {
    /// Whether a value of this age is within the freshness window.
    #[must_use]
    pub fn is_fresh(&self, age: Duration) -> bool {
        age <= self.freshness
    }

    /// Whether a value of this age must be treated as absent.
    #[must_use]
    pub fn is_stale(&self, age: Duration) -> bool {
        !self.staleness.is_zero() && age > self.staleness
    }

    #[must_use]
    pub fn supports_aggr(&self, aggr: AggrFn) -> bool {
        self.aggr.contains(&aggr)
    }
}

/// A bound data source: an FQN and an opaque configuration blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub fqn: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

impl DataSource {
    pub fn new(fqn: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            kind: kind.into(),
            config: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}

/// Descriptor handed to data-connector reconcilers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConnector {
    pub fqn: String,
    /// Name of the reconciler plugin that owns this connector.
    pub kind: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

impl DataConnector {
    pub fn new(fqn: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            kind: kind.into(),
            config: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}
