//! Configuration handed to plugin factories.
//!
//! A [`PluginConfig`] starts as the `[plugins]` table of the engine's TOML
//! file and is overlaid with whatever flags config binders contributed to
//! the command line.

use crate::{PluginError, PluginResult};
use clap::ArgMatches;
use clap::parser::ValueSource;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// String-keyed plugin options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig(Map<String, Value>);

impl PluginConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Reads `key` as `T`. Missing keys are `Ok(None)`; present keys of the
    /// wrong shape are a [`PluginError::Config`].
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> PluginResult<Option<T>> {
        self.0
            .get(key)
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| PluginError::Config(format!("`{key}`: {e}")))
            })
            .transpose()
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> PluginResult<T> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Reads a Go-style duration string such as `"30s"`.
    pub fn get_duration(&self, key: &str) -> PluginResult<Option<Duration>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => fenrir_types::duration::parse(s)
                .map(Some)
                .map_err(|e| PluginError::Config(format!("`{key}`: {e}"))),
            Some(other) => Err(PluginError::Config(format!(
                "`{key}`: expected a duration string, got {other}"
            ))),
        }
    }

    /// Overlays `other` on top of this config.
    pub fn merge(&mut self, other: PluginConfig) {
        self.0.extend(other.0);
    }

    /// Lifts explicitly given command-line values into the config.
    ///
    /// Values left at their clap default are skipped so they never shadow
    /// the TOML file.
    pub fn merge_matches(&mut self, matches: &ArgMatches) {
        for id in matches.ids() {
            let key = id.as_str();
            if matches!(matches.value_source(key), None | Some(ValueSource::DefaultValue)) {
                continue;
            }
            if let Some(value) = arg_value(matches, key) {
                self.0.insert(key.to_string(), value);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Reads a single-valued argument of any of the value types config
/// binders use.
fn arg_value(matches: &ArgMatches, key: &str) -> Option<Value> {
    if let Ok(Some(s)) = matches.try_get_one::<String>(key) {
        return Some(scalar_from_flag(s));
    }
    if let Ok(Some(b)) = matches.try_get_one::<bool>(key) {
        return Some(Value::Bool(*b));
    }
    if let Ok(Some(n)) = matches.try_get_one::<usize>(key) {
        return Some(Value::from(*n));
    }
    if let Ok(Some(n)) = matches.try_get_one::<u64>(key) {
        return Some(Value::from(*n));
    }
    if let Ok(Some(n)) = matches.try_get_one::<i64>(key) {
        return Some(Value::from(*n));
    }
    if let Ok(Some(f)) = matches.try_get_one::<f64>(key) {
        return Some(Value::from(*f));
    }
    None
}

/// Untyped flags arrive as strings; numbers and booleans are recovered so
/// typed getters work the same as for TOML values.
fn scalar_from_flag(s: &str) -> Value {
    match serde_json::from_str::<Value>(s) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(s.to_string()),
    }
}

impl From<Map<String, Value>> for PluginConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
