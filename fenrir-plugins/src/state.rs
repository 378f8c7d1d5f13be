//! The state backend contract.

use crate::PluginResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fenrir_types::{Context, FeatureValue, Value};

/// Storage for feature values keyed by (FQN, entity).
///
/// The engine has already checked the value's type against the feature
/// when these are called. Backends own retries; the engine never retries.
#[async_trait]
pub trait State: Send + Sync {
    /// Returns the stored value, or `None` if nothing has been written.
    ///
    /// `fqn` may carry an aggregation suffix (`clicks[sum]`); writes always
    /// use the bare feature FQN. A backend that cannot serve an aggregation
    /// returns an error rather than `None`.
    async fn get(&self, ctx: &Context, fqn: &str, entity_id: &str) -> PluginResult<Option<FeatureValue>>;

    /// Overwrites the stored value.
    async fn set(&self, ctx: &Context, fqn: &str, entity_id: &str, value: Value, ts: DateTime<Utc>) -> PluginResult<()>;

    /// Appends a single item to a list value, creating the list if needed.
    async fn append(&self, ctx: &Context, fqn: &str, entity_id: &str, item: Value, ts: DateTime<Utc>) -> PluginResult<()>;

    /// Adds `by` to a numeric value, starting from zero if absent.
    async fn incr(&self, ctx: &Context, fqn: &str, entity_id: &str, by: Value, ts: DateTime<Utc>) -> PluginResult<()>;

    /// Writes the value unless a newer one is already stored.
    async fn update(&self, ctx: &Context, fqn: &str, entity_id: &str, value: Value, ts: DateTime<Utc>) -> PluginResult<()>;
}
