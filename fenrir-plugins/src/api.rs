//! Handles given to feature-builder appliers: the feature under
//! construction and the engine it is being bound into.

use crate::{Hook, PluginResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fenrir_types::{Context, DataSource, Dynamic, FeatureValue, Metadata};

/// The feature being constructed by an applier.
pub trait FeatureApi: Send {
    fn metadata(&self) -> &Metadata;

    fn add_pre_get_hook(&mut self, priority: i32, hook: Hook);
    fn add_post_get_hook(&mut self, priority: i32, hook: Hook);
    fn add_pre_set_hook(&mut self, priority: i32, hook: Hook);
    fn add_post_set_hook(&mut self, priority: i32, hook: Hook);

    /// Tags the feature with the runtime that computes it.
    fn set_runtime(&mut self, runtime: &str);
}

/// The engine as seen from inside a plugin.
#[async_trait]
pub trait EngineApi: Send + Sync {
    fn metadata(&self, fqn: &str) -> PluginResult<Metadata>;

    fn data_source(&self, fqn: &str) -> PluginResult<DataSource>;

    async fn get(&self, ctx: &Context, fqn: &str, entity_id: &str) -> PluginResult<(Option<FeatureValue>, Metadata)>;

    async fn set(&self, ctx: &Context, fqn: &str, entity_id: &str, value: Dynamic, ts: DateTime<Utc>) -> PluginResult<()>;

    async fn append(&self, ctx: &Context, fqn: &str, entity_id: &str, item: Dynamic, ts: DateTime<Utc>) -> PluginResult<()>;

    async fn incr(&self, ctx: &Context, fqn: &str, entity_id: &str, by: Dynamic, ts: DateTime<Utc>) -> PluginResult<()>;

    async fn update(&self, ctx: &Context, fqn: &str, entity_id: &str, value: Dynamic, ts: DateTime<Utc>) -> PluginResult<()>;
}
