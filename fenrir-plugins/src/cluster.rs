//! Access to the orchestration platform, for data-connector reconcilers.

use crate::PluginResult;
use async_trait::async_trait;
use fenrir_types::Context;

/// Minimal client for the platform that runs ingestion workloads.
///
/// Reconcilers describe the resources they need as JSON manifests and
/// apply them. `apply` must be an upsert so reconciliation can repeat.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn apply(&self, ctx: &Context, kind: &str, name: &str, manifest: serde_json::Value) -> PluginResult<()>;

    /// Deleting a missing resource is not an error.
    async fn delete(&self, ctx: &Context, kind: &str, name: &str) -> PluginResult<()>;
}
