//! The kind-keyed plugin registry.
//!
//! One [`PluginSet`] per plugin kind, each mapping a name to a constructor.
//! The registry is an ordinary value built at startup and handed to the
//! engine; there is no global.

use crate::{
    ClusterClient, EngineApi, FeatureApi, HistoricalWriter, Notifier, PluginConfig, PluginError,
    PluginResult, State,
};
use clap::Command;
use fenrir_types::{
    BuilderSpec, CollectNotification, Context, DataConnector, Metadata, Notification,
    WriteNotification,
};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Contributes command-line flags for a plugin.
pub type ConfigBinder = Arc<dyn Fn(Command) -> PluginResult<Command> + Send + Sync>;

/// Populates a feature's runtime fields from its builder spec.
pub type FeatureApplier = Arc<
    dyn Fn(&Metadata, &BuilderSpec, &mut dyn FeatureApi, &dyn EngineApi) -> PluginResult<()>
        + Send
        + Sync,
>;

/// Establishes or updates external ingestion for a data connector.
/// Must be safe to invoke repeatedly.
pub type DataConnectorReconciler = Arc<
    dyn Fn(Context, Arc<dyn ClusterClient>, String, DataConnector) -> BoxFuture<'static, PluginResult<()>>
        + Send
        + Sync,
>;

pub type StateFactory = Arc<dyn Fn(&PluginConfig) -> PluginResult<Arc<dyn State>> + Send + Sync>;

pub type NotifierFactory<T> =
    Arc<dyn Fn(&PluginConfig) -> PluginResult<Arc<dyn Notifier<T>>> + Send + Sync>;

pub type CollectNotifierFactory = NotifierFactory<CollectNotification>;
pub type WriteNotifierFactory = NotifierFactory<WriteNotification>;

pub type HistoricalWriterFactory =
    Arc<dyn Fn(&PluginConfig) -> PluginResult<Arc<dyn HistoricalWriter>> + Send + Sync>;

/// Plugin categories, distinguished by constructor signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    ConfigBinder,
    FeatureApplier,
    DataConnectorReconciler,
    State,
    CollectNotifier,
    WriteNotifier,
    HistoricalWriter,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConfigBinder => "config binder",
            Self::FeatureApplier => "feature applier",
            Self::DataConnectorReconciler => "data connector reconciler",
            Self::State => "state",
            Self::CollectNotifier => "collect notifier",
            Self::WriteNotifier => "write notifier",
            Self::HistoricalWriter => "historical writer",
        })
    }
}

/// Named constructors of one kind.
///
/// Registration happens at startup and is read-mostly afterwards, but a
/// late registration racing a lookup is still safe.
pub struct PluginSet<P> {
    kind: PluginKind,
    entries: RwLock<HashMap<String, P>>,
}

impl<P: Clone> PluginSet<P> {
    pub fn new(kind: PluginKind) -> Self {
        Self {
            kind,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> PluginKind {
        self.kind
    }

    /// Registers a constructor. A second registration under the same name
    /// is rejected and leaves the first in place.
    pub fn register(&self, name: impl Into<String>, plugin: P) -> PluginResult<()> {
        let name = name.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&name) {
            return Err(PluginError::AlreadyRegistered {
                kind: self.kind,
                name,
            });
        }
        debug!(kind = %self.kind, name = %name, "plugin registered");
        entries.insert(name, plugin);
        Ok(())
    }

    pub fn get(&self, name: &str) -> PluginResult<P> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::NotFound {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Snapshot of every registered constructor, sorted by name.
    fn entries(&self) -> Vec<(String, P)> {
        let mut entries: Vec<(String, P)> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl<P> fmt::Debug for PluginSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<&String> = entries.keys().collect();
        names.sort();
        f.debug_struct("PluginSet")
            .field("kind", &self.kind)
            .field("names", &names)
            .finish()
    }
}

/// Every plugin kind the engine knows about.
#[derive(Debug)]
pub struct Plugins {
    pub config_binders: PluginSet<ConfigBinder>,
    pub feature_appliers: PluginSet<FeatureApplier>,
    pub reconcilers: PluginSet<DataConnectorReconciler>,
    pub states: PluginSet<StateFactory>,
    pub collect_notifiers: PluginSet<CollectNotifierFactory>,
    pub write_notifiers: PluginSet<WriteNotifierFactory>,
    pub historical_writers: PluginSet<HistoricalWriterFactory>,
}

impl Default for Plugins {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugins {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            config_binders: PluginSet::new(PluginKind::ConfigBinder),
            feature_appliers: PluginSet::new(PluginKind::FeatureApplier),
            reconcilers: PluginSet::new(PluginKind::DataConnectorReconciler),
            states: PluginSet::new(PluginKind::State),
            collect_notifiers: PluginSet::new(PluginKind::CollectNotifier),
            write_notifiers: PluginSet::new(PluginKind::WriteNotifier),
            historical_writers: PluginSet::new(PluginKind::HistoricalWriter),
        }
    }

    /// A registry holding the built-in plugins.
    pub fn with_builtins() -> PluginResult<Self> {
        let plugins = Self::new();
        crate::builtin::register(&plugins)?;
        Ok(plugins)
    }

    pub fn register_config_binder<F>(&self, name: impl Into<String>, binder: F) -> PluginResult<()>
    where
        F: Fn(Command) -> PluginResult<Command> + Send + Sync + 'static,
    {
        self.config_binders.register(name, Arc::new(binder))
    }

    pub fn register_feature_applier<F>(&self, name: impl Into<String>, applier: F) -> PluginResult<()>
    where
        F: Fn(&Metadata, &BuilderSpec, &mut dyn FeatureApi, &dyn EngineApi) -> PluginResult<()>
            + Send
            + Sync
            + 'static,
    {
        self.feature_appliers.register(name, Arc::new(applier))
    }

    pub fn register_reconciler<F>(&self, name: impl Into<String>, reconciler: F) -> PluginResult<()>
    where
        F: Fn(Context, Arc<dyn ClusterClient>, String, DataConnector) -> BoxFuture<'static, PluginResult<()>>
            + Send
            + Sync
            + 'static,
    {
        self.reconcilers.register(name, Arc::new(reconciler))
    }

    pub fn register_state<F>(&self, name: impl Into<String>, factory: F) -> PluginResult<()>
    where
        F: Fn(&PluginConfig) -> PluginResult<Arc<dyn State>> + Send + Sync + 'static,
    {
        self.states.register(name, Arc::new(factory))
    }

    pub fn register_collect_notifier<F>(&self, name: impl Into<String>, factory: F) -> PluginResult<()>
    where
        F: Fn(&PluginConfig) -> PluginResult<Arc<dyn Notifier<CollectNotification>>>
            + Send
            + Sync
            + 'static,
    {
        self.collect_notifiers.register(name, Arc::new(factory))
    }

    pub fn register_write_notifier<F>(&self, name: impl Into<String>, factory: F) -> PluginResult<()>
    where
        F: Fn(&PluginConfig) -> PluginResult<Arc<dyn Notifier<WriteNotification>>>
            + Send
            + Sync
            + 'static,
    {
        self.write_notifiers.register(name, Arc::new(factory))
    }

    pub fn register_historical_writer<F>(&self, name: impl Into<String>, factory: F) -> PluginResult<()>
    where
        F: Fn(&PluginConfig) -> PluginResult<Arc<dyn HistoricalWriter>> + Send + Sync + 'static,
    {
        self.historical_writers.register(name, Arc::new(factory))
    }

    /// Folds every config binder over `cmd`, in name order.
    pub fn bind_config(&self, cmd: Command) -> PluginResult<Command> {
        self.config_binders
            .entries()
            .into_iter()
            .try_fold(cmd, |cmd, (_, binder)| binder(cmd))
    }

    pub fn new_state(&self, name: &str, config: &PluginConfig) -> PluginResult<Arc<dyn State>> {
        (self.states.get(name)?)(config)
    }

    pub fn new_collect_notifier(
        &self,
        name: &str,
        config: &PluginConfig,
    ) -> PluginResult<Arc<dyn Notifier<CollectNotification>>> {
        (self.collect_notifiers.get(name)?)(config)
    }

    pub fn new_write_notifier(
        &self,
        name: &str,
        config: &PluginConfig,
    ) -> PluginResult<Arc<dyn Notifier<WriteNotification>>> {
        (self.write_notifiers.get(name)?)(config)
    }

    pub fn new_historical_writer(
        &self,
        name: &str,
        config: &PluginConfig,
    ) -> PluginResult<Arc<dyn HistoricalWriter>> {
        (self.historical_writers.get(name)?)(config)
    }

    /// Runs the reconciler that owns `connector.kind`.
    pub async fn reconcile(
        &self,
        ctx: &Context,
        client: Arc<dyn ClusterClient>,
        engine_addr: &str,
        connector: DataConnector,
    ) -> PluginResult<()> {
        let reconciler = self.reconcilers.get(&connector.kind)?;
        debug!(fqn = %connector.fqn, kind = %connector.kind, "reconciling data connector");
        let fut = reconciler(ctx.child(), client, engine_addr.to_string(), connector);
        ctx.run(fut).await?
    }
}

/// Picks the notifier factory set for a notification type.
pub trait NotifierRegistry<T: Notification> {
    fn notifier_set(&self) -> &PluginSet<NotifierFactory<T>>;
}

impl NotifierRegistry<CollectNotification> for Plugins {
    fn notifier_set(&self) -> &PluginSet<CollectNotifierFactory> {
        &self.collect_notifiers
    }
}

impl NotifierRegistry<WriteNotification> for Plugins {
    fn notifier_set(&self) -> &PluginSet<WriteNotifierFactory> {
        &self.write_notifiers
    }
}
