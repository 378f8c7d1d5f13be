//! Plugin contracts and the plugin registry for the Fenrir feature engine.
//!
//! Backends plug into the engine through a handful of contracts:
//!
//! - [`State`]: the store behind get/set/append/incr/update
//! - [`Notifier<T>`]: sinks for collect or write notifications
//! - [`HistoricalWriter`]: cold storage for written values
//! - [`FeatureApplier`]: turns a builder spec into runtime behavior,
//!   working through [`FeatureApi`] and [`EngineApi`]
//! - [`DataConnectorReconciler`]: sets up external ingestion through a
//!   [`ClusterClient`]
//!
//! Constructors for each are registered by name in [`Plugins`], which is
//! built at startup and passed to the engine.

mod api;
pub mod builtin;
mod cluster;
mod config;
mod error;
mod hooks;
mod notifier;
mod registry;
mod state;

pub use api::{EngineApi, FeatureApi};
pub use cluster::ClusterClient;
pub use config::PluginConfig;
pub use error::{PluginError, PluginResult};
pub use hooks::{Hook, HookArgs, HookChain};
pub use notifier::{HistoricalWriter, Notifier};
pub use registry::{
    CollectNotifierFactory, ConfigBinder, DataConnectorReconciler, FeatureApplier,
    HistoricalWriterFactory, NotifierFactory, NotifierRegistry, PluginKind, PluginSet, Plugins,
    StateFactory, WriteNotifierFactory,
};
pub use state::State;
