//! The Fenrir online feature engine.
//!
//! [`Engine`] binds declarative feature and data source descriptors into
//! live state and serves get/set/append/incr/update over a pluggable state
//! backend, fanning collect and write notifications out to notifier
//! plugins.
//!
//! # Example
//!
//! ```
//! use fenrir_engine::{Engine, EngineConfig};
//! use fenrir_plugins::Plugins;
//! use fenrir_types::{FeatureDescriptor, PrimitiveType};
//! use std::sync::Arc;
//!
//! let plugins = Arc::new(Plugins::with_builtins().unwrap());
//! let engine = Engine::from_config(plugins, &EngineConfig::default()).unwrap();
//!
//! let clicks = FeatureDescriptor::new("clicks", PrimitiveType::Integer, "headless");
//! engine.bind_feature(&clicks).unwrap();
//! assert!(engine.has_feature("clicks"));
//! ```

mod config;
mod engine;
mod error;
mod fanout;
mod feature;
mod metrics;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, EngineResult, Operation};
pub use feature::Feature;
pub use metrics::{FeatureCounter, FeatureMetrics, NoopMetrics};
