//! Reference plugins shipped with the engine.
//!
//! - `memory`: in-process [`State`](crate::State) backend
//! - `broadcast`: in-process notifier for collect and write events
//! - `headless`: applier for features whose values are pushed from outside

mod broadcast;
mod headless;
mod memory;

pub use broadcast::BroadcastNotifier;
pub use headless::headless_applier;
pub use memory::{MemoryState, memory_config_binder};

use crate::{PluginResult, Plugins};
use std::sync::Arc;

pub const MEMORY: &str = "memory";
pub const BROADCAST: &str = "broadcast";
pub const HEADLESS: &str = "headless";

/// Registers every built-in plugin.
pub fn register(plugins: &Plugins) -> PluginResult<()> {
    plugins.register_config_binder(MEMORY, memory_config_binder)?;
    plugins.register_state(MEMORY, |cfg| Ok(Arc::new(MemoryState::from_config(cfg)?)))?;
    plugins.register_collect_notifier(BROADCAST, |cfg| {
        Ok(Arc::new(BroadcastNotifier::from_config(cfg)?))
    })?;
    plugins.register_write_notifier(BROADCAST, |cfg| {
        Ok(Arc::new(BroadcastNotifier::from_config(cfg)?))
    })?;
    plugins.register_feature_applier(HEADLESS, headless_applier)?;
    Ok(())
}
