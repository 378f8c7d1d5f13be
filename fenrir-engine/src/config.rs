//! Engine configuration, read from TOML.
//!
//! ```toml
//! state = "memory"
//! collect_notifiers = ["broadcast"]
//! write_notifiers = ["broadcast"]
//! historical_writer = "parquet"
//!
//! [plugins]
//! memory-max-entries = 100000
//! ```

use crate::{EngineError, EngineResult};
use fenrir_plugins::PluginConfig;
use fenrir_plugins::builtin::MEMORY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Which plugins the engine is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// State backend plugin name.
    pub state: String,
    pub collect_notifiers: Vec<String>,
    pub write_notifiers: Vec<String>,
    pub historical_writer: Option<String>,
    /// Options handed to every plugin factory.
    pub plugins: PluginConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            state: MEMORY.to_string(),
            collect_notifiers: Vec::new(),
            write_notifiers: Vec::new(),
            historical_writer: None,
            plugins: PluginConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> EngineResult<Self> {
        toml::from_str(s).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Loads the config at `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            info!("No engine config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        info!("Loaded engine config from {:?}", path);
        Ok(config)
    }
}
