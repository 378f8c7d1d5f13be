//! Prioritized hooks that builders attach to a feature.

use crate::PluginResult;
use chrono::{DateTime, Utc};
use fenrir_types::{Value, WriteOperation};
use std::fmt;
use std::sync::Arc;

/// What a hook sees and may rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct HookArgs {
    pub fqn: String,
    pub entity_id: String,
    /// The incoming value on the write path, the stored value after a read.
    /// `None` before a read and when nothing is stored.
    pub value: Option<Value>,
    pub timestamp: DateTime<Utc>,
    /// `None` on the read path.
    pub operation: Option<WriteOperation>,
}

impl HookArgs {
    pub fn new(fqn: impl Into<String>, entity_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            fqn: fqn.into(),
            entity_id: entity_id.into(),
            value: None,
            timestamp,
            operation: None,
        }
    }
}

/// A hook may rewrite `args` or fail to abort the operation.
pub type Hook = Arc<dyn Fn(&mut HookArgs) -> PluginResult<()> + Send + Sync>;

/// Hooks sorted by ascending priority. Equal priorities keep insertion order.
#[derive(Clone, Default)]
pub struct HookChain {
    hooks: Vec<(i32, Hook)>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, priority: i32, hook: Hook) {
        let at = self.hooks.partition_point(|(p, _)| *p <= priority);
        self.hooks.insert(at, (priority, hook));
    }

    /// Runs every hook in order, stopping at the first error.
    pub fn run(&self, args: &mut HookArgs) -> PluginResult<()> {
        for (_, hook) in &self.hooks {
            hook(args)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("priorities", &self.hooks.iter().map(|(p, _)| *p).collect::<Vec<_>>())
            .finish()
    }
}
