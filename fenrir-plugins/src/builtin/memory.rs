use crate::{PluginConfig, PluginError, PluginResult, State};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clap::{Arg, Command};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use fenrir_types::{Context, FeatureValue, Fqn, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

const MAX_ENTRIES: &str = "memory-max-entries";

/// Adds `--memory-max-entries` to the command line.
pub fn memory_config_binder(cmd: Command) -> PluginResult<Command> {
    Ok(cmd.arg(
        Arg::new(MAX_ENTRIES)
            .long(MAX_ENTRIES)
            .value_name("N")
            .value_parser(clap::value_parser!(usize))
            .global(true)
            .help("Maximum number of (feature, entity) values held by the memory state backend"),
    ))
}

/// In-process state backend keyed by (FQN, entity).
#[derive(Debug, Default)]
pub struct MemoryState {
    entries: DashMap<(String, String), FeatureValue>,
    len: AtomicUsize,
    max_entries: Option<usize>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Self::default()
        }
    }

    pub fn from_config(cfg: &PluginConfig) -> PluginResult<Self> {
        Ok(match cfg.get::<usize>(MAX_ENTRIES)? {
            Some(max) => Self::with_max_entries(max),
            None => Self::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserves room for a new key. Called with the shard lock held, so it
    /// must not touch `entries`.
    fn reserve(&self) -> PluginResult<()> {
        let Some(max) = self.max_entries else {
            self.len.fetch_add(1, Ordering::AcqRel);
            return Ok(());
        };
        self.len
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .map(|_| ())
            .map_err(|_| PluginError::Other(anyhow::anyhow!("memory state is full ({max} entries)")))
    }

    /// Applies `f` to the stored value, or inserts `init()` when absent.
    fn upsert(
        &self,
        fqn: &str,
        entity_id: &str,
        init: impl FnOnce() -> PluginResult<FeatureValue>,
        f: impl FnOnce(&mut FeatureValue) -> PluginResult<()>,
    ) -> PluginResult<()> {
        match self.entries.entry((fqn.to_string(), entity_id.to_string())) {
            Entry::Occupied(mut e) => f(e.get_mut()),
            Entry::Vacant(e) => {
                let value = init()?;
                self.reserve()?;
                e.insert(value);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl State for MemoryState {
    async fn get(&self, ctx: &Context, fqn: &str, entity_id: &str) -> PluginResult<Option<FeatureValue>> {
        ctx.check()?;
        let (key, aggr) = match Fqn::parse(fqn) {
            Ok(parsed) => (parsed.feature_fqn(), parsed.aggr()),
            Err(_) => (fqn.to_string(), None),
        };
        let stored = self
            .entries
            .get(&(key, entity_id.to_string()))
            .map(|v| v.clone());

        // Aggregations are served over the stored value.
        match (stored, aggr) {
            (Some(stored), Some(aggr)) => Ok(aggr
                .apply(&stored.value)?
                .map(|value| FeatureValue { value, ..stored })),
            (stored, _) => Ok(stored),
        }
    }

    async fn set(&self, ctx: &Context, fqn: &str, entity_id: &str, value: Value, ts: DateTime<Utc>) -> PluginResult<()> {
        ctx.check()?;
        let stored = FeatureValue::new(value, ts);
        self.upsert(fqn, entity_id, || Ok(stored.clone()), |current| {
            *current = stored.clone();
            Ok(())
        })
    }

    async fn append(&self, ctx: &Context, fqn: &str, entity_id: &str, item: Value, ts: DateTime<Utc>) -> PluginResult<()> {
        ctx.check()?;
        let init = || {
            let plural = item.primitive_type().plural();
            let mut list = Value::zero(plural).ok_or_else(|| {
                PluginError::Type(fenrir_types::Error::InvalidArgument(format!(
                    "cannot append {} to a list",
                    item.primitive_type()
                )))
            })?;
            list.push(item.clone())?;
            Ok(FeatureValue::new(list, ts))
        };
        self.upsert(fqn, entity_id, init, |current| {
            current.value.push(item.clone())?;
            current.timestamp = ts;
            Ok(())
        })
    }

    async fn incr(&self, ctx: &Context, fqn: &str, entity_id: &str, by: Value, ts: DateTime<Utc>) -> PluginResult<()> {
        ctx.check()?;
        self.upsert(
            fqn,
            entity_id,
            || Ok(FeatureValue::new(by.clone(), ts)),
            |current| {
                current.value = current.value.checked_add(&by)?;
                current.timestamp = ts;
                Ok(())
            },
        )
    }

    async fn update(&self, ctx: &Context, fqn: &str, entity_id: &str, value: Value, ts: DateTime<Utc>) -> PluginResult<()> {
        ctx.check()?;
        let stored = FeatureValue::new(value, ts);
        self.upsert(fqn, entity_id, || Ok(stored.clone()), |current| {
            // Last writer wins by timestamp.
            if current.timestamp <= ts {
                *current = stored.clone();
            }
            Ok(())
        })
    }
}
