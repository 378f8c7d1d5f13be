//! The feature and data source registry.
//!
//! Features and data sources live in sharded concurrent maps keyed by FQN,
//! so operations on unrelated features never contend. Value operations
//! clone the feature out of the map before calling the state backend; no
//! map lock is held across an await.

use crate::error::Operation;
use crate::fanout::Fanout;
use crate::{EngineConfig, EngineError, EngineResult, Feature, FeatureMetrics, NoopMetrics};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use fenrir_plugins::{
    EngineApi, HistoricalWriter, HookArgs, Notifier, NotifierRegistry, PluginConfig, PluginError,
    PluginResult, Plugins, State,
};
use fenrir_types::{
    CollectNotification, Context, DataSource, Dynamic, FeatureDescriptor, FeatureValue, Fqn,
    Metadata, Notification, PrimitiveType, Value, WriteNotification, WriteOperation, normalize,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The online feature engine.
pub struct Engine {
    features: DashMap<String, Arc<Feature>>,
    data_sources: DashMap<String, Arc<DataSource>>,
    plugins: Arc<Plugins>,
    state: Arc<dyn State>,
    fanout: Fanout,
    metrics: Arc<dyn FeatureMetrics>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("features", &self.features.len())
            .field("data_sources", &self.data_sources.len())
            .field("collect_notifiers", &self.fanout.collect.len())
            .field("write_notifiers", &self.fanout.write.len())
            .field("historical_writer", &self.fanout.historical.is_some())
            .finish()
    }
}

impl Engine {
    /// Creates an engine over `state` with no notifiers.
    pub fn new(plugins: Arc<Plugins>, state: Arc<dyn State>) -> Self {
        Self {
            features: DashMap::new(),
            data_sources: DashMap::new(),
            plugins,
            state,
            fanout: Fanout::default(),
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Builds an engine from the plugins named in `config`.
    pub fn from_config(plugins: Arc<Plugins>, config: &EngineConfig) -> EngineResult<Self> {
        let cfg = &config.plugins;
        let state = plugins.new_state(&config.state, cfg)?;
        let collect = build_notifiers::<CollectNotification>(&plugins, &config.collect_notifiers, cfg)?;
        let write = build_notifiers::<WriteNotification>(&plugins, &config.write_notifiers, cfg)?;
        let historical = config
            .historical_writer
            .as_deref()
            .map(|name| plugins.new_historical_writer(name, cfg))
            .transpose()?;

        info!(
            state = %config.state,
            collect_notifiers = collect.len(),
            write_notifiers = write.len(),
            historical_writer = historical.is_some(),
            "engine initialized"
        );

        let mut engine = Self::new(plugins, state);
        engine.fanout = Fanout {
            collect,
            write,
            historical,
        };
        Ok(engine)
    }

    #[must_use]
    pub fn with_collect_notifier(mut self, notifier: Arc<dyn Notifier<CollectNotification>>) -> Self {
        self.fanout.collect.push(notifier);
        self
    }

    #[must_use]
    pub fn with_write_notifier(mut self, notifier: Arc<dyn Notifier<WriteNotification>>) -> Self {
        self.fanout.write.push(notifier);
        self
    }

    #[must_use]
    pub fn with_historical_writer(mut self, writer: Arc<dyn HistoricalWriter>) -> Self {
        self.fanout.historical = Some(writer);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn FeatureMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn plugins(&self) -> &Arc<Plugins> {
        &self.plugins
    }

    pub fn state(&self) -> &Arc<dyn State> {
        &self.state
    }

    // ── Features ─────────────────────────────────────────────────

    /// Validates a descriptor and runs its builder, without binding.
    ///
    /// Fails with [`EngineError::InvalidDescriptor`] on a bad descriptor and
    /// [`EngineError::BuilderNotFound`] when no applier matches the builder
    /// kind.
    pub fn feature_with_engine(&self, descriptor: &FeatureDescriptor) -> EngineResult<Feature> {
        let metadata = descriptor
            .metadata()
            .map_err(|e| EngineError::InvalidDescriptor(e.to_string()))?;
        let kind = &descriptor.builder.kind;

        let applier = self.plugins.feature_appliers.get(kind).map_err(|_| {
            EngineError::BuilderNotFound {
                fqn: metadata.fqn.clone(),
                kind: kind.clone(),
            }
        })?;

        let mut feature = Feature::new(metadata.clone(), descriptor.builder.clone());
        applier(&metadata, &descriptor.builder, &mut feature, self).map_err(|source| {
            EngineError::Builder {
                fqn: metadata.fqn.clone(),
                kind: kind.clone(),
                source,
            }
        })?;
        Ok(feature)
    }

    /// Builds and binds a feature. Binding is not an upsert: an FQN that is
    /// already bound fails with [`EngineError::AlreadyExists`] and the
    /// existing feature is left untouched.
    pub fn bind_feature(&self, descriptor: &FeatureDescriptor) -> EngineResult<()> {
        let fqn = descriptor
            .fqn()
            .map_err(|e| EngineError::InvalidDescriptor(e.to_string()))?
            .feature_fqn();
        if self.features.contains_key(&fqn) {
            return Err(EngineError::AlreadyExists(fqn));
        }

        let feature = self.feature_with_engine(descriptor)?;

        // The builder ran without the map locked; re-check atomically.
        match self.features.entry(fqn) {
            Entry::Occupied(e) => Err(EngineError::AlreadyExists(e.key().clone())),
            Entry::Vacant(e) => {
                let fqn = e.key().clone();
                e.insert(Arc::new(feature));
                self.metrics.feature_bound(&fqn);
                info!(fqn = %fqn, builder = %descriptor.builder.kind, "feature bound");
                Ok(())
            }
        }
    }

    /// Removes a feature. Unbinding an unknown FQN is not an error; returns
    /// whether anything was removed. An aggregation suffix is ignored.
    pub fn unbind_feature(&self, fqn: &str) -> bool {
        let fqn = Fqn::parse(fqn).map_or_else(|_| fqn.to_string(), |f| f.feature_fqn());
        let removed = self.features.remove(&fqn).is_some();
        if removed {
            self.metrics.feature_unbound(&fqn);
        }
        info!(fqn = %fqn, removed, "feature unbound");
        removed
    }

    /// Whether `fqn` resolves to a bound feature, with the same suffix
    /// rules as [`Engine::feature`].
    pub fn has_feature(&self, fqn: &str) -> bool {
        self.feature(fqn).is_ok()
    }

    /// The bound feature for `fqn`, if any. An aggregation suffix must be one
    /// the feature declares.
    pub fn feature(&self, fqn: &str) -> EngineResult<Arc<Feature>> {
        let not_found = || EngineError::NotFound(fqn.to_string());
        let parsed = Fqn::parse(fqn).map_err(|_| not_found())?;
        let feature = self
            .features
            .get(&parsed.feature_fqn())
            .map(|f| Arc::clone(f.value()))
            .ok_or_else(not_found)?;
        match parsed.aggr() {
            Some(aggr) if !feature.metadata().supports_aggr(aggr) => Err(not_found()),
            _ => Ok(feature),
        }
    }

    /// FQNs of every bound feature, sorted.
    pub fn feature_fqns(&self) -> Vec<String> {
        let mut fqns: Vec<String> = self.features.iter().map(|e| e.key().clone()).collect();
        fqns.sort();
        fqns
    }

    /// The feature's descriptive fields. Never touches the state backend.
    pub fn metadata(&self, fqn: &str) -> EngineResult<Metadata> {
        Ok(self.feature(fqn)?.metadata().clone())
    }

    // ── Data sources ─────────────────────────────────────────────

    /// Binds a data source, replacing any previous one with the same FQN.
    pub fn bind_data_source(&self, data_source: DataSource) -> EngineResult<()> {
        let parsed =
            Fqn::parse(&data_source.fqn).map_err(|e| EngineError::InvalidDescriptor(e.to_string()))?;
        if parsed.aggr().is_some() {
            return Err(EngineError::InvalidDescriptor(format!(
                "data source `{}` cannot carry an aggregation",
                data_source.fqn
            )));
        }
        debug!(fqn = %data_source.fqn, kind = %data_source.kind, "data source bound");
        self.data_sources
            .insert(data_source.fqn.clone(), Arc::new(data_source));
        Ok(())
    }

    /// Removes a data source; returns whether anything was removed.
    pub fn unbind_data_source(&self, fqn: &str) -> bool {
        let removed = self.data_sources.remove(fqn).is_some();
        debug!(fqn = %fqn, removed, "data source unbound");
        removed
    }

    pub fn has_data_source(&self, fqn: &str) -> bool {
        self.data_sources.contains_key(fqn)
    }

    pub fn get_data_source(&self, fqn: &str) -> EngineResult<DataSource> {
        self.data_sources
            .get(fqn)
            .map(|ds| DataSource::clone(ds.value()))
            .ok_or_else(|| EngineError::DataSourceNotFound(fqn.to_string()))
    }

    // ── Value operations ─────────────────────────────────────────

    /// Reads a value.
    ///
    /// An FQN with a declared aggregation suffix (`clicks[sum]`) is passed
    /// to the backend as is and its result is typed by the aggregation.
    ///
    /// A value older than the feature's staleness is reported as absent.
    /// When the value is absent or not fresh, a collect notification asks
    /// for it to be recomputed.
    pub async fn get(
        &self,
        ctx: &Context,
        fqn: &str,
        entity_id: &str,
    ) -> EngineResult<(Option<FeatureValue>, Metadata)> {
        let feature = self.feature(fqn)?;
        let metadata = feature.metadata();
        let requested = Fqn::parse(fqn).map_err(|_| EngineError::NotFound(fqn.to_string()))?;
        let backend_fqn = requested.to_string();
        let expected = requested
            .aggr()
            .map_or(metadata.primitive, |aggr| aggr.output_type(metadata.primitive));

        let mut args = HookArgs::new(&metadata.fqn, entity_id, Utc::now());
        feature.pre_get.run(&mut args).map_err(|source| EngineError::Hook {
            fqn: metadata.fqn.clone(),
            source,
        })?;

        let ctx = op_context(ctx, metadata);
        let stored = ctx
            .run(self.state.get(&ctx, &backend_fqn, entity_id))
            .await?
            .map_err(|source| EngineError::Backend {
                fqn: metadata.fqn.clone(),
                op: Operation::Get,
                source,
            })?;

        let now = Utc::now();
        let mut value = stored.and_then(|mut v| {
            let age = (now - v.timestamp).to_std().unwrap_or_default();
            if metadata.is_stale(age) {
                return None;
            }
            v.fresh = metadata.is_fresh(age);
            Some(v)
        });

        if !feature.post_get.is_empty() {
            args.value = value.as_ref().map(|v| v.value.clone());
            feature.post_get.run(&mut args).map_err(|source| EngineError::Hook {
                fqn: metadata.fqn.clone(),
                source,
            })?;
            value = match (value, args.value) {
                (_, None) => None,
                (Some(mut v), Some(rewritten)) => {
                    v.value = rewritten;
                    Some(v)
                }
                (None, Some(produced)) => Some(FeatureValue {
                    value: produced,
                    timestamp: now,
                    fresh: true,
                }),
            };
            if let Some(v) = &value {
                expect_type(&metadata.fqn, expected, &v.value)?;
            }
        }

        if !value.as_ref().is_some_and(|v| v.fresh) {
            self.fanout
                .collect(CollectNotification::new(&metadata.fqn, entity_id, value.clone()))
                .await;
        }

        Ok((value, metadata.clone()))
    }

    /// Overwrites the value.
    pub async fn set(
        &self,
        ctx: &Context,
        fqn: &str,
        entity_id: &str,
        value: impl Into<Dynamic>,
        ts: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.write(ctx, WriteOperation::Set, fqn, entity_id, value.into(), ts)
            .await
    }

    /// Appends one item to a list feature.
    pub async fn append(
        &self,
        ctx: &Context,
        fqn: &str,
        entity_id: &str,
        item: impl Into<Dynamic>,
        ts: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.write(ctx, WriteOperation::Append, fqn, entity_id, item.into(), ts)
            .await
    }

    /// Adds `by` to a numeric feature.
    pub async fn incr(
        &self,
        ctx: &Context,
        fqn: &str,
        entity_id: &str,
        by: impl Into<Dynamic>,
        ts: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.write(ctx, WriteOperation::Incr, fqn, entity_id, by.into(), ts)
            .await
    }

    /// Writes the value unless the backend holds a newer one.
    pub async fn update(
        &self,
        ctx: &Context,
        fqn: &str,
        entity_id: &str,
        value: impl Into<Dynamic>,
        ts: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.write(ctx, WriteOperation::Update, fqn, entity_id, value.into(), ts)
            .await
    }

    /// Writes go to the underlying feature; an aggregation suffix on `fqn`
    /// only selects it.
    async fn write(
        &self,
        ctx: &Context,
        op: WriteOperation,
        fqn: &str,
        entity_id: &str,
        value: Dynamic,
        ts: DateTime<Utc>,
    ) -> EngineResult<()> {
        let feature = self.feature(fqn)?;
        let metadata = feature.metadata();
        let fqn = metadata.fqn.as_str();
        let expected = operand_type(metadata, op)?;

        let value = match normalize(value).map_err(|e| EngineError::from_type(fqn, e))? {
            Some(v) => v,
            // An empty list has no detectable type; for list features it is
            // the empty value.
            None if matches!(op, WriteOperation::Set | WriteOperation::Update)
                && !expected.is_scalar() =>
            {
                Value::zero(expected).ok_or_else(|| missing_value(fqn))?
            }
            None => return Err(missing_value(fqn)),
        };
        expect_type(fqn, expected, &value)?;

        let mut args = HookArgs::new(fqn, entity_id, ts);
        args.value = Some(value);
        args.operation = Some(op);
        feature.pre_set.run(&mut args).map_err(|source| EngineError::Hook {
            fqn: fqn.to_string(),
            source,
        })?;
        let Some(value) = args.value.clone() else {
            debug!(fqn = %fqn, entity_id = %entity_id, %op, "write dropped by hook");
            return Ok(());
        };
        expect_type(fqn, expected, &value)?;
        let ts = args.timestamp;

        let op_ctx = op_context(ctx, metadata);
        let started = Instant::now();
        let call = match op {
            WriteOperation::Set => self.state.set(&op_ctx, fqn, entity_id, value.clone(), ts),
            WriteOperation::Append => self.state.append(&op_ctx, fqn, entity_id, value.clone(), ts),
            WriteOperation::Incr => self.state.incr(&op_ctx, fqn, entity_id, value.clone(), ts),
            WriteOperation::Update => self.state.update(&op_ctx, fqn, entity_id, value.clone(), ts),
        };
        op_ctx
            .run(call)
            .await?
            .map_err(|source| EngineError::Backend {
                fqn: fqn.to_string(),
                op: Operation::Write(op),
                source,
            })?;
        let latency = started.elapsed();

        if let Err(e) = feature.post_set.run(&mut args) {
            warn!(fqn = %fqn, entity_id = %entity_id, %op, error = %e, "post-set hook failed");
        }

        let notification = WriteNotification {
            fqn: fqn.to_string(),
            entity_id: entity_id.to_string(),
            value,
            timestamp: ts,
            operation: op,
            latency: Some(latency),
            error: None,
        };
        debug!(fqn = %notification.fqn(), entity_id = %entity_id, %op, "value written");
        self.fanout.write(ctx, notification).await;
        Ok(())
    }
}

/// Adds the feature's timeout, if any, to the caller's context.
fn op_context(ctx: &Context, metadata: &Metadata) -> Context {
    if metadata.timeout.is_zero() {
        ctx.child()
    } else {
        ctx.with_timeout(metadata.timeout)
    }
}

/// The type an operation's operand must have for this feature.
fn operand_type(metadata: &Metadata, op: WriteOperation) -> EngineResult<PrimitiveType> {
    let invalid = |reason: &str| EngineError::InvalidValue {
        fqn: metadata.fqn.clone(),
        reason: reason.to_string(),
    };
    match op {
        WriteOperation::Set | WriteOperation::Update => Ok(metadata.primitive),
        WriteOperation::Append if metadata.primitive.is_scalar() => {
            Err(invalid("append requires a list feature"))
        }
        WriteOperation::Append => Ok(metadata.primitive.singular()),
        WriteOperation::Incr if !metadata.primitive.is_numeric() => {
            Err(invalid("incr requires an int or float feature"))
        }
        WriteOperation::Incr => Ok(metadata.primitive),
    }
}

fn expect_type(fqn: &str, expected: PrimitiveType, value: &Value) -> EngineResult<()> {
    let found = value.primitive_type();
    if found == expected {
        Ok(())
    } else {
        Err(EngineError::TypeMismatch {
            fqn: fqn.to_string(),
            expected,
            found,
        })
    }
}

fn missing_value(fqn: &str) -> EngineError {
    EngineError::InvalidValue {
        fqn: fqn.to_string(),
        reason: "value is empty".to_string(),
    }
}

fn build_notifiers<T: Notification>(
    plugins: &Plugins,
    names: &[String],
    cfg: &PluginConfig,
) -> EngineResult<Vec<Arc<dyn Notifier<T>>>>
where
    Plugins: NotifierRegistry<T>,
{
    names
        .iter()
        .map(|name| -> EngineResult<Arc<dyn Notifier<T>>> {
            let factory = <Plugins as NotifierRegistry<T>>::notifier_set(plugins).get(name)?;
            Ok(factory(cfg)?)
        })
        .collect()
}

#[async_trait]
impl EngineApi for Engine {
    fn metadata(&self, fqn: &str) -> PluginResult<Metadata> {
        Engine::metadata(self, fqn).map_err(PluginError::from)
    }

    fn data_source(&self, fqn: &str) -> PluginResult<DataSource> {
        self.get_data_source(fqn).map_err(PluginError::from)
    }

    async fn get(
        &self,
        ctx: &Context,
        fqn: &str,
        entity_id: &str,
    ) -> PluginResult<(Option<FeatureValue>, Metadata)> {
        Engine::get(self, ctx, fqn, entity_id).await.map_err(PluginError::from)
    }

    async fn set(&self, ctx: &Context, fqn: &str, entity_id: &str, value: Dynamic, ts: DateTime<Utc>) -> PluginResult<()> {
        Engine::set(self, ctx, fqn, entity_id, value, ts).await.map_err(PluginError::from)
    }

    async fn append(&self, ctx: &Context, fqn: &str, entity_id: &str, item: Dynamic, ts: DateTime<Utc>) -> PluginResult<()> {
        Engine::append(self, ctx, fqn, entity_id, item, ts).await.map_err(PluginError::from)
    }

    async fn incr(&self, ctx: &Context, fqn: &str, entity_id: &str, by: Dynamic, ts: DateTime<Utc>) -> PluginResult<()> {
        Engine::incr(self, ctx, fqn, entity_id, by, ts).await.map_err(PluginError::from)
    }

    async fn update(&self, ctx: &Context, fqn: &str, entity_id: &str, value: Dynamic, ts: DateTime<Utc>) -> PluginResult<()> {
        Engine::update(self, ctx, fqn, entity_id, value, ts).await.map_err(PluginError::from)
    }
}
