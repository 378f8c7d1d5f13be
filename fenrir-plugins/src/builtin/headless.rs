use crate::{EngineApi, FeatureApi, PluginResult};
use fenrir_types::{BuilderSpec, Metadata};

/// Values of headless features are written by external producers, so the
/// feature gets no hooks.
pub fn headless_applier(
    _meta: &Metadata,
    _spec: &BuilderSpec,
    feature: &mut dyn FeatureApi,
    _engine: &dyn EngineApi,
) -> PluginResult<()> {
    feature.set_runtime(super::HEADLESS);
    Ok(())
}
