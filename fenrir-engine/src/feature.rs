//! A bound feature: validated metadata plus what its builder attached.

use fenrir_plugins::{FeatureApi, Hook, HookChain};
use fenrir_types::{BuilderSpec, Metadata};

/// A feature as held by the engine.
///
/// Built by [`Engine::feature_with_engine`](crate::Engine::feature_with_engine);
/// immutable once bound.
#[derive(Debug)]
pub struct Feature {
    metadata: Metadata,
    builder: BuilderSpec,
    runtime: Option<String>,
    pub(crate) pre_get: HookChain,
    pub(crate) post_get: HookChain,
    pub(crate) pre_set: HookChain,
    pub(crate) post_set: HookChain,
}

impl Feature {
    pub(crate) fn new(metadata: Metadata, builder: BuilderSpec) -> Self {
        Self {
            metadata,
            builder,
            runtime: None,
            pre_get: HookChain::new(),
            post_get: HookChain::new(),
            pre_set: HookChain::new(),
            post_set: HookChain::new(),
        }
    }

    pub fn fqn(&self) -> &str {
        &self.metadata.fqn
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn builder(&self) -> &BuilderSpec {
        &self.builder
    }

    /// Runtime tag set by the builder, if any.
    pub fn runtime(&self) -> Option<&str> {
        self.runtime.as_deref()
    }

    /// Number of hooks attached, across all stages.
    pub fn hook_count(&self) -> usize {
        self.pre_get.len() + self.post_get.len() + self.pre_set.len() + self.post_set.len()
    }
}

impl FeatureApi for Feature {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn add_pre_get_hook(&mut self, priority: i32, hook: Hook) {
        self.pre_get.add(priority, hook);
    }

    fn add_post_get_hook(&mut self, priority: i32, hook: Hook) {
        self.post_get.add(priority, hook);
    }

    fn add_pre_set_hook(&mut self, priority: i32, hook: Hook) {
        self.pre_set.add(priority, hook);
    }

    fn add_post_set_hook(&mut self, priority: i32, hook: Hook) {
        self.post_set.add(priority, hook);
    }

    fn set_runtime(&mut self, runtime: &str) {
        self.runtime = Some(runtime.to_string());
    }
}
