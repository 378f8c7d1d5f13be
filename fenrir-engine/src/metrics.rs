//! Bound-feature metrics.

use std::sync::atomic::{AtomicI64, Ordering};

/// Sink told about every successful bind and every unbind that removed
/// something.
///
/// Unbinding an FQN that is not bound succeeds without calling
/// `feature_unbound`, so bound minus unbound is never negative.
pub trait FeatureMetrics: Send + Sync {
    fn feature_bound(&self, fqn: &str);
    fn feature_unbound(&self, fqn: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl FeatureMetrics for NoopMetrics {
    fn feature_bound(&self, _fqn: &str) {}
    fn feature_unbound(&self, _fqn: &str) {}
}

/// Gauge of currently bound features.
#[derive(Debug, Default)]
pub struct FeatureCounter {
    bound: AtomicI64,
}

impl FeatureCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> i64 {
        self.bound.load(Ordering::Relaxed)
    }
}

impl FeatureMetrics for FeatureCounter {
    fn feature_bound(&self, _fqn: &str) {
        self.bound.fetch_add(1, Ordering::Relaxed);
    }

    fn feature_unbound(&self, _fqn: &str) {
        self.bound.fetch_sub(1, Ordering::Relaxed);
    }
}
