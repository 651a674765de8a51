//! What to do when a backend read fails.
//!
//! The strategy is injected into [`super::DataService`]. [`MockFallback`]
//! serves the bundled dataset on backend failures; [`StrictFallback`]
//! always surfaces the error.

use std::sync::Arc;

use tracing::warn;

use super::RequestError;
use crate::config::FallbackPolicy;
use crate::mock::MockDataset;

pub trait FallbackStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Dataset to answer `resource` from, or `None` to surface `error`.
    fn substitute(&self, resource: &str, error: &RequestError) -> Option<&MockDataset>;
}

pub struct MockFallback {
    dataset: Arc<MockDataset>,
}

impl MockFallback {
    pub fn new(dataset: Arc<MockDataset>) -> Self {
        Self { dataset }
    }
}

impl FallbackStrategy for MockFallback {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn substitute(&self, resource: &str, error: &RequestError) -> Option<&MockDataset> {
        // Auth, permission and validation failures are never masked
        if !error.is_backend_failure() {
            return None;
        }
        warn!(resource, error = %error, "Backend call failed, serving mock data");
        Some(&self.dataset)
    }
}

pub struct StrictFallback;

impl FallbackStrategy for StrictFallback {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn substitute(&self, _resource: &str, _error: &RequestError) -> Option<&MockDataset> {
        None
    }
}

/// Strategy for the configured policy.
pub fn strategy_for(policy: FallbackPolicy, dataset: Arc<MockDataset>) -> Arc<dyn FallbackStrategy> {
    match policy {
        FallbackPolicy::Mock => Arc::new(MockFallback::new(dataset)),
        FallbackPolicy::Strict => Arc::new(StrictFallback),
    }
}
