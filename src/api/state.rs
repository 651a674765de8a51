//! Shared handler state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::auth::SessionManager;
use crate::config::{defaults, SentinelConfig};
use crate::jobs::{ModelQueue, ModelRunner};
use crate::mock::MockDataset;
use crate::storage::PostStore;
use crate::types::PostCategory;

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<SentinelConfig>,
    pub dataset: Arc<MockDataset>,
    pub posts: Arc<dyn PostStore>,
    pub sessions: Arc<SessionManager>,
    pub jobs: ModelQueue,
}

impl ApiState {
    /// Build the state and the model runner that must be spawned next to it.
    ///
    /// An empty Decision Room is seeded with the dataset's sample posts.
    pub fn new(
        config: SentinelConfig,
        dataset: Arc<MockDataset>,
        posts: Arc<dyn PostStore>,
    ) -> (Self, ModelRunner) {
        let sessions = if config.auth.demo_accounts {
            SessionManager::with_demo_accounts(config.auth.session_ttl_hours, config.auth.min_password_len)
        } else {
            SessionManager::new(config.auth.session_ttl_hours, config.auth.min_password_len)
        };

        let (runner, jobs) = ModelRunner::new(
            Arc::clone(&dataset),
            config.analytics.dwell_window_quarters,
            defaults::MODEL_QUEUE_CAPACITY,
            Duration::from_millis(defaults::MODEL_JOB_DURATION_MS),
        );

        seed_posts(posts.as_ref(), &dataset);

        let state = Self {
            config: Arc::new(config),
            dataset,
            posts,
            sessions: Arc::new(sessions),
            jobs,
        };
        (state, runner)
    }
}

fn seed_posts(posts: &dyn PostStore, dataset: &MockDataset) {
    let empty = [PostCategory::Notice, PostCategory::Qna]
        .into_iter()
        .all(|c| posts.list(c).map(|l| l.is_empty()).unwrap_or(false));
    if !empty {
        return;
    }
    let seeds = dataset.seed_posts();
    let count = seeds.len();
    for post in seeds {
        if let Err(e) = posts.insert(&post) {
            warn!(id = %post.id, error = %e, "Failed to seed post");
        }
    }
    info!(count, backend = posts.backend_name(), "Seeded Decision Room");
}
