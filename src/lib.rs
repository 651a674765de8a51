//! SENTINEL: partner and supplier risk monitoring
//!
//! ## Architecture
//!
//! - **Analytics**: quarter windows, risk dwell time, trend normalization, KPI deltas
//! - **View**: search, filter and sort over in-memory lists
//! - **Auth**: form validation and bearer sessions
//! - **Storage**: Decision Room posts and key-value state (sled or in-memory)
//! - **Mock**: deterministic dataset standing in for the risk backend
//! - **Client**: typed HTTP client with stale-response and fallback handling
//! - **Store**: observable app state (view-as, session, cached companies)
//! - **Jobs**: queued risk model scoring runs
//! - **API**: axum dashboard server

pub mod analytics;
pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod jobs;
pub mod mock;
pub mod storage;
pub mod store;
pub mod types;
pub mod view;

// Re-export configuration
pub use config::SentinelConfig;

// Re-export commonly used types
pub use types::{
    Company, CompanyOverview, DashboardSummary, DataType, Post, PostCategory, Quarter,
    QuarterlyRiskRecord, RiskLevel, RiskStatusBucket, RiskStatusTrendPayload, TimeRange,
    TrendUnit, User,
};

// Re-export analytics
pub use analytics::{normalize, normalize_as, NormalizedTrend, ReconciliationReport};

// Re-export storage
pub use storage::{open_backends, InMemoryPostStore, KvStore, PostStore, SledPostStore, StorageError};

// Re-export client components
pub use client::{ApiClient, DataService, Fetched, RequestError};

// Re-export server entry points
pub use api::{create_app, ApiState};
pub use mock::MockDataset;
pub use store::{AppState, AppStore};
