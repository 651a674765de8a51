//! System-wide default constants.
//!
//! Grouped by subsystem. Config structs use these for their `Default`
//! impls so a missing `sentinel.toml` behaves identically to an empty one.

// ============================================================================
// Server
// ============================================================================

pub const SERVER_ADDR: &str = "0.0.0.0:8080";

/// Maximum request body size for JSON endpoints (bytes).
pub const REQUEST_BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

// ============================================================================
// Analytics
// ============================================================================

/// Quarters per dwell-time window (current and previous each).
pub const DWELL_WINDOW_QUARTERS: usize = 4;

/// Observed quarters on the risk status chart, forecast quarter excluded.
pub const TREND_ACTUAL_QUARTERS: usize = 7;

// ============================================================================
// Auth
// ============================================================================

pub const MIN_PASSWORD_LEN: usize = 8;

pub const SESSION_TTL_HOURS: i64 = 12;

pub const MAX_POST_TITLE_LEN: usize = 120;

// ============================================================================
// Storage
// ============================================================================

pub const DATA_DIR: &str = "./data";

/// Maximum posts kept per category by the in-memory store.
pub const IN_MEMORY_MAX_POSTS: usize = 1_000;

// ============================================================================
// Uploads
// ============================================================================

/// 10 MiB per attachment.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ============================================================================
// Client
// ============================================================================

pub const CLIENT_BASE_URL: &str = "http://127.0.0.1:8080";

pub const CLIENT_TIMEOUT_SECS: u64 = 15;

// ============================================================================
// Mock dataset
// ============================================================================

pub const MOCK_SEED: u64 = 0x5E47_1AE1;

pub const MOCK_COMPANY_COUNT: usize = 40;

// ============================================================================
// Model jobs
// ============================================================================

/// Capacity of the scoring job channel.
pub const MODEL_QUEUE_CAPACITY: usize = 64;

/// Simulated scoring time per job (milliseconds).
pub const MODEL_JOB_DURATION_MS: u64 = 250;
