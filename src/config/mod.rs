//! Configuration
//!
//! Loaded from TOML. Every section has defaults, so the system runs with
//! no file at all.
//!
//! ## Loading Order
//!
//! 1. `SENTINEL_CONFIG` environment variable (path to TOML file)
//! 2. `sentinel.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(SentinelConfig::load());
//!
//! // Anywhere in the codebase:
//! let w = config::get().analytics.dwell_window_quarters;
//! ```

mod sentinel_config;
pub mod defaults;
pub mod validation;

pub use sentinel_config::*;

use std::sync::OnceLock;

/// Global configuration, initialized once at startup.
static CONFIG: OnceLock<SentinelConfig> = OnceLock::new();

/// Initialize the global configuration. Later calls are ignored.
pub fn init(config: SentinelConfig) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// The global configuration, or built-in defaults if `init()` was never
/// called (library use, tests).
pub fn get() -> &'static SentinelConfig {
    CONFIG.get_or_init(SentinelConfig::default)
}

pub fn is_initialized() -> bool {
    CONFIG.get().is_some()
}
