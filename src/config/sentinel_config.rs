//! SENTINEL configuration - every tunable as a TOML value
//!
//! Each section implements `Default` from [`super::defaults`], so a missing
//! file and an empty file behave the same.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable pointing at a config file.
pub const CONFIG_ENV_VAR: &str = "SENTINEL_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sentinel.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `SentinelConfig::load()` which searches:
/// 1. `$SENTINEL_CONFIG`
/// 2. `./sentinel.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentinelConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// What to do when a backend call fails
    #[serde(default)]
    pub fallback: FallbackConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub mock: MockConfig,
}

impl SentinelConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys and suspicious values are logged; impossible values fail.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the system cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Extra origins allowed by CORS (e.g. a Vite dev server).
    pub cors_origins: Vec<String>,
    /// Built dashboard assets to serve at `/`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
    pub request_body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: defaults::SERVER_ADDR.to_string(),
            cors_origins: Vec::new(),
            static_dir: None,
            request_body_limit_bytes: defaults::REQUEST_BODY_LIMIT_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub dwell_window_quarters: usize,
    pub trend_actual_quarters: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            dwell_window_quarters: defaults::DWELL_WINDOW_QUARTERS,
            trend_actual_quarters: defaults::TREND_ACTUAL_QUARTERS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub min_password_len: usize,
    pub session_ttl_hours: i64,
    /// Seed the admin/analyst/viewer demo accounts.
    pub demo_accounts: bool,
    pub max_post_title_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: defaults::MIN_PASSWORD_LEN,
            session_ttl_hours: defaults::SESSION_TTL_HOURS,
            demo_accounts: true,
            max_post_title_len: defaults::MAX_POST_TITLE_LEN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Keep posts and caches in memory only.
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(defaults::DATA_DIR),
            in_memory: false,
        }
    }
}

/// Policy applied when a backend read fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Substitute bundled mock data and log a warning.
    #[default]
    Mock,
    /// Surface the error.
    Strict,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub policy: FallbackPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_file_bytes: usize,
    /// Empty means any content type.
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: defaults::MAX_UPLOAD_BYTES,
            allowed_content_types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::CLIENT_BASE_URL.to_string(),
            timeout_secs: defaults::CLIENT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub seed: u64,
    pub company_count: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            seed: defaults::MOCK_SEED,
            company_count: defaults::MOCK_COMPANY_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_equals_defaults() {
        let config = SentinelConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.addr, defaults::SERVER_ADDR);
        assert_eq!(config.analytics.dwell_window_quarters, 4);
        assert_eq!(config.fallback.policy, FallbackPolicy::Mock);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = SentinelConfig::from_toml_str(
            r#"
[server]
addr = "127.0.0.1:9000"

[fallback]
policy = "strict"
"#,
        )
        .unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert_eq!(config.server.request_body_limit_bytes, defaults::REQUEST_BODY_LIMIT_BYTES);
        assert_eq!(config.fallback.policy, FallbackPolicy::Strict);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let err = SentinelConfig::from_toml_str("[analytics]\ndwell_window_quarters = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("dwell_window_quarters"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentinel.toml");
        std::fs::write(&path, "[mock]\ncompany_count = 12\n").unwrap();
        let config = SentinelConfig::load_from_file(&path).unwrap();
        assert_eq!(config.mock.company_count, 12);

        let missing = SentinelConfig::load_from_file(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(..))));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let text = SentinelConfig::default().to_toml().unwrap();
        let back = SentinelConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.auth.min_password_len, defaults::MIN_PASSWORD_LEN);
    }
}
