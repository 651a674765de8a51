//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse: the raw TOML is walked as a `toml::Value` tree and every
//! key compared against the known set, emitting "did you mean?" warnings.
//! Serde deserialization then proceeds normally. Warnings never break a
//! config; range errors do.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, "; did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path of `SentinelConfig`.
///
/// Must be kept in sync with the structs in `sentinel_config.rs`.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [server]
        "server",
        "server.addr",
        "server.cors_origins",
        "server.static_dir",
        "server.request_body_limit_bytes",
        // [analytics]
        "analytics",
        "analytics.dwell_window_quarters",
        "analytics.trend_actual_quarters",
        // [auth]
        "auth",
        "auth.min_password_len",
        "auth.session_ttl_hours",
        "auth.demo_accounts",
        "auth.max_post_title_len",
        // [storage]
        "storage",
        "storage.data_dir",
        "storage.in_memory",
        // [fallback]
        "fallback",
        "fallback.policy",
        // [upload]
        "upload",
        "upload.max_file_bytes",
        "upload.allowed_content_types",
        // [client]
        "client",
        "client.base_url",
        "client.timeout_secs",
        // [mock]
        "mock",
        "mock.seed",
        "mock.company_count",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collect all dotted key paths of a `toml::Value` tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3, if any.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        // Tie-break on the key so the suggestion is deterministic.
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

/// Warnings for any unknown key in a raw TOML document.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // reported by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Returns (errors, warnings): errors prevent startup, warnings are logged.
pub fn validate_ranges(config: &super::SentinelConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let a = &config.analytics;
    if a.dwell_window_quarters == 0 {
        errors.push("analytics.dwell_window_quarters must be >= 1".to_string());
    }
    if a.dwell_window_quarters > 20 {
        warnings.push(ValidationWarning {
            field: "analytics.dwell_window_quarters".to_string(),
            message: format!(
                "analytics.dwell_window_quarters = {} spans more than five years",
                a.dwell_window_quarters
            ),
            suggestion: None,
        });
    }
    if a.trend_actual_quarters == 0 {
        errors.push("analytics.trend_actual_quarters must be >= 1".to_string());
    }

    if config.auth.min_password_len < 4 {
        errors.push(format!(
            "auth.min_password_len = {} is below the minimum of 4",
            config.auth.min_password_len
        ));
    }
    if config.auth.session_ttl_hours <= 0 {
        errors.push(format!(
            "auth.session_ttl_hours = {} must be > 0",
            config.auth.session_ttl_hours
        ));
    }
    if config.auth.max_post_title_len == 0 {
        errors.push("auth.max_post_title_len must be > 0".to_string());
    }

    if config.upload.max_file_bytes == 0 {
        errors.push("upload.max_file_bytes must be > 0".to_string());
    }
    if config.upload.max_file_bytes > 100 * 1024 * 1024 {
        warnings.push(ValidationWarning {
            field: "upload.max_file_bytes".to_string(),
            message: format!(
                "upload.max_file_bytes = {} exceeds 100 MiB",
                config.upload.max_file_bytes
            ),
            suggestion: None,
        });
    }

    if config.client.timeout_secs == 0 {
        errors.push("client.timeout_secs must be > 0".to_string());
    }
    if !config.client.base_url.starts_with("http://") && !config.client.base_url.starts_with("https://") {
        errors.push(format!(
            "client.base_url = '{}' must start with http:// or https://",
            config.client.base_url
        ));
    }

    if config.mock.company_count == 0 {
        warnings.push(ValidationWarning {
            field: "mock.company_count".to_string(),
            message: "mock.company_count = 0 leaves the fallback dataset empty".to_string(),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SentinelConfig;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("hello", "hello"), 0);
        assert_eq!(levenshtein("polcy", "policy"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [server]
            addr = "0.0.0.0:1"
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"server".to_string()));
        assert!(keys.contains(&"server.addr".to_string()));
    }

    #[test]
    fn test_typo_key_produces_suggestion() {
        let warnings = validate_unknown_keys("[fallback]\npolcy = \"mock\"\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "fallback.polcy");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("fallback.policy"));
    }

    #[test]
    fn test_valid_keys_produce_no_warnings() {
        let warnings = validate_unknown_keys(
            r#"
[server]
addr = "127.0.0.1:8080"
cors_origins = ["http://localhost:5173"]

[analytics]
dwell_window_quarters = 4
"#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_garbage_key_has_no_suggestion() {
        let warnings = validate_unknown_keys("completely_unrelated_garbage_key_xyz = 1\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].suggestion.is_none());
    }

    #[test]
    fn test_known_keys_cover_sections() {
        let known = known_config_keys();
        for section in ["server", "analytics", "auth", "storage", "fallback", "upload", "client", "mock"] {
            assert!(known.contains(section), "missing section {section}");
        }
    }

    #[test]
    fn test_defaults_clean() {
        let (errors, warnings) = validate_ranges(&SentinelConfig::default());
        assert!(errors.is_empty(), "{errors:?}");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_range_errors() {
        let mut config = SentinelConfig::default();
        config.auth.min_password_len = 2;
        config.client.base_url = "ftp://x".into();
        let (errors, _) = validate_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("min_password_len")));
        assert!(errors.iter().any(|e| e.contains("base_url")));
    }

    #[test]
    fn test_range_warnings() {
        let mut config = SentinelConfig::default();
        config.analytics.dwell_window_quarters = 40;
        let (errors, warnings) = validate_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "analytics.dwell_window_quarters"));
    }
}
