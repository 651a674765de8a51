//! Config Validation Tests
//!
//! Typo detection on raw TOML and range validation on parsed configs,
//! exercised independently from the server.

use sentinel::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use sentinel::config::{ConfigError, FallbackPolicy, SentinelConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_window_key_warns_with_suggestion() {
    let toml_str = r#"
[analytics]
dwell_window_quarter = 4
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("dwell_window_quarter"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("analytics.dwell_window_quarters")
    );
}

#[test]
fn misspelled_section_is_flagged() {
    let warnings = validate_unknown_keys("[fallbak]\npolicy = \"strict\"\n");
    assert!(!warnings.is_empty());
    assert!(warnings.iter().any(|w| w.field.starts_with("fallbak")));
}

#[test]
fn suggestion_only_for_close_matches() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("upload.max_file_byte", &known).as_deref(),
        Some("upload.max_file_bytes")
    );
    assert!(suggest_correction("zzzzzzzzzzzz", &known).is_none());
}

#[test]
fn typos_do_not_fail_parsing() {
    let config = SentinelConfig::from_toml_str("[mock]\nsed = 3\n").unwrap();
    assert_eq!(config.mock.seed, SentinelConfig::default().mock.seed);
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn zero_windows_are_errors() {
    let mut config = SentinelConfig::default();
    config.analytics.dwell_window_quarters = 0;
    config.analytics.trend_actual_quarters = 0;
    let (errors, _) = validate_ranges(&config);
    assert_eq!(errors.len(), 2, "{errors:?}");
}

#[test]
fn long_window_only_warns() {
    let mut config = SentinelConfig::default();
    config.analytics.dwell_window_quarters = 24;
    let (errors, warnings) = validate_ranges(&config);
    assert!(errors.is_empty());
    assert!(warnings.iter().any(|w| w.field == "analytics.dwell_window_quarters"));
}

#[test]
fn invalid_session_ttl_rejected_on_load() {
    let err = SentinelConfig::from_toml_str("[auth]\nsession_ttl_hours = 0\n").unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("session_ttl_hours")));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn full_config_parses() {
    let config = SentinelConfig::from_toml_str(
        r#"
[server]
addr = "127.0.0.1:8181"
cors_origins = ["http://localhost:5173"]

[analytics]
dwell_window_quarters = 2
trend_actual_quarters = 5

[fallback]
policy = "strict"

[upload]
max_file_bytes = 1024
allowed_content_types = ["application/pdf"]

[mock]
seed = 11
company_count = 5
"#,
    )
    .unwrap();
    assert_eq!(config.analytics.dwell_window_quarters, 2);
    assert_eq!(config.fallback.policy, FallbackPolicy::Strict);
    assert_eq!(config.upload.allowed_content_types, vec!["application/pdf"]);
    assert_eq!(config.server.cors_origins.len(), 1);
}
