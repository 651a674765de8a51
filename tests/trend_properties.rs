//! Trend Aggregation Properties
//!
//! Window resolution, dwell runs, bucket normalization and quarter
//! ordering checked through the public library API.

use sentinel::analytics::{
    collect_runs, normalize, resolve_windows, run_lengths, summarize, to_percent_series,
};
use sentinel::types::{
    DataType, Quarter, QuarterlyRiskRecord, RiskLevel, RiskStatusBucket, RiskStatusTrendPayload,
    TrendUnit,
};

use RiskLevel::{Min, Risk, Warn};

fn q(token: &str) -> Quarter {
    token.parse().unwrap()
}

fn records(entity: &str, start: &str, levels: &[RiskLevel]) -> Vec<QuarterlyRiskRecord> {
    q(start)
        .range(levels.len())
        .into_iter()
        .zip(levels)
        .map(|(quarter, level)| QuarterlyRiskRecord::new(entity, entity, quarter, *level))
        .collect()
}

fn bucket(token: &str, data_type: DataType, counts: (f64, f64, f64)) -> RiskStatusBucket {
    RiskStatusBucket {
        quarter: q(token),
        data_type,
        normal: counts.0,
        caution: counts.1,
        risk: counts.2,
    }
}

fn payload(window: &[&str], forecast: &str, trend: Vec<RiskStatusBucket>) -> RiskStatusTrendPayload {
    RiskStatusTrendPayload {
        window_quarters: window.iter().map(|t| q(t)).collect(),
        forecast_quarter: q(forecast),
        trend,
        unit: TrendUnit::Count,
    }
}

// ============================================================================
// Windows
// ============================================================================

#[test]
fn windows_are_disjoint_and_ordered() {
    let mut all = records("A", "2023Q3", &[Min; 10]);
    // Unordered and duplicated quarters from a second entity.
    all.extend(records("B", "2024Q2", &[Warn; 3]).into_iter().rev());

    for w in 1..=6 {
        let windows = resolve_windows(&all, w);
        assert!(windows.current.len() <= w);
        assert!(windows.previous.len() <= w);
        assert!(windows.current.windows(2).all(|p| p[0] < p[1]));
        assert!(windows.previous.windows(2).all(|p| p[0] < p[1]));
        if let (Some(last_prev), Some(first_cur)) = (windows.previous.last(), windows.current.first()) {
            assert!(last_prev < first_cur, "previous must precede current for w={w}");
        }
    }

    let windows = resolve_windows(&all, 4);
    assert_eq!(windows.current, q("2025Q1").range(4));
    assert_eq!(windows.previous, q("2024Q1").range(4));
}

#[test]
fn short_history_gives_partial_windows() {
    let all = records("A", "2025Q1", &[Min; 5]);
    let windows = resolve_windows(&all, 4);
    assert_eq!(windows.current.len(), 4);
    assert_eq!(windows.previous, vec![q("2025Q1")]);

    let windows = resolve_windows(&[], 4);
    assert!(windows.current.is_empty() && windows.previous.is_empty());

    let windows = resolve_windows(&all, 0);
    assert!(windows.current.is_empty() && windows.previous.is_empty());
}

// ============================================================================
// Dwell runs
// ============================================================================

#[test]
fn interrupted_runs_are_split() {
    assert_eq!(run_lengths([Min, Warn, Warn, Min, Risk, Min]), vec![2, 1]);
}

#[test]
fn open_run_is_closed_at_end() {
    assert_eq!(run_lengths([Min, Warn, Risk]), vec![2]);
}

#[test]
fn runs_follow_chronology_not_input_order() {
    let mut all = records("A", "2025Q1", &[Min, Warn, Warn, Min]);
    all.reverse();
    assert_eq!(collect_runs(&all), vec![2]);
}

#[test]
fn empty_records_leave_dwell_undefined() {
    let summary = summarize(&[], 4);
    assert!(summary.value.is_none());
    assert!(summary.previous.is_none());
    assert!(summary.delta.is_none());
    assert_eq!(summary.run_count, 0);
}

#[test]
fn dwell_delta_is_current_minus_previous() {
    // Previous window: one 1-quarter run. Current window: one 3-quarter run.
    let all = records("A", "2024Q1", &[Warn, Min, Min, Min, Warn, Warn, Warn, Min]);
    let summary = summarize(&all, 4);
    assert_eq!(summary.previous, Some(1.0));
    assert_eq!(summary.value, Some(3.0));
    assert_eq!(summary.delta, Some(2.0));
}

// ============================================================================
// Normalizer
// ============================================================================

#[test]
fn normalized_trend_matches_window() {
    let window = ["2025Q1", "2025Q2", "2025Q3", "2025Q4"];
    let input = payload(
        &window,
        "2025Q4",
        vec![
            bucket("2025Q3", DataType::Actual, (5.0, 2.0, 1.0)),
            bucket("2024Q4", DataType::Actual, (9.0, 0.0, 0.0)),
            bucket("2025Q1", DataType::Actual, (6.0, 1.0, 1.0)),
            bucket("2025Q3", DataType::Actual, (0.0, 0.0, 8.0)),
        ],
    );

    let out = normalize(&input);
    assert_eq!(out.payload.trend.len(), window.len());
    for (b, token) in out.payload.trend.iter().zip(window) {
        assert_eq!(b.quarter, q(token));
    }

    // First occurrence wins.
    assert_eq!(out.payload.trend[2].normal, 5.0);
    // Gaps are zero-filled, the forecast slot typed as such.
    assert_eq!(out.payload.trend[1].total(), 0.0);
    assert_eq!(out.payload.trend[3].data_type, DataType::Forecast);

    assert_eq!(out.report.duplicate_quarters, vec![q("2025Q3")]);
    assert_eq!(out.report.missing_quarters, vec![q("2025Q2"), q("2025Q4")]);
    assert_eq!(out.report.dropped_quarters, vec![q("2024Q4")]);
    assert!(!out.report.length_mismatch_recovered);

    // The input is untouched.
    assert_eq!(input.trend.len(), 4);
}

#[test]
fn normalizing_twice_changes_nothing() {
    let input = payload(
        &["2025Q2", "2025Q3"],
        "2025Q3",
        vec![
            bucket("2025Q3", DataType::Forecast, (1.0, 1.0, 1.0)),
            bucket("2025Q3", DataType::Forecast, (2.0, 2.0, 2.0)),
        ],
    );
    let once = normalize(&input);
    let twice = normalize(&once.payload);
    assert_eq!(once.payload, twice.payload);
    assert!(twice.report.is_clean());
}

#[test]
fn percent_conversion() {
    let input = payload(
        &["2025Q1", "2025Q2"],
        "2025Q2",
        vec![
            bucket("2025Q1", DataType::Actual, (6.0, 3.0, 1.0)),
            bucket("2025Q2", DataType::Forecast, (0.0, 0.0, 0.0)),
        ],
    );
    let pct = to_percent_series(&input);
    assert_eq!(pct.unit, TrendUnit::Percent);
    let first = pct.trend[0];
    assert!((first.normal - 60.0).abs() < 1e-9);
    assert!((first.caution - 30.0).abs() < 1e-9);
    assert!((first.risk - 10.0).abs() < 1e-9);
    assert_eq!(pct.trend[1].total(), 0.0);

    // Already-percent payloads pass through.
    assert_eq!(to_percent_series(&pct), pct);
}

// ============================================================================
// Quarters
// ============================================================================

#[test]
fn quarters_order_chronologically() {
    assert!(q("2025Q4") < q("2026Q1"));
    assert!(q("2025Q1") < q("2025Q2"));
    assert_eq!(q("2025Q4").next(), q("2026Q1"));
    assert_eq!(q("2026Q1").prev(), q("2025Q4"));

    let mut shuffled = vec![q("2026Q1"), q("2024Q3"), q("2025Q4"), q("2025Q1")];
    shuffled.sort();
    let tokens: Vec<String> = shuffled.iter().map(ToString::to_string).collect();
    assert_eq!(tokens, ["2024Q3", "2025Q1", "2025Q4", "2026Q1"]);
}

#[test]
fn invalid_quarter_tokens_rejected() {
    for bad in ["2025Q5", "2025Q0", "25Q1", "2025-1", "", "Q1", "2025Q", "2025Q1x"] {
        assert!(bad.parse::<Quarter>().is_err(), "{bad} should not parse");
    }
}
