//! Trend bucket normalization.
//!
//! Upstream trend payloads may skip quarters or repeat them. The chart needs
//! exactly one bucket per `window_quarters` entry in axis order. Anomalies
//! are reconciled, reported and logged; they are never errors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::types::{DataType, Quarter, RiskStatusBucket, RiskStatusTrendPayload, TrendUnit};

/// What the normalizer had to fix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Quarters seen more than once; one entry per extra occurrence.
    pub duplicate_quarters: Vec<Quarter>,
    /// Window quarters with no input bucket, filled with zeros.
    pub missing_quarters: Vec<Quarter>,
    /// Input buckets whose quarter is not on the axis.
    pub dropped_quarters: Vec<Quarter>,
    /// The first pass produced the wrong length and was rebuilt.
    pub length_mismatch_recovered: bool,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_quarters.is_empty()
            && self.missing_quarters.is_empty()
            && self.dropped_quarters.is_empty()
            && !self.length_mismatch_recovered
    }
}

/// Normalized payload plus the reconciliation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTrend {
    pub payload: RiskStatusTrendPayload,
    pub report: ReconciliationReport,
}

fn fill_bucket(quarter: Quarter, forecast: Quarter) -> RiskStatusBucket {
    let data_type = if quarter == forecast {
        DataType::Forecast
    } else {
        DataType::Actual
    };
    RiskStatusBucket::empty(quarter, data_type)
}

fn align(
    window: &[Quarter],
    forecast: Quarter,
    lookup: &HashMap<Quarter, RiskStatusBucket>,
) -> Vec<RiskStatusBucket> {
    window
        .iter()
        .map(|q| lookup.get(q).copied().unwrap_or_else(|| fill_bucket(*q, forecast)))
        .collect()
}

/// Align `payload.trend` onto `payload.window_quarters`.
///
/// First occurrence of a quarter wins. The input is not modified.
pub fn normalize(payload: &RiskStatusTrendPayload) -> NormalizedTrend {
    let mut report = ReconciliationReport::default();

    let mut lookup: HashMap<Quarter, RiskStatusBucket> = HashMap::with_capacity(payload.trend.len());
    for bucket in &payload.trend {
        if lookup.contains_key(&bucket.quarter) {
            report.duplicate_quarters.push(bucket.quarter);
        } else {
            lookup.insert(bucket.quarter, *bucket);
        }
    }

    let mut trend = align(&payload.window_quarters, payload.forecast_quarter, &lookup);

    if trend.len() != payload.window_quarters.len() {
        error!(
            expected = payload.window_quarters.len(),
            actual = trend.len(),
            "Risk status trend length mismatch, rebuilding"
        );
        trend = align(&payload.window_quarters, payload.forecast_quarter, &lookup);
        report.length_mismatch_recovered = true;
    }

    report.missing_quarters = payload
        .window_quarters
        .iter()
        .filter(|q| !lookup.contains_key(*q))
        .copied()
        .collect();

    let mut dropped: Vec<Quarter> = lookup
        .keys()
        .filter(|q| !payload.window_quarters.contains(*q))
        .copied()
        .collect();
    dropped.sort_unstable();
    report.dropped_quarters = dropped;

    if !report.duplicate_quarters.is_empty() {
        let tokens: Vec<String> = report.duplicate_quarters.iter().map(ToString::to_string).collect();
        warn!(duplicates = ?tokens, "Duplicate quarters in risk status trend, keeping first occurrence");
    }
    if !report.dropped_quarters.is_empty() {
        warn!(count = report.dropped_quarters.len(), "Risk status buckets outside the window were dropped");
    }

    NormalizedTrend {
        payload: RiskStatusTrendPayload {
            window_quarters: payload.window_quarters.clone(),
            forecast_quarter: payload.forecast_quarter,
            trend,
            unit: payload.unit,
        },
        report,
    }
}

/// Convert a `COUNT` payload to percentages per bucket.
///
/// `PERCENT` payloads are returned as-is; zero-total buckets stay zero.
pub fn to_percent_series(payload: &RiskStatusTrendPayload) -> RiskStatusTrendPayload {
    if payload.unit == TrendUnit::Percent {
        return payload.clone();
    }
    RiskStatusTrendPayload {
        trend: payload.trend.iter().map(RiskStatusBucket::to_percent).collect(),
        unit: TrendUnit::Percent,
        ..payload.clone()
    }
}

/// Normalize, then convert to `unit` if it differs from the payload's.
///
/// Percent payloads are not converted back to counts.
pub fn normalize_as(payload: &RiskStatusTrendPayload, unit: TrendUnit) -> NormalizedTrend {
    let mut normalized = normalize(payload);
    if unit == TrendUnit::Percent {
        normalized.payload = to_percent_series(&normalized.payload);
    }
    normalized
}
