//! Elevated-risk dwell time.
//!
//! A run is a maximal stretch of consecutive elevated (`WARN`/`RISK`)
//! observations for one entity. The dwell value of a window is the flat
//! mean of every run length across every entity, so entities with more
//! runs contribute more samples. No runs means no value, never zero.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::window::{resolve_windows, QuarterWindows};
use crate::types::{Quarter, QuarterlyRiskRecord, RiskLevel};

/// Run lengths of elevated risk in an ordered level sequence.
///
/// A run still open at the end of the sequence is closed and emitted.
pub fn run_lengths<I>(levels: I) -> Vec<u32>
where
    I: IntoIterator<Item = RiskLevel>,
{
    let mut runs = Vec::new();
    let mut counter = 0u32;

    for level in levels {
        if level.is_elevated() {
            counter += 1;
        } else if counter > 0 {
            runs.push(counter);
            counter = 0;
        }
    }
    if counter > 0 {
        runs.push(counter);
    }
    runs
}

/// Flat list of run lengths for all entities in `records`.
///
/// Records are grouped by `entity_id` and each group is scanned in
/// chronological order.
pub fn collect_runs<'a, I>(records: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a QuarterlyRiskRecord>,
{
    let mut by_entity: HashMap<&str, Vec<(Quarter, RiskLevel)>> = HashMap::new();
    for r in records {
        by_entity
            .entry(r.entity_id.as_str())
            .or_default()
            .push((r.quarter, r.risk_level));
    }

    // Sorted entity order keeps the output deterministic.
    let mut entities: Vec<_> = by_entity.into_iter().collect();
    entities.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut all = Vec::new();
    for (_, mut observations) in entities {
        observations.sort_by_key(|(q, _)| *q);
        all.extend(run_lengths(observations.into_iter().map(|(_, level)| level)));
    }
    all
}

/// Mean of the run lengths, `None` when there are none.
pub fn mean_run_length(runs: &[u32]) -> Option<f64> {
    if runs.is_empty() {
        return None;
    }
    let sum: u64 = runs.iter().map(|&r| u64::from(r)).sum();
    Some(sum as f64 / runs.len() as f64)
}

/// Dwell value for an arbitrary record set.
pub fn dwell_value<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a QuarterlyRiskRecord>,
{
    mean_run_length(&collect_runs(records))
}

/// `current - previous` when both are defined.
///
/// A positive delta means entities stay elevated longer, which is worse.
pub fn dwell_delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(current? - previous?)
}

/// Dwell KPI for the current window against the previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DwellSummary {
    pub value: Option<f64>,
    pub previous: Option<f64>,
    pub delta: Option<f64>,
    pub current_window: Vec<Quarter>,
    pub previous_window: Vec<Quarter>,
    /// Number of runs behind `value`.
    pub run_count: usize,
}

/// Resolve windows and compute the dwell value for each.
pub fn summarize(records: &[QuarterlyRiskRecord], window_size: usize) -> DwellSummary {
    let windows = resolve_windows(records, window_size);

    let current_runs = collect_runs(QuarterWindows::records_in(&windows.current, records));
    let previous_runs = collect_runs(QuarterWindows::records_in(&windows.previous, records));

    let value = mean_run_length(&current_runs);
    let previous = mean_run_length(&previous_runs);
    let delta = dwell_delta(value, previous);

    debug!(
        current_runs = current_runs.len(),
        previous_runs = previous_runs.len(),
        ?value,
        ?previous,
        "Computed dwell summary"
    );

    DwellSummary {
        value,
        previous,
        delta,
        current_window: windows.current,
        previous_window: windows.previous,
        run_count: current_runs.len(),
    }
}
