//! KPI value and delta formatting.
//!
//! Undefined inputs render as [`PLACEHOLDER`], never as zero.

use serde::{Deserialize, Serialize};

use super::dwell::DwellSummary;
use crate::types::KpiCard;

/// Shown in place of a value or delta that cannot be computed.
pub const PLACEHOLDER: &str = "—";

/// Deltas smaller than this are shown as neutral.
pub const NEUTRAL_EPSILON: f64 = 1e-6;

/// Which direction of change is good for a KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Display tone of a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaTone {
    Better,
    Worse,
    Neutral,
}

impl DeltaTone {
    pub fn classify(delta: Option<f64>, polarity: Polarity) -> Self {
        match delta {
            Some(d) if d.abs() >= NEUTRAL_EPSILON => Self::directional(d, polarity),
            _ => Self::Neutral,
        }
    }

    /// Tone of a delta as displayed with `precision` decimals: a delta that
    /// renders as zero is neutral.
    pub fn classify_at(delta: Option<f64>, polarity: Polarity, precision: usize) -> Self {
        match delta {
            Some(d) if d.is_finite() && !rounds_to_zero(d, precision) => Self::directional(d, polarity),
            _ => Self::Neutral,
        }
    }

    fn directional(d: f64, polarity: Polarity) -> Self {
        match (d > 0.0, polarity) {
            (true, Polarity::HigherIsBetter) | (false, Polarity::LowerIsBetter) => Self::Better,
            _ => Self::Worse,
        }
    }
}

fn rounds_to_zero(d: f64, precision: usize) -> bool {
    format!("{:.precision$}", d.abs())
        .bytes()
        .all(|c| c == b'0' || c == b'.')
}

/// Current value against a previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiDelta {
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub delta: Option<f64>,
    pub tone: DeltaTone,
    pub polarity: Polarity,
}

impl KpiDelta {
    pub fn from_values(current: Option<f64>, previous: Option<f64>, polarity: Polarity) -> Self {
        let delta = match (current, previous) {
            (Some(c), Some(p)) => Some(c - p),
            _ => None,
        };
        Self {
            current,
            previous,
            delta,
            tone: DeltaTone::classify(delta, polarity),
            polarity,
        }
    }
}

/// Format a value with fixed precision and a unit suffix.
pub fn format_value(value: Option<f64>, precision: usize, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}{unit}"),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Format a delta with an explicit sign (`+0.5Q`, `-1.2%`, `0.0`).
pub fn format_delta(delta: Option<f64>, precision: usize, unit: &str) -> String {
    match delta {
        Some(d) if d.is_finite() => {
            // Avoid "-0.0" when rounding swallows the magnitude.
            let rounded = format!("{:.precision$}", d.abs());
            let sign = if rounds_to_zero(d, precision) {
                ""
            } else if d > 0.0 {
                "+"
            } else {
                "-"
            };
            format!("{sign}{rounded}{unit}")
        }
        _ => PLACEHOLDER.to_string(),
    }
}

/// Assemble a KPI tile. The tone follows the displayed delta.
pub fn kpi_card(
    key: &str,
    label: &str,
    delta: KpiDelta,
    precision: usize,
    unit: &str,
) -> KpiCard {
    KpiCard {
        key: key.to_string(),
        label: label.to_string(),
        value: delta.current,
        display_value: format_value(delta.current, precision, unit),
        delta: delta.delta,
        display_delta: format_delta(delta.delta, precision, unit),
        tone: DeltaTone::classify_at(delta.delta, delta.polarity, precision),
    }
}

/// Average elevated-risk dwell tile, in quarters. Lower is better.
pub fn dwell_card(summary: &DwellSummary) -> KpiCard {
    let delta = KpiDelta::from_values(summary.value, summary.previous, Polarity::LowerIsBetter);
    kpi_card("avgRiskDwell", "Avg. time at risk", delta, 1, "Q")
}
