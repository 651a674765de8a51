//! Risk trend aggregation.
//!
//! - [`window`]: current/previous quarter windows
//! - [`dwell`]: elevated-risk run lengths and dwell deltas
//! - [`normalizer`]: one bucket per chart quarter, with a reconciliation report
//! - [`kpi`]: delta tone and display formatting

pub mod window;
pub mod dwell;
pub mod normalizer;
pub mod kpi;

pub use window::{resolve_windows, QuarterWindows};
pub use dwell::{collect_runs, dwell_delta, run_lengths, summarize, DwellSummary};
pub use normalizer::{normalize, normalize_as, to_percent_series, NormalizedTrend, ReconciliationReport};
pub use kpi::{DeltaTone, KpiDelta, Polarity, PLACEHOLDER};
