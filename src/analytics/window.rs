//! Quarter window resolution.
//!
//! Splits the distinct quarters present in a record set into the most
//! recent `w` quarters (`current`) and the `w` quarters right before them
//! (`previous`). Short histories give short windows; nothing is padded.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::{Quarter, QuarterlyRiskRecord};

/// Two disjoint ascending windows of distinct quarters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterWindows {
    pub current: Vec<Quarter>,
    pub previous: Vec<Quarter>,
}

impl QuarterWindows {
    /// Records whose quarter falls in `window`.
    pub fn records_in<'a>(
        window: &[Quarter],
        records: &'a [QuarterlyRiskRecord],
    ) -> Vec<&'a QuarterlyRiskRecord> {
        records
            .iter()
            .filter(|r| window.binary_search(&r.quarter).is_ok())
            .collect()
    }

    pub fn has_previous(&self) -> bool {
        !self.previous.is_empty()
    }
}

/// Resolve current/previous windows of `window_size` quarters.
pub fn resolve_windows(records: &[QuarterlyRiskRecord], window_size: usize) -> QuarterWindows {
    let distinct: Vec<Quarter> = records
        .iter()
        .map(|r| r.quarter)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    resolve_from_quarters(&distinct, window_size)
}

/// Same as [`resolve_windows`] over an ascending, deduplicated quarter list.
pub fn resolve_from_quarters(sorted_distinct: &[Quarter], window_size: usize) -> QuarterWindows {
    let n = sorted_distinct.len();
    let current_start = n.saturating_sub(window_size);
    let previous_start = current_start.saturating_sub(window_size);

    QuarterWindows {
        current: sorted_distinct[current_start..].to_vec(),
        previous: sorted_distinct[previous_start..current_start].to_vec(),
    }
}
