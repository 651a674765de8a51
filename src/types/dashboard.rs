//! Dashboard summary payloads.

use serde::{Deserialize, Serialize};

use crate::analytics::kpi::DeltaTone;

/// Time range selector for `GET /api/dashboard/summary?range=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl TimeRange {
    pub const fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            other => Err(format!("unknown range '{other}', expected 7d|30d|90d")),
        }
    }
}

/// A KPI tile: headline value plus formatted delta.
///
/// `value` and `delta` are `None` when not computable; the display strings
/// then carry the placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiCard {
    pub key: String,
    pub label: String,
    pub value: Option<f64>,
    pub display_value: String,
    pub delta: Option<f64>,
    pub display_delta: String,
    pub tone: DeltaTone,
}

/// Daily point of the dashboard alert trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: chrono::NaiveDate,
    pub alerts: u32,
    pub high_risk: u32,
}

/// Count of companies per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskDistribution {
    pub min: u32,
    pub warn: u32,
    pub risk: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub range: TimeRange,
    pub kpis: Vec<KpiCard>,
    pub trend: Vec<TrendPoint>,
    pub distribution: RiskDistribution,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub storage: String,
}
