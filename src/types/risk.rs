//! Risk observations, status buckets and trend payloads.

use serde::{Deserialize, Serialize};

use super::quarter::Quarter;

// ============================================================================
// Risk Level
// ============================================================================

/// Per-entity severity tier for one quarter, ordered `Min < Warn < Risk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Min,
    Warn,
    Risk,
}

impl RiskLevel {
    /// `Warn` and `Risk` count as elevated.
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::Warn | Self::Risk)
    }

    /// Tier for a 0-100 risk score.
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Self::Risk
        } else if score >= 40.0 {
            Self::Warn
        } else {
            Self::Min
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Min => "MIN",
            Self::Warn => "WARN",
            Self::Risk => "RISK",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One risk observation for one entity in one quarter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyRiskRecord {
    pub entity_id: String,
    pub entity_name: String,
    pub quarter: Quarter,
    pub risk_level: RiskLevel,
}

impl QuarterlyRiskRecord {
    pub fn new(entity_id: &str, entity_name: &str, quarter: Quarter, risk_level: RiskLevel) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            entity_name: entity_name.to_string(),
            quarter,
            risk_level,
        }
    }
}

// ============================================================================
// Status Buckets
// ============================================================================

/// Whether a bucket was observed or predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Actual,
    Forecast,
}

/// Unit of the three counters in a [`RiskStatusBucket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendUnit {
    #[default]
    Count,
    Percent,
}

impl std::str::FromStr for TrendUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "count" => Ok(Self::Count),
            "percent" | "pct" => Ok(Self::Percent),
            other => Err(format!("unknown trend unit '{other}'")),
        }
    }
}

/// Aggregated tier counters for one quarter across a population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskStatusBucket {
    pub quarter: Quarter,
    pub data_type: DataType,
    #[serde(rename = "NORMAL")]
    pub normal: f64,
    #[serde(rename = "CAUTION")]
    pub caution: f64,
    #[serde(rename = "RISK")]
    pub risk: f64,
}

impl RiskStatusBucket {
    /// All-zero bucket used to fill gaps in a trend.
    pub const fn empty(quarter: Quarter, data_type: DataType) -> Self {
        Self {
            quarter,
            data_type,
            normal: 0.0,
            caution: 0.0,
            risk: 0.0,
        }
    }

    pub fn total(&self) -> f64 {
        self.normal + self.caution + self.risk
    }

    /// Counters rescaled to percentages of the bucket total.
    ///
    /// A zero-total bucket is returned unchanged.
    pub fn to_percent(&self) -> Self {
        let total = self.total();
        if total == 0.0 {
            return *self;
        }
        Self {
            normal: self.normal / total * 100.0,
            caution: self.caution / total * 100.0,
            risk: self.risk / total * 100.0,
            ..*self
        }
    }
}

/// Trend payload handed to the risk status chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskStatusTrendPayload {
    /// Exact x-axis of the chart, forecast quarter last.
    pub window_quarters: Vec<Quarter>,
    pub forecast_quarter: Quarter,
    /// Unordered, possibly sparse or duplicated.
    #[serde(default)]
    pub trend: Vec<RiskStatusBucket>,
    #[serde(default)]
    pub unit: TrendUnit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_order_and_elevation() {
        assert!(RiskLevel::Min < RiskLevel::Warn);
        assert!(RiskLevel::Warn < RiskLevel::Risk);
        assert!(!RiskLevel::Min.is_elevated());
        assert!(RiskLevel::Warn.is_elevated());
        assert!(RiskLevel::Risk.is_elevated());
    }

    #[test]
    fn test_risk_level_from_score() {
        assert_eq!(RiskLevel::from_score(12.0), RiskLevel::Min);
        assert_eq!(RiskLevel::from_score(40.0), RiskLevel::Warn);
        assert_eq!(RiskLevel::from_score(85.5), RiskLevel::Risk);
    }

    #[test]
    fn test_bucket_percent() {
        let q: Quarter = "2025Q1".parse().unwrap();
        let b = RiskStatusBucket {
            quarter: q,
            data_type: DataType::Actual,
            normal: 6.0,
            caution: 3.0,
            risk: 1.0,
        };
        let p = b.to_percent();
        assert!((p.normal - 60.0).abs() < 1e-9);
        assert!((p.caution - 30.0).abs() < 1e-9);
        assert!((p.risk - 10.0).abs() < 1e-9);

        let zero = RiskStatusBucket::empty(q, DataType::Forecast).to_percent();
        assert_eq!(zero.total(), 0.0);
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{
            "windowQuarters": ["2025Q1", "2025Q2"],
            "forecastQuarter": "2025Q2",
            "trend": [{"quarter": "2025Q1", "dataType": "ACTUAL", "NORMAL": 5, "CAUTION": 2, "RISK": 1}],
            "unit": "COUNT"
        }"#;
        let payload: RiskStatusTrendPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.window_quarters.len(), 2);
        assert_eq!(payload.trend[0].normal, 5.0);
        assert_eq!(payload.unit, TrendUnit::Count);

        let rec: QuarterlyRiskRecord = serde_json::from_str(
            r#"{"entityId":"c1","entityName":"Acme","quarter":"2024Q4","riskLevel":"WARN"}"#,
        )
        .unwrap();
        assert_eq!(rec.risk_level, RiskLevel::Warn);
    }
}
