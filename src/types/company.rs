//! Monitored companies and their detail views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dashboard::KpiCard;
use super::quarter::Quarter;
use super::risk::{DataType, RiskLevel};

/// A partner or supplier under monitoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    /// Registration code, searchable alongside the name.
    pub business_number: String,
    pub industry: String,
    pub region: String,
    pub risk_level: RiskLevel,
    /// 0-100, higher is riskier.
    pub risk_score: f64,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One point of a company's risk forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub quarter: Quarter,
    pub score: f64,
    pub data_type: DataType,
    /// Confidence band, only present on forecast points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

/// Early-warning signal attached to a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSignal {
    pub title: String,
    pub severity: RiskLevel,
    pub detected_at: DateTime<Utc>,
    #[serde(default)]
    pub source: String,
}

/// Forecast + KPI + signal bundle for the company detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyOverview {
    pub company: Company,
    pub forecast: Vec<ForecastPoint>,
    pub kpis: Vec<KpiCard>,
    pub signals: Vec<RiskSignal>,
}

/// Body of `POST /api/companies/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySearchRequest {
    #[serde(default)]
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}
