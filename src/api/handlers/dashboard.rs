//! Dashboard endpoints

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::analytics::normalize_as;
use crate::api::envelope::{ApiError, ApiResponse};
use crate::api::ApiState;
use crate::types::{TimeRange, TrendUnit};

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub range: Option<String>,
}

/// GET /api/dashboard/summary?range=7d|30d|90d
pub async fn get_dashboard_summary(
    State(state): State<ApiState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, ApiError> {
    let range = match query.range.as_deref() {
        None | Some("") => TimeRange::default(),
        Some(s) => s.parse::<TimeRange>().map_err(ApiError::BadRequest)?,
    };
    Ok(ApiResponse::ok(state.dataset.dashboard_summary(range)))
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendQuery {
    pub unit: Option<String>,
}

/// GET /api/dashboard/risk-trend?unit=count|percent
///
/// The payload is aligned to the chart window; the reconciliation report
/// says what had to be filled or dropped.
pub async fn get_risk_trend(
    State(state): State<ApiState>,
    Query(query): Query<TrendQuery>,
) -> Result<Response, ApiError> {
    let unit = match query.unit.as_deref() {
        None | Some("") => TrendUnit::default(),
        Some(s) => s.parse::<TrendUnit>().map_err(ApiError::BadRequest)?,
    };
    let normalized = normalize_as(&state.dataset.risk_trend_payload(), unit);
    Ok(ApiResponse::ok(normalized))
}
