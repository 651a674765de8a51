//! Company directory endpoints

use axum::extract::{Path, State};
use axum::response::Response;

use crate::api::envelope::{ApiError, ApiResponse};
use crate::api::extract::JsonBody;
use crate::api::ApiState;
use crate::types::CompanySearchRequest;

/// POST /api/companies/search - keyword or business-number search
pub async fn search_companies(
    State(state): State<ApiState>,
    JsonBody(req): JsonBody<CompanySearchRequest>,
) -> Response {
    ApiResponse::ok(state.dataset.search(&req))
}

/// GET /api/companies/:id
pub async fn get_company(State(state): State<ApiState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    state
        .dataset
        .company(&id)
        .map(ApiResponse::ok)
        .ok_or_else(|| ApiError::NotFound(format!("Company '{id}' not found")))
}

/// GET /api/companies/:id/overview - forecast, KPIs and signals
pub async fn get_company_overview(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state
        .dataset
        .overview(&id)
        .map(ApiResponse::ok)
        .ok_or_else(|| ApiError::NotFound(format!("Company '{id}' not found")))
}
