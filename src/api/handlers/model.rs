//! Risk model scoring jobs

use axum::extract::{Path, State};
use axum::response::Response;

use crate::api::envelope::{ApiError, ApiResponse};
use crate::api::extract::JsonBody;
use crate::api::ApiState;
use crate::types::ModelRunRequest;

/// POST /api/model/run - enqueue a scoring job, returns `{jobId, status}`
pub async fn run_model(
    State(state): State<ApiState>,
    JsonBody(req): JsonBody<ModelRunRequest>,
) -> Result<Response, ApiError> {
    let job = state.jobs.enqueue(req).await?;
    Ok(ApiResponse::accepted(job))
}

/// GET /api/model/jobs/:job_id
pub async fn get_model_job(
    State(state): State<ApiState>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    state
        .jobs
        .status(&job_id)
        .await
        .map(ApiResponse::ok)
        .ok_or_else(|| ApiError::NotFound(format!("Job '{job_id}' not found")))
}
