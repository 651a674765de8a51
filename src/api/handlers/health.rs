use axum::extract::State;
use axum::response::Response;

use crate::api::envelope::ApiResponse;
use crate::api::ApiState;
use crate::types::HealthStatus;

/// GET /health
pub async fn health_check(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.posts.backend_name().to_string(),
    })
}
