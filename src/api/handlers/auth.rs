//! Session endpoints

use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use tracing::info;

use crate::api::envelope::{ApiError, ApiResponse};
use crate::api::extract::{AuthUser, JsonBody};
use crate::api::ApiState;
use crate::types::{LoginRequest, SignupRequest};

/// POST /api/auth/login
pub async fn login(
    State(state): State<ApiState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Response, ApiError> {
    let session = state.sessions.login(&req)?;
    Ok(ApiResponse::ok(session))
}

/// POST /api/auth/signup - create an analyst account and sign in
pub async fn signup(
    State(state): State<ApiState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<Response, ApiError> {
    let session = state.sessions.signup(&req)?;
    Ok(ApiResponse::created(session))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<ApiState>, auth: AuthUser) -> Result<Response, ApiError> {
    let removed = state.sessions.logout(&auth.token)?;
    Ok(ApiResponse::ok(serde_json::json!({ "loggedOut": removed })))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Response {
    ApiResponse::ok(auth.user)
}

/// GET /api/auth/users - admin only, candidates for "view as"
pub async fn list_users(State(state): State<ApiState>, auth: AuthUser) -> Result<Response, ApiError> {
    if !auth.is_admin() {
        return Err(ApiError::Forbidden("Only admins can list users".to_string()));
    }
    Ok(ApiResponse::ok(state.sessions.users()?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewAsRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// POST /api/auth/view-as - act as another user; `null` returns to self
pub async fn view_as(
    State(state): State<ApiState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<ViewAsRequest>,
) -> Result<Response, ApiError> {
    let acting = state.sessions.set_view_as(&auth.token, req.user_id.as_deref())?;
    info!(acting_as = %acting.id, "View-as updated");
    Ok(ApiResponse::ok(acting))
}
