//! API route definitions
//!
//! - /api/auth/* - sessions and admin "view as"
//! - /api/companies/* - directory search and company detail
//! - /api/dashboard/* - KPI summary and risk status trend
//! - /api/model/* - scoring jobs
//! - /api/posts/* - Decision Room
//! - /health - liveness, outside `/api`

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::ApiState;

/// Create all routes mounted under `/api`.
pub fn api_routes(state: ApiState) -> Router {
    let upload_limit = state.config.upload.max_file_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        // Auth
        .route("/auth/login", post(handlers::login))
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::me))
        .route("/auth/users", get(handlers::list_users))
        .route("/auth/view-as", post(handlers::view_as))
        // Companies
        .route("/companies/search", post(handlers::search_companies))
        .route("/companies/:id", get(handlers::get_company))
        .route("/companies/:id/overview", get(handlers::get_company_overview))
        // Dashboard
        .route("/dashboard/summary", get(handlers::get_dashboard_summary))
        .route("/dashboard/risk-trend", get(handlers::get_risk_trend))
        // Model
        .route("/model/run", post(handlers::run_model))
        .route("/model/jobs/:job_id", get(handlers::get_model_job))
        // Decision Room
        .route(
            "/posts/:category",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/posts/:category/:id",
            get(handlers::get_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        // The first segment is the post id here; it shares the parameter
        // name with the category routes so the router accepts the overlap.
        .route(
            "/posts/:category/files",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}

/// Slack for multipart boundaries and part headers around one file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Health endpoint at root level
pub fn health_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state)
}
