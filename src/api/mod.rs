//! REST API module using Axum
//!
//! Provides HTTP endpoints for the SENTINEL dashboard:
//! - `/api/*` with a consistent `{data}` / `{error}` envelope
//! - `/health` at the root
//! - Built dashboard assets from `server.static_dir`, when configured

pub mod envelope;
pub mod extract;
pub mod handlers;
pub mod middleware;
mod routes;
mod state;

pub use envelope::{ApiError, ApiErrorResponse, ApiResponse, ErrorDetail};
pub use extract::{AuthUser, JsonBody};
pub use routes::{api_routes, health_routes};
pub use state::ApiState;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method, Uri};
use axum::middleware as axum_mw;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Environment variable with extra comma-separated CORS origins.
pub const CORS_ENV_VAR: &str = "SENTINEL_CORS_ORIGINS";

/// Unmatched paths outside the dashboard get an enveloped 404.
async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Origins come from `server.cors_origins` plus `SENTINEL_CORS_ORIGINS`
/// (e.g. `http://localhost:5173` for the Vite dev server).
fn build_cors_layer(configured: &[String]) -> CorsLayer {
    let mut origins: Vec<String> = configured.to_vec();
    if let Ok(extra) = std::env::var(CORS_ENV_VAR) {
        origins.extend(extra.split(',').map(|o| o.trim().to_string()));
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| !o.is_empty())
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed.is_empty() {
        cors
    } else {
        tracing::info!(origins = ?origins, "CORS: allowing configured origins");
        cors.allow_origin(allowed)
    }
}

/// Create the complete application router.
pub fn create_app(state: ApiState) -> Router {
    let server = state.config.server.clone();
    let cors = build_cors_layer(&server.cors_origins);

    let api = api_routes(state.clone())
        .layer(axum_mw::from_fn(middleware::no_store))
        .layer(DefaultBodyLimit::max(server.request_body_limit_bytes));

    let app = Router::new()
        .nest("/api", api)
        .merge(health_routes(state));

    let app = match server.static_dir.as_deref() {
        Some(dir) if dir.is_dir() => {
            tracing::info!(dir = %dir.display(), "Serving dashboard assets");
            // Client-side routes resolve to index.html.
            app.fallback_service(ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html"))))
        }
        Some(dir) => {
            tracing::warn!(dir = %dir.display(), "static_dir does not exist, dashboard disabled");
            app.fallback(not_found)
        }
        None => app.fallback(not_found),
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
