//! API middleware layers.
//!
//! API responses carry per-user data and must not be cached by browsers
//! or intermediaries.

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

/// Axum middleware that marks every response `Cache-Control: no-store`.
pub async fn no_store(request: axum::extract::Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
