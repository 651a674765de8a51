//! Response envelope shared by every endpoint.
//!
//! Success is `{ "data": T }`; failure is
//! `{ "error": { "code", "message", "fieldErrors" } }` with the matching
//! HTTP status.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::auth::{AuthError, ValidationErrors};
use crate::jobs::JobError;
use crate::storage::StorageError;

/// Successful response: `{ "data": T }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Response {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Response {
        Self::with_status(StatusCode::CREATED, data)
    }

    pub fn accepted(data: T) -> Response {
        Self::with_status(StatusCode::ACCEPTED, data)
    }

    fn with_status(status: StatusCode, data: T) -> Response {
        (status, axum::Json(Self { data })).into_response()
    }
}

/// Error detail inside [`ApiErrorResponse`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: BTreeMap<String, Vec<String>>,
}

/// Error response: `{ "error": { ... } }`
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
}

/// Handler error, rendered through [`ApiErrorResponse`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "Request failed");
        }
        let message = self.to_string();
        let field_errors = match self {
            Self::Validation(errors) => errors.into_inner(),
            _ => BTreeMap::new(),
        };
        let body = ApiErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field_errors,
            },
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::Unauthenticated => Self::Unauthorized(e.to_string()),
            AuthError::EmailTaken => Self::Conflict(e.to_string()),
            AuthError::Forbidden(_) => Self::Forbidden(e.to_string()),
            AuthError::UnknownUser(_) => Self::NotFound(e.to_string()),
            AuthError::Validation(v) => Self::Validation(v),
            AuthError::Poisoned => Self::Internal(e.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => Self::NotFound(e.to_string()),
            StorageError::Conflict(_) => Self::Conflict(e.to_string()),
            StorageError::Database(_) | StorageError::Serialization(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<JobError> for ApiError {
    fn from(e: JobError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ok_response_shape() {
        let resp = ApiResponse::ok(serde_json::json!({"hello": "world"}));
        assert_eq!(resp.status(), StatusCode::OK);
        let v = body_json(resp).await;
        assert_eq!(v["data"]["hello"], "world");
        assert!(v.get("error").is_none());
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let resp = ApiError::NotFound("gone".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let v = body_json(resp).await;
        assert_eq!(v["error"]["code"], "NOT_FOUND");
        assert_eq!(v["error"]["message"], "gone");
        assert!(v["error"].get("fieldErrors").is_none());
    }

    #[tokio::test]
    async fn test_validation_carries_field_errors() {
        let mut errors = ValidationErrors::default();
        errors.add("title", "Title is required.");
        let resp = ApiError::from(errors).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let v = body_json(resp).await;
        assert_eq!(v["error"]["fieldErrors"]["title"][0], "Title is required.");
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(ApiError::from(AuthError::EmailTaken), ApiError::Conflict(_)));
        assert!(matches!(ApiError::from(AuthError::Unauthenticated), ApiError::Unauthorized(_)));
        assert!(matches!(
            ApiError::from(AuthError::Forbidden(crate::types::Role::Admin)),
            ApiError::Forbidden(_)
        ));
    }
}
