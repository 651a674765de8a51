//! Request extractors: bearer-token users and JSON bodies with enveloped
//! rejections.

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;

use super::envelope::ApiError;
use super::ApiState;
use crate::types::{Role, User};

/// Extract Bearer token from Authorization header.
fn extract_bearer(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Signed-in user, after applying any admin "view as" selection.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl AuthUser {
    pub fn require_writer(&self) -> Result<(), ApiError> {
        if self.user.role.can_write() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Read-only accounts cannot modify posts".to_string()))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

#[async_trait]
impl FromRequestParts<ApiState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(parts).ok_or_else(|| ApiError::Unauthorized("Missing Bearer token".to_string()))?;
        let user = state.sessions.resolve(&token)?;
        Ok(Self { user, token })
    }
}

/// `axum::Json` whose rejection is rendered as an error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header("authorization", h);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&parts(Some("Bearer abc"))).as_deref(), Some("abc"));
        assert!(extract_bearer(&parts(Some("Basic abc"))).is_none());
        assert!(extract_bearer(&parts(Some("Bearer "))).is_none());
        assert!(extract_bearer(&parts(None)).is_none());
    }
}
