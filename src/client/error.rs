use std::collections::BTreeMap;

use reqwest::StatusCode;

use crate::auth::ValidationErrors;

/// Errors returned by [`super::ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The server answered with a non-success status.
    #[error("request failed ({status}): {message}")]
    Status {
        status: StatusCode,
        code: String,
        message: String,
        field_errors: BTreeMap<String, Vec<String>>,
    },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// Rejected locally before any network call.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),
}

impl RequestError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Per-field messages from either local validation or a 422 body.
    pub fn field_errors(&self) -> BTreeMap<String, Vec<String>> {
        match self {
            Self::Status { field_errors, .. } => field_errors.clone(),
            Self::Validation(errors) => errors.clone().into_inner(),
            _ => BTreeMap::new(),
        }
    }

    /// Backend outages and garbled responses, as opposed to requests the
    /// backend deliberately refused.
    pub fn is_backend_failure(&self) -> bool {
        match self {
            Self::Status { status, .. } => status.is_server_error(),
            Self::Transport(_) | Self::Decode(_) => true,
            Self::Validation(_) => false,
        }
    }

    /// Text shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Please check the highlighted fields.",
            Self::Transport(_) => "Unable to reach the server. Check your connection and try again.",
            Self::Decode(_) => "The server sent an unexpected response.",
            Self::Status { status, .. } => match *status {
                StatusCode::UNAUTHORIZED => "Your session has expired. Please sign in again.",
                StatusCode::FORBIDDEN => "You do not have permission to do that.",
                StatusCode::NOT_FOUND => "The requested item could not be found.",
                StatusCode::CONFLICT => "This item already exists or was changed by someone else.",
                StatusCode::UNPROCESSABLE_ENTITY => "Please check the highlighted fields.",
                StatusCode::INTERNAL_SERVER_ERROR => "A server error occurred. Please try again later.",
                _ => "The request could not be completed. Please try again.",
            },
        }
    }
}
