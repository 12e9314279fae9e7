use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::pod::PodError;

/// A failed request, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub(super) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub(super) fn internal(message: impl Into<String>) -> ApiError {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

pub(super) fn status_of(error: &PodError) -> StatusCode {
    match error {
        PodError::AlreadyExists { .. } => StatusCode::CONFLICT,
        PodError::NotFound { .. } => StatusCode::NOT_FOUND,
        PodError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        PodError::InvalidIdentifier { .. } => StatusCode::BAD_REQUEST,
        PodError::MalformedTerm { .. }
        | PodError::InvalidDocument { .. }
        | PodError::Transport { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl From<PodError> for ApiError {
    fn from(error: PodError) -> Self {
        ApiError {
            status: status_of(&error),
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
