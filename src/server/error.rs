//! HTTP error responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::{ErrorCategory, HrAgentError};

/// An error rendered as `{"detail": ...}` with a status code.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    /// A failed agent turn.
    pub fn processing(err: &HrAgentError) -> Self {
        Self::new(
            status_for(err),
            format!("Error processing request: {err}"),
        )
    }
}

/// Status code for an agent failure.
pub fn status_for(err: &HrAgentError) -> StatusCode {
    match err.category() {
        ErrorCategory::Timeout => StatusCode::GATEWAY_TIMEOUT,
        // the upstream model API failed us
        ErrorCategory::Authentication
        | ErrorCategory::RateLimit
        | ErrorCategory::Network
        | ErrorCategory::Server
        | ErrorCategory::Api => StatusCode::BAD_GATEWAY,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Configuration
        | ErrorCategory::Serialization
        | ErrorCategory::ToolExecution
        | ErrorCategory::InvalidRequest
        | ErrorCategory::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<HrAgentError> for ApiError {
    fn from(err: HrAgentError) -> Self {
        match err {
            HrAgentError::SessionNotFound(_) => Self::not_found(err.to_string()),
            other => Self::processing(&other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
