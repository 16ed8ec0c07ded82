//! HTTP error type for casefuse-engine
//!
//! Every failure leaves the API as `{"error": {"code": ..., "message": ...}}`.

use crate::types::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Pipeline failure, status depends on the variant
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    /// HTTP status and machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Pipeline(err) => match err {
                PipelineError::InvalidSourceInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                PipelineError::PersonaNotFound(_) => (StatusCode::NOT_FOUND, "PERSONA_NOT_FOUND"),
                PipelineError::EmptySourceSet => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "EMPTY_SOURCE_SET")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_and_code().0.is_server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Pipeline(err) => err.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
