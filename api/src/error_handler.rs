use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use ai_completion_service::AiCompletionError;

use crate::core::http::response_envelope::StatusEnvelope;

/// Public application error type for the request pipeline.
///
/// Completion failures deliberately render as a generic message: the
/// underlying error is logged at the call site, never echoed to untrusted
/// callers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Completion dependency was never constructed; rejected before the
    /// request body is touched.
    #[error("Service configuration error: completion client not available.")]
    CompletionUnavailable,

    /// Malformed or incomplete request body.
    #[error("{0}")]
    BadRequest(String),

    /// Completion call failed (fatal error or exhausted retries).
    #[error("An unexpected server error occurred.")]
    Completion(#[source] AiCompletionError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::CompletionUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        StatusEnvelope::error(self.to_string()).into_response_with_status(status)
    }
}

/// Convert axum's JSON rejections (missing body, syntax errors, missing
/// fields) into a 400 carrying the rejection's own description.
impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}
