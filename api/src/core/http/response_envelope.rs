use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Wire envelope shared by the pipeline route's success and error paths:
/// `{"status":"success","response":...}` or `{"status":"error","message":...}`.
#[derive(Debug, Serialize)]
pub struct StatusEnvelope {
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusEnvelope {
    /// Build a success envelope carrying the generated text.
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            status: "success",
            response: Some(response.into()),
            message: None,
        }
    }

    /// Build an error envelope with a caller-facing message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            response: None,
            message: Some(message.into()),
        }
    }

    /// Convert to an axum response with the given status code.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}
