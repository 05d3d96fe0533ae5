//! Structured error bodies shared by every route.
//!
//! DESIGN
//! ======
//! Services expose `thiserror` enums that implement [`ErrorCode`]. Routes
//! pick the HTTP status and reply with `{"code": "E_...", "message": "..."}`
//! so clients can branch on the grepable code instead of the text.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::WithRejection;
use serde::Serialize;

/// JSON request body whose rejection is reported as an [`ApiError`].
pub type JsonBody<T> = WithRejection<Json<T>, ApiError>;

/// Grepable error code for structured error responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// A status plus structured body, returned from handlers as the `Err` arm.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, err: &impl ErrorCode) -> Self {
        Self { status, body: ErrorBody { code: err.error_code(), message: err.to_string() } }
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ErrorBody { code: "E_UNAUTHORIZED", message: "missing or expired session".into() },
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, body: ErrorBody { code: "E_BAD_REQUEST", message: message.into() } }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self { status: rejection.status(), body: ErrorBody { code: "E_BAD_REQUEST", message: rejection.body_text() } }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.body.code, message = %self.body.message, "request failed");
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
