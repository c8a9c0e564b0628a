//! Axum-specific error types and mappings.
//!
//! Maps core and upstream errors to HTTP status codes and the JSON
//! `{error, status}` body every endpoint uses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mentorchat_core::SynthesisError;
use serde::Serialize;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The chat backend failed or answered with an error.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Internal server error, including missing credentials.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<SynthesisError> for HttpError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Validation(msg) => Self::BadRequest(msg),
            SynthesisError::Configuration(msg) => Self::Internal(msg),
        }
    }
}

impl From<UpstreamError> for HttpError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::NotConfigured => Self::Internal(err.to_string()),
            UpstreamError::Request(_) | UpstreamError::Status { .. } => {
                Self::BadGateway(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}
