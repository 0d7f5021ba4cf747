//! Error types for the front server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[cfg(test)]
mod tests;

/// Message returned when the backend cannot be reached through the proxy.
pub const BACKEND_UNAVAILABLE_MESSAGE: &str = "Backend API unavailable";

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The proxied backend could not be reached or failed mid-response.
    #[error("Backend API unavailable")]
    BackendUnavailable(String),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status and machine-readable code for this error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BackendUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "BACKEND_UNAVAILABLE")
            }
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // the cause stays in the logs; clients get the fixed message
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::BackendUnavailable(err.to_string())
    }
}
