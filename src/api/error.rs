//! Error to HTTP response mapping.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = if self.is_client_error() {
            (StatusCode::BAD_REQUEST, self.to_string())
        } else {
            // Infrastructure detail stays in the log
            error!("Request failed: {}", self);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
