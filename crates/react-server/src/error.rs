//! API error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Error returned by a handler
///
/// Validation failures render as `{"error": ...}`; the others also carry
/// `"status": "error"`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request body is missing fields or has the wrong types
    #[error("{0}")]
    BadRequest(String),

    /// The run or the tool failed
    #[error("Internal server error: {0}")]
    Internal(String),

    /// No route matched
    #[error("Endpoint not found")]
    NotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            Self::BadRequest(_) => json!({ "error": self.to_string() }),
            _ => json!({ "error": self.to_string(), "status": "error" }),
        };
        (self.status(), Json(body)).into_response()
    }
}
