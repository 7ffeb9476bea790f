//! Error responses.
//!
//! Lookup errors map to 400/404/500 with a JSON body
//! `{ "error": <kind>, "message": <text> }`. Unexpected errors hide their
//! detail from the caller; it is already in logs and telemetry.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::service::LookupError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl LookupError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LookupError::Validation { .. } => StatusCode::BAD_REQUEST,
            LookupError::NotFound { .. } => StatusCode::NOT_FOUND,
            LookupError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let message = match &self {
            LookupError::Unexpected(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: self.kind(),
            message,
        };
        (self.status_code(), Json(body)).into_response()
    }
}
