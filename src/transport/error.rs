//! HTTP error responses
//!
//! Client-side failures map to `400 {error}`; everything else, including
//! upstream provider failures, maps to `500 {error, type}`.

use crate::error::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Fallback `type` tag for failures without an upstream classification
pub const SERVER_ERROR_TYPE: &str = "server_error";

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Upstream { message: String, error_type: String },
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for HttpError {
    fn from(err: Error) -> Self {
        match err {
            Error::Parse(detail) => HttpError::BadRequest(format!("Invalid JSON body: {}", detail)),
            Error::InvalidRequest(detail) => HttpError::BadRequest(detail),
            Error::Validation(e) => HttpError::BadRequest(e.public_message()),
            Error::Llm(e) => HttpError::Upstream {
                error_type: e.error_type().unwrap_or(SERVER_ERROR_TYPE).to_string(),
                message: e.to_string(),
            },
            other => HttpError::Upstream {
                message: other.to_string(),
                error_type: SERVER_ERROR_TYPE.to_string(),
            },
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            HttpError::BadRequest(message) => {
                warn!("Rejected request: {}", message);
                json!({ "error": message })
            }
            HttpError::Upstream {
                message,
                error_type,
            } => {
                error!(error_type = %error_type, "Request failed: {}", message);
                json!({ "error": message, "type": error_type })
            }
        };

        (status, Json(body)).into_response()
    }
}
