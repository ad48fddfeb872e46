//! API error handling.
//!
//! Every tracked failure is answered with the same opaque body; the error
//! ID is the only handle support needs to find the full report.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tracking::ErrorEvent;

/// Message shown to callers for every tracked failure.
pub const TRACKED_ERROR_MESSAGE: &str =
    "An internal error occurred. Please contact support with the error ID.";

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// API error type that can be converted to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    /// 500 response referencing a tracked event.
    pub fn tracked(event: &ErrorEvent) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse {
                error_id: Some(event.id.clone()),
                message: TRACKED_ERROR_MESSAGE.to_string(),
                timestamp: Some(event.occurred_at),
            },
        }
    }

    /// Create a 404 Not Found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse {
                error_id: None,
                message: message.into(),
                timestamp: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
