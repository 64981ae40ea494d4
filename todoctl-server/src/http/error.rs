//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! Storage details are logged, never returned to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::ValidationError;
use crate::service;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Database unreachable (503, logged)
    Unavailable(DbError),

    /// Database error (500, logged)
    Database(DbError),

    /// Any other failure, already logged where it happened (500)
    Internal,
}

impl ApiError {
    pub fn todo_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            resource: "todo",
            id: id.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(e) => json!({
                "error": "validation_error",
                "message": e.to_string()
            }),
            Self::NotFound { resource, id } => json!({
                "error": "not_found",
                "message": format!("{} '{}' not found", resource, id)
            }),
            Self::Unavailable(e) => {
                tracing::error!("Database unavailable: {}", e);
                json!({
                    "error": "service_unavailable",
                    "message": "database unavailable, try again later"
                })
            }
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                internal_error_body()
            }
            Self::Internal => internal_error_body(),
        };

        (status, Json(body)).into_response()
    }
}

fn internal_error_body() -> serde_json::Value {
    json!({
        "error": "internal_error",
        "message": "an internal error occurred"
    })
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        if e.is_unavailable() {
            Self::Unavailable(e)
        } else {
            Self::Database(e)
        }
    }
}

impl From<service::Error> for ApiError {
    fn from(e: service::Error) -> Self {
        match e {
            service::Error::Validation(e) => e.into(),
            service::Error::Storage(e) => e.into(),
        }
    }
}
