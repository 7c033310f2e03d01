//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;

/// Where callers land when the access policy says no
pub const DENIED_REDIRECT: &str = "/dashboard";

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, invalid or revoked credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but the access policy denied the operation
    #[error("Forbidden")]
    Forbidden,

    /// Referenced record does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request clashes with existing data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Forbidden => return Redirect::to(DENIED_REDIRECT).into_response(),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Log an infrastructure failure and hide it behind a 500
pub fn internal(context: &str) -> impl FnOnce(anyhow::Error) -> ApiError + '_ {
    move |e| {
        tracing::error!("Failed to {}: {}", context, e);
        ApiError::InternalServerError
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
