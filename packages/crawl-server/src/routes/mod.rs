// HTTP routes
pub mod crawl;
pub mod health;
pub mod insights;

pub use crawl::*;
pub use health::*;
pub use insights::*;

use adaptive_strategy::AdaptiveError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorBody {
    error: String,
}

/// Handler error mapped onto a status code and a JSON error body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<AdaptiveError> for ApiError {
    fn from(err: AdaptiveError) -> Self {
        match err {
            AdaptiveError::InvalidRequest { .. } | AdaptiveError::Security(_) => {
                ApiError::BadRequest(err.to_string())
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
