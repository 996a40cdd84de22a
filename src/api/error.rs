//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.
//!
//! Read endpoints never fail on log content; the only errors that surface
//! are write failures on ingestion, API-key rejections, and transport-level
//! problems.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// API-key mismatch on ingestion; a rejection, not a server error
    #[error("forbidden")]
    Forbidden,

    /// Persistence failure (snapshot or log write); fatal to the call
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    /// CSV rendering failure
    #[error("Export error: {0}")]
    Export(#[from] crate::export::ExportError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Rejection body for API-key mismatches, matching the producer contract
#[derive(Serialize)]
struct ForbiddenBody {
    status: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The producer contract fixes the rejection body shape
        if matches!(self, ApiError::Forbidden) {
            return (StatusCode::FORBIDDEN, Json(ForbiddenBody { status: "forbidden" }))
                .into_response();
        }

        let (status, code) = match &self {
            ApiError::Forbidden => unreachable!(),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            ApiError::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
