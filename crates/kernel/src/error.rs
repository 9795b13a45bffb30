//! Application error types.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::content::ContentError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    /// Non-empty content that sanitized down to nothing.
    #[error("{0}")]
    ContentRejected(String),

    #[error("too many requests, retry in {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) | AppError::ContentRejected(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Store(e) => AppError::Internal(e),
            ContentError::ContentRejected => AppError::ContentRejected(err.to_string()),
            ContentError::NotFound => AppError::NotFound(err.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details are logged, never returned to the caller.
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        if let AppError::RateLimited { retry_after } = self {
            let mut response = (
                status,
                Json(json!({ "message": message, "retryAfter": retry_after })),
            )
                .into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            return response;
        }

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
