//! Shared route helpers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::middleware::ClientId;
use crate::state::AppState;

/// Unwrap a JSON body, turning extractor rejections into a 400 with a JSON message.
///
/// Handlers take `Result<Json<T>, JsonRejection>` as their last argument so
/// authentication and rate limiting run before the body is looked at.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::Validation(format!("invalid request body: {}", e.body_text())))
}

/// Count a mutating call against the caller's rate-limit window.
pub fn enforce_rate_limit(state: &AppState, client: &ClientId) -> AppResult<()> {
    state.rate_limiter().check(&client.0).map_err(|retry_after| {
        warn!(identity = %client.0, retry_after, "rate limit exceeded");
        AppError::RateLimited { retry_after }
    })
}
