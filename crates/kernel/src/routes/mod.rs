//! HTTP route handlers.

pub mod auth;
pub mod editable_content;
pub mod health;
pub mod helpers;

use axum::Router;

use crate::middleware::authenticate_bearer_token;
use crate::state::AppState;

/// Assemble every route with bearer authentication applied.
///
/// Transport layers (CORS, tracing) are added by the binary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(editable_content::router())
        .merge(health::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            authenticate_bearer_token,
        ))
        .with_state(state)
}
