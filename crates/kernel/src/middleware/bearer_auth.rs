//! Bearer token authentication middleware.
//!
//! Checks `Authorization: Bearer <token>` headers, verifies the JWT, loads
//! the account it names and attaches the caller to the request.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Middleware to authenticate Bearer JWT tokens.
///
/// If a valid Bearer token is present, stores [`BearerAuth`] in request
/// extensions. If no token is present, passes through without modification.
/// If an invalid or expired token is present, returns 401.
pub async fn authenticate_bearer_token(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(auth_header) = auth_header else {
        return next.run(request).await;
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return next.run(request).await;
    };

    let claims = match state.auth().verify_token(token.trim()) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "invalid bearer token");
            return AppError::Unauthorized("Invalid or expired token".to_string()).into_response();
        }
    };

    let Ok(user_id) = claims.sub.parse::<Uuid>() else {
        debug!(sub = %claims.sub, "invalid user ID in token");
        return AppError::Unauthorized("Invalid token subject".to_string()).into_response();
    };

    // Identity comes from the stored account, not the token claims.
    let user = match state.users().find_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(%user_id, "bearer token for unknown user");
            return AppError::Unauthorized("Invalid or expired token".to_string()).into_response();
        }
        Err(e) => return AppError::Internal(e).into_response(),
    };

    request.extensions_mut().insert(BearerAuth {
        user_id: user.id,
        email: user.email,
        role: user.role,
    });

    next.run(request).await
}

/// Authenticated caller extracted from a valid JWT.
///
/// Used as a handler argument, it rejects unauthenticated requests with 401.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}

impl<S: Send + Sync> FromRequestParts<S> for BearerAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerAuth>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
