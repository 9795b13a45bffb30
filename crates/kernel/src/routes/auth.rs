//! Authentication routes.
//!
//! `POST /login` exchanges email and password for a signed bearer token.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::routes::helpers::json_body;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of the logged-in user.
#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}

/// Same message for unknown email and wrong password.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let request = json_body(payload)?;

    let (Some(email), Some(password)) = (non_blank(request.email), non_blank(request.password))
    else {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    };

    let user = state
        .users()
        .find_user_by_email(&email)
        .await?
        .filter(|u| u.verify_password(&password));

    let Some(user) = user else {
        info!("failed login attempt");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let token = state.auth().issue_token(&user)?;
    info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: LoginUser {
            id: user.id,
            email: user.email,
            role: user.role,
        },
    }))
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
