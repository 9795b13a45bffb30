#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for login and health endpoints.

use axum::http::{Method, StatusCode};
use serde_json::json;

use atelier_kernel::models::{CreateUser, ROLE_ADMIN, User};

mod common;
use common::{TEST_PASSWORD, TestApp, response_json};

#[tokio::test]
async fn login_returns_usable_token() {
    let app = TestApp::new();
    let user = app.create_user("admin@example.com", ROLE_ADMIN).await;

    let response = app
        .json(
            Method::POST,
            "/login",
            None,
            &json!({ "email": "Admin@Example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["user"]["email"], "admin@example.com");
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap();
    let claims = app.state.auth().verify_token(token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());

    let response = app
        .json(
            Method::PATCH,
            "/editable-content/element",
            Some(token),
            &json!({
                "page_name": "home",
                "element_selector": "#hero",
                "content_html": "<p>Hi</p>"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let app = TestApp::new();
    app.create_user("admin@example.com", ROLE_ADMIN).await;

    let wrong_password = app
        .json(
            Method::POST,
            "/login",
            None,
            &json!({ "email": "admin@example.com", "password": "wrong password" }),
        )
        .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown_email = app
        .json(
            Method::POST,
            "/login",
            None,
            &json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(
        response_json(wrong_password).await["message"],
        response_json(unknown_email).await["message"]
    );
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = TestApp::new();

    let response = app
        .json(
            Method::POST,
            "/login",
            None,
            &json!({ "email": "admin@example.com" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_for_unknown_account_is_rejected() {
    let app = TestApp::new();
    let ghost = User::build(CreateUser {
        email: "ghost@example.com".to_string(),
        password: TEST_PASSWORD.to_string(),
        role: ROLE_ADMIN.to_string(),
    })
    .unwrap();
    let token = app.state.auth().issue_token(&ghost).unwrap();

    let response = app
        .json(
            Method::PATCH,
            "/editable-content/element",
            Some(&token),
            &json!({
                "page_name": "home",
                "element_selector": "#hero",
                "content_html": "<p>Hi</p>"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response_json(response).await["message"],
        "Invalid or expired token"
    );
    assert_eq!(app.store.fragment_count(), 0);
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}
