#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] runs the REAL kernel router and state over an in-memory
//! store, so tests exercise actual routing, auth, sanitization and rate
//! limiting without a database.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use atelier_kernel::models::{
    CreateUser, EditableFragment, NewFragment, ROLE_ADMIN, UpsertStatus, User,
};
use atelier_kernel::store::{FragmentStore, MemoryStore, UserStore};
use atelier_kernel::{AppState, Config, routes};

/// Password given to every user created by [`TestApp::create_user`].
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Configuration used by every test app.
pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        jwt_secret: "test-secret-that-is-at-least-32-bytes-long".to_string(),
        token_lifetime: Duration::from_secs(3600),
        cors_allowed_origins: vec!["*".to_string()],
        rate_limit_max_requests: 30,
        rate_limit_window: Duration::from_secs(60),
        rate_limit_sweep_interval: Duration::from_secs(300),
    }
}

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::build(config, store.clone(), store)
    }

    /// Test app whose fragments live in `fragments`; users stay in memory.
    pub fn with_fragment_store(fragments: Arc<dyn FragmentStore>) -> Self {
        Self::build(test_config(), fragments, Arc::new(MemoryStore::new()))
    }

    fn build(
        config: Config,
        fragments: Arc<dyn FragmentStore>,
        store: Arc<MemoryStore>,
    ) -> Self {
        let state = AppState::with_stores(&config, fragments, store.clone());
        let router = routes::build_router(state.clone());

        Self {
            router,
            store,
            state,
        }
    }

    /// Create a user with [`TEST_PASSWORD`].
    pub async fn create_user(&self, email: &str, role: &str) -> User {
        self.store
            .create_user(CreateUser {
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
                role: role.to_string(),
            })
            .await
            .expect("Failed to create user")
    }

    /// Create an administrator and return a bearer token for it.
    pub async fn admin_token(&self, email: &str) -> String {
        let user = self.create_user(email, ROLE_ADMIN).await;
        self.state
            .auth()
            .issue_token(&user)
            .expect("Failed to issue token")
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a JSON request, optionally authenticated.
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Send a GET request.
    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }
}

/// Fragment store whose writes to one selector fail.
pub struct FailingStore {
    pub inner: MemoryStore,
    pub failing_selector: &'static str,
}

impl FailingStore {
    pub fn new(failing_selector: &'static str) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing_selector,
        }
    }
}

#[async_trait]
impl FragmentStore for FailingStore {
    async fn find(
        &self,
        page_name: &str,
        element_selector: &str,
    ) -> anyhow::Result<Option<EditableFragment>> {
        self.inner.find(page_name, element_selector).await
    }

    async fn list_by_page(&self, page_name: &str) -> anyhow::Result<Vec<EditableFragment>> {
        self.inner.list_by_page(page_name).await
    }

    async fn upsert(
        &self,
        fragment: &NewFragment,
    ) -> anyhow::Result<(EditableFragment, UpsertStatus)> {
        if fragment.element_selector == self.failing_selector {
            anyhow::bail!("connection reset");
        }
        self.inner.upsert(fragment).await
    }

    async fn delete(
        &self,
        page_name: &str,
        element_selector: &str,
    ) -> anyhow::Result<Option<EditableFragment>> {
        self.inner.delete(page_name, element_selector).await
    }

    async fn healthy(&self) -> bool {
        true
    }
}

/// Read a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
