//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::content::EditableContentService;
use crate::db;
use crate::middleware::{RateLimitConfig, RateLimiter};
use crate::services::AuthService;
use crate::store::{FragmentStore, PgStore, UserStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Fragment persistence.
    fragments: Arc<dyn FragmentStore>,

    /// User persistence.
    users: Arc<dyn UserStore>,

    /// Editable-content pipeline over `fragments`.
    content: EditableContentService,

    /// Bearer token signing and verification.
    auth: AuthService,

    /// Limiter for mutating editable-content calls.
    ///
    /// Constructed once per process; swept by a background task in the binary.
    rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Create application state backed by PostgreSQL.
    ///
    /// Connects the pool and applies pending migrations.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;

        info!("database ready");

        let store = Arc::new(PgStore::new(pool));
        Ok(Self::with_stores(config, store.clone(), store))
    }

    /// Create application state over the given stores.
    pub fn with_stores(
        config: &Config,
        fragments: Arc<dyn FragmentStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            max_requests: config.rate_limit_max_requests,
            window: config.rate_limit_window,
        }));

        Self {
            inner: Arc::new(AppStateInner {
                content: EditableContentService::new(fragments.clone()),
                fragments,
                users,
                auth: AuthService::new(config.jwt_secret.as_bytes(), config.token_lifetime),
                rate_limiter,
            }),
        }
    }

    /// Get the user store.
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.inner.users
    }

    /// Get the editable-content service.
    pub fn content(&self) -> &EditableContentService {
        &self.inner.content
    }

    /// Get the auth service.
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get the rate limiter.
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.inner.rate_limiter
    }

    /// Check if the fragment store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.fragments.healthy().await
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.inner.auth)
            .field("rate_limiter", &self.inner.rate_limiter)
            .finish_non_exhaustive()
    }
}
