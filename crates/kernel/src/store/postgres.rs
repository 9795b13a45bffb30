//! PostgreSQL-backed stores.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{FragmentStore, UserStore};
use crate::db;
use crate::models::{CreateUser, EditableFragment, NewFragment, UpsertStatus, User};

/// Store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FragmentStore for PgStore {
    async fn find(
        &self,
        page_name: &str,
        element_selector: &str,
    ) -> Result<Option<EditableFragment>> {
        EditableFragment::find(&self.pool, page_name, element_selector).await
    }

    async fn list_by_page(&self, page_name: &str) -> Result<Vec<EditableFragment>> {
        EditableFragment::list_by_page(&self.pool, page_name).await
    }

    async fn upsert(&self, fragment: &NewFragment) -> Result<(EditableFragment, UpsertStatus)> {
        EditableFragment::upsert(&self.pool, fragment).await
    }

    async fn delete(
        &self,
        page_name: &str,
        element_selector: &str,
    ) -> Result<Option<EditableFragment>> {
        EditableFragment::delete(&self.pool, page_name, element_selector).await
    }

    async fn healthy(&self) -> bool {
        db::check_health(&self.pool).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        User::find_by_email(&self.pool, email).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        User::find_by_id(&self.pool, id).await
    }

    async fn create_user(&self, input: CreateUser) -> Result<User> {
        User::create(&self.pool, input).await
    }
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("connections", &self.pool.size())
            .finish()
    }
}
