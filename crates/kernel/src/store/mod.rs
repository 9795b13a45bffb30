//! Persistence collaborators.
//!
//! Handlers and services talk to storage only through [`FragmentStore`] and
//! [`UserStore`]. [`PgStore`] is the production backend; [`MemoryStore`]
//! backs tests and local tooling.

mod memory;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CreateUser, EditableFragment, NewFragment, UpsertStatus, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Keyed storage for editable-content fragments.
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// Fetch one fragment by `(page_name, element_selector)`.
    async fn find(&self, page_name: &str, element_selector: &str)
    -> Result<Option<EditableFragment>>;

    /// All fragments of a page, ordered by selector ascending. Empty when none.
    async fn list_by_page(&self, page_name: &str) -> Result<Vec<EditableFragment>>;

    /// Insert or update the fragment keyed by the input's natural key.
    ///
    /// Implementations must never create two rows for one key.
    async fn upsert(&self, fragment: &NewFragment) -> Result<(EditableFragment, UpsertStatus)>;

    /// Remove a fragment, returning it if it existed.
    async fn delete(&self, page_name: &str, element_selector: &str)
    -> Result<Option<EditableFragment>>;

    /// Whether the backend is reachable.
    async fn healthy(&self) -> bool;
}

/// Storage for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn create_user(&self, input: CreateUser) -> Result<User>;
}
