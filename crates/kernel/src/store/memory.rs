//! In-process stores.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{FragmentStore, UserStore};
use crate::models::{CreateUser, EditableFragment, NewFragment, UpsertStatus, User};

/// Store that keeps everything in memory for the lifetime of the process.
///
/// Fragments live in a map ordered by `(page_name, element_selector)`, so a
/// page listing is a contiguous range already sorted by selector. Each
/// upsert runs under a single write lock.
#[derive(Default)]
pub struct MemoryStore {
    fragments: RwLock<BTreeMap<(String, String), EditableFragment>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored fragments across all pages.
    pub fn fragment_count(&self) -> usize {
        self.fragments.read().len()
    }
}

#[async_trait]
impl FragmentStore for MemoryStore {
    async fn find(
        &self,
        page_name: &str,
        element_selector: &str,
    ) -> Result<Option<EditableFragment>> {
        let key = (page_name.to_string(), element_selector.to_string());
        Ok(self.fragments.read().get(&key).cloned())
    }

    async fn list_by_page(&self, page_name: &str) -> Result<Vec<EditableFragment>> {
        let fragments = self.fragments.read();
        let page = fragments
            .range((page_name.to_string(), String::new())..)
            .take_while(|((page, _), _)| page == page_name)
            .map(|(_, fragment)| fragment.clone())
            .collect();
        Ok(page)
    }

    async fn upsert(&self, input: &NewFragment) -> Result<(EditableFragment, UpsertStatus)> {
        let now = Utc::now();
        let key = (input.page_name.clone(), input.element_selector.clone());
        let mut fragments = self.fragments.write();

        if let Some(existing) = fragments.get_mut(&key) {
            existing.content_html = input.content_html.clone();
            existing.content_text = input.content_text.clone();
            existing.element_type = input.element_type.clone();
            existing.updated_at = now;
            return Ok((existing.clone(), UpsertStatus::Updated));
        }

        let fragment = EditableFragment {
            id: Uuid::now_v7(),
            page_name: input.page_name.clone(),
            element_selector: input.element_selector.clone(),
            content_html: input.content_html.clone(),
            content_text: input.content_text.clone(),
            element_type: input.element_type.clone(),
            created_at: now,
            updated_at: now,
        };
        fragments.insert(key, fragment.clone());
        Ok((fragment, UpsertStatus::Created))
    }

    async fn delete(
        &self,
        page_name: &str,
        element_selector: &str,
    ) -> Result<Option<EditableFragment>> {
        let key = (page_name.to_string(), element_selector.to_string());
        Ok(self.fragments.write().remove(&key))
    }

    async fn healthy(&self) -> bool {
        true
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn create_user(&self, input: CreateUser) -> Result<User> {
        let user = User::build(input)?;
        let mut users = self.users.write();
        if users.values().any(|u| u.email == user.email) {
            bail!("a user with email {} already exists", user.email);
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("fragments", &self.fragments.read().len())
            .field("users", &self.users.read().len())
            .finish()
    }
}
