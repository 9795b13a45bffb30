//! Editable content fragments.
//!
//! A fragment is one WYSIWYG-editable region of a page, keyed by
//! `(page_name, element_selector)`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Element type stored when the caller does not supply one.
pub const DEFAULT_ELEMENT_TYPE: &str = "paragraph";

/// Stored editable-content fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EditableFragment {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Logical page the fragment belongs to.
    pub page_name: String,

    /// CSS selector of the DOM insertion point within the page.
    pub element_selector: String,

    /// Sanitized rich content.
    pub content_html: String,

    /// Plain-text projection of `content_html`.
    pub content_text: String,

    /// Free-form classification ("title", "paragraph", "bio", ...).
    pub element_type: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fragment that has passed validation and sanitization, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFragment {
    pub page_name: String,
    pub element_selector: String,
    pub content_html: String,
    pub content_text: String,
    pub element_type: String,
}

/// Whether an upsert inserted a new row or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertStatus {
    Created,
    Updated,
}

#[derive(sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    fragment: EditableFragment,
    inserted: bool,
}

const COLUMNS: &str = "id, page_name, element_selector, content_html, content_text, \
                       element_type, created_at, updated_at";

impl EditableFragment {
    /// Find a fragment by its natural key.
    pub async fn find(
        pool: &PgPool,
        page_name: &str,
        element_selector: &str,
    ) -> Result<Option<Self>> {
        let fragment = sqlx::query_as::<_, EditableFragment>(&format!(
            "SELECT {COLUMNS} FROM editable_content WHERE page_name = $1 AND element_selector = $2"
        ))
        .bind(page_name)
        .bind(element_selector)
        .fetch_optional(pool)
        .await
        .context("failed to fetch editable content")?;

        Ok(fragment)
    }

    /// List every fragment of a page, ordered by selector (byte order).
    pub async fn list_by_page(pool: &PgPool, page_name: &str) -> Result<Vec<Self>> {
        let fragments = sqlx::query_as::<_, EditableFragment>(&format!(
            r#"SELECT {COLUMNS} FROM editable_content
               WHERE page_name = $1
               ORDER BY element_selector COLLATE "C" ASC"#
        ))
        .bind(page_name)
        .fetch_all(pool)
        .await
        .context("failed to list editable content")?;

        Ok(fragments)
    }

    /// Create or update the fragment for `(page_name, element_selector)`.
    ///
    /// A single statement against the unique key: concurrent writers to the
    /// same key are serialized by the constraint and the loser becomes an
    /// update (last write wins), never a duplicate row.
    pub async fn upsert(pool: &PgPool, input: &NewFragment) -> Result<(Self, UpsertStatus)> {
        let row = sqlx::query_as::<_, UpsertRow>(&format!(
            r#"
            INSERT INTO editable_content
                (id, page_name, element_selector, content_html, content_text, element_type,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            ON CONFLICT (page_name, element_selector) DO UPDATE SET
                content_html = EXCLUDED.content_html,
                content_text = EXCLUDED.content_text,
                element_type = EXCLUDED.element_type,
                updated_at = NOW()
            RETURNING {COLUMNS}, (xmax = 0) AS inserted
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&input.page_name)
        .bind(&input.element_selector)
        .bind(&input.content_html)
        .bind(&input.content_text)
        .bind(&input.element_type)
        .fetch_one(pool)
        .await
        .context("failed to upsert editable content")?;

        let status = if row.inserted {
            UpsertStatus::Created
        } else {
            UpsertStatus::Updated
        };

        Ok((row.fragment, status))
    }

    /// Delete a fragment by its natural key, returning the removed row.
    pub async fn delete(
        pool: &PgPool,
        page_name: &str,
        element_selector: &str,
    ) -> Result<Option<Self>> {
        let fragment = sqlx::query_as::<_, EditableFragment>(&format!(
            "DELETE FROM editable_content WHERE page_name = $1 AND element_selector = $2 \
             RETURNING {COLUMNS}"
        ))
        .bind(page_name)
        .bind(element_selector)
        .fetch_optional(pool)
        .await
        .context("failed to delete editable content")?;

        Ok(fragment)
    }
}
