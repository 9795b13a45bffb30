//! Single-fragment operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::ContentError;
use super::filter::{extract_text, sanitize_html};
use super::selector::validate_selector;
use crate::models::{DEFAULT_ELEMENT_TYPE, EditableFragment, NewFragment, UpsertStatus};
use crate::store::FragmentStore;

/// Caller-supplied fragment, before validation.
///
/// Every field is optional so that missing fields surface as
/// [`ContentError::MissingField`] instead of a body-parsing failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FragmentInput {
    pub page_name: Option<String>,
    pub element_selector: Option<String>,
    pub content_html: Option<String>,
    pub element_type: Option<String>,
}

/// Caller-supplied fragment key, used by deletion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FragmentKey {
    pub page_name: Option<String>,
    pub element_selector: Option<String>,
}

/// Result of a successful single upsert.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub fragment: EditableFragment,
    pub status: UpsertStatus,
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ContentError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ContentError::MissingField(field)),
    }
}

/// Validate, sanitize and project a caller fragment into a storable one.
///
/// Checks run in order: required fields, selector, sanitization. Nothing is
/// persisted here.
pub fn prepare(input: &FragmentInput) -> Result<NewFragment, ContentError> {
    let page_name = required(input.page_name.as_deref(), "page_name")?;
    let element_selector = required(input.element_selector.as_deref(), "element_selector")?;
    let raw_html = required(input.content_html.as_deref(), "content_html")?;

    if !validate_selector(element_selector) {
        debug!(page_name, "rejected invalid selector");
        return Err(ContentError::InvalidSelector);
    }

    let content_html = sanitize_html(raw_html);
    if content_html.trim().is_empty() {
        warn!(
            page_name,
            element_selector, "content removed entirely by sanitization"
        );
        return Err(ContentError::ContentRejected);
    }

    let content_text = extract_text(&content_html);

    let element_type = input
        .element_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_ELEMENT_TYPE)
        .to_string();

    Ok(NewFragment {
        page_name: page_name.to_string(),
        element_selector: element_selector.to_string(),
        content_html,
        content_text,
        element_type,
    })
}

/// Editable-content operations over a [`FragmentStore`].
#[derive(Clone)]
pub struct EditableContentService {
    store: Arc<dyn FragmentStore>,
}

impl EditableContentService {
    pub fn new(store: Arc<dyn FragmentStore>) -> Self {
        Self { store }
    }

    /// All fragments of a page, ordered by selector. Empty when the page has none.
    pub async fn page(&self, page_name: &str) -> Result<Vec<EditableFragment>, ContentError> {
        self.store
            .list_by_page(page_name)
            .await
            .map_err(ContentError::Store)
    }

    /// Validate, sanitize and upsert one fragment.
    pub async fn upsert(&self, input: &FragmentInput) -> Result<UpsertOutcome, ContentError> {
        let fragment = prepare(input)?;

        let (fragment, status) = self
            .store
            .upsert(&fragment)
            .await
            .map_err(ContentError::Store)?;

        info!(
            page_name = %fragment.page_name,
            element_selector = %fragment.element_selector,
            status = ?status,
            "editable content saved"
        );

        Ok(UpsertOutcome { fragment, status })
    }

    /// Delete one fragment by key.
    pub async fn delete(&self, key: &FragmentKey) -> Result<EditableFragment, ContentError> {
        let page_name = required(key.page_name.as_deref(), "page_name")?;
        let element_selector = required(key.element_selector.as_deref(), "element_selector")?;

        let removed = self
            .store
            .delete(page_name, element_selector)
            .await
            .map_err(ContentError::Store)?
            .ok_or(ContentError::NotFound)?;

        info!(page_name, element_selector, "editable content deleted");
        Ok(removed)
    }
}

impl std::fmt::Debug for EditableContentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditableContentService").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn input(page: &str, selector: &str, html: &str) -> FragmentInput {
        FragmentInput {
            page_name: Some(page.to_string()),
            element_selector: Some(selector.to_string()),
            content_html: Some(html.to_string()),
            element_type: None,
        }
    }

    fn service() -> (EditableContentService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (EditableContentService::new(store.clone()), store)
    }

    #[test]
    fn prepare_reports_first_missing_field() {
        let mut fragment = input("home", ".intro", "<p>x</p>");
        fragment.element_selector = None;
        assert!(matches!(
            prepare(&fragment),
            Err(ContentError::MissingField("element_selector"))
        ));

        let mut fragment = input("home", ".intro", "<p>x</p>");
        fragment.page_name = Some("   ".to_string());
        assert!(matches!(
            prepare(&fragment),
            Err(ContentError::MissingField("page_name"))
        ));

        let mut fragment = input("home", ".intro", "");
        fragment.content_html = Some(String::new());
        assert!(matches!(
            prepare(&fragment),
            Err(ContentError::MissingField("content_html"))
        ));
    }

    #[test]
    fn prepare_rejects_invalid_selector_before_sanitizing() {
        let fragment = input("home", "<script>alert(1)</script>", "<script>x</script>");
        assert!(matches!(
            prepare(&fragment),
            Err(ContentError::InvalidSelector)
        ));
    }

    #[test]
    fn prepare_rejects_fully_stripped_content() {
        let fragment = input("home", ".intro", "<script>evil()</script>");
        assert!(matches!(
            prepare(&fragment),
            Err(ContentError::ContentRejected)
        ));
    }

    #[test]
    fn prepare_derives_text_and_default_type() {
        let prepared = prepare(&input("team", ".name", "<strong>Marie <em>Dubois</em></strong>"))
            .unwrap();
        assert_eq!(prepared.content_html, "<strong>Marie <em>Dubois</em></strong>");
        assert_eq!(prepared.content_text, "Marie Dubois");
        assert_eq!(prepared.element_type, "paragraph");

        let mut fragment = input("team", ".name", "Jean");
        fragment.element_type = Some("title".to_string());
        assert_eq!(prepare(&fragment).unwrap().element_type, "title");
    }

    #[test]
    fn markup_without_text_is_kept_with_empty_text() {
        for html in ["<p></p>", "<br>"] {
            let prepared = prepare(&input("home", ".spacer", html)).unwrap();
            assert_eq!(prepared.content_html, html);
            assert_eq!(prepared.content_text, "");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_upserts_on_one_key_create_one_row() {
        let (service, store) = service();

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    let fragment = input("p", ".a", &format!("<p>version {i}</p>"));
                    service.upsert(&fragment).await.unwrap().status
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() == UpsertStatus::Created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.fragment_count(), 1);
    }

    #[tokio::test]
    async fn upsert_is_idempotent_for_identical_content() {
        let (service, store) = service();
        let fragment = input("team", ".name", "<strong>Jean</strong> <script>x</script>");

        let first = service.upsert(&fragment).await.unwrap();
        assert_eq!(first.status, UpsertStatus::Created);

        let second = service.upsert(&fragment).await.unwrap();
        assert_eq!(second.status, UpsertStatus::Updated);
        assert_eq!(second.fragment.id, first.fragment.id);
        assert_eq!(second.fragment.content_html, first.fragment.content_html);
        assert_eq!(second.fragment.content_text, first.fragment.content_text);
        assert!(second.fragment.updated_at >= first.fragment.updated_at);
        assert_eq!(store.fragment_count(), 1);
    }

    #[tokio::test]
    async fn rejected_input_is_never_persisted() {
        let (service, store) = service();
        assert!(service
            .upsert(&input("home", "<b>", "<p>x</p>"))
            .await
            .is_err());
        assert!(service
            .upsert(&input("home", ".x", "<iframe src=x></iframe>"))
            .await
            .is_err());
        assert_eq!(store.fragment_count(), 0);
    }

    #[tokio::test]
    async fn delete_missing_fragment_is_not_found() {
        let (service, _store) = service();
        let key = FragmentKey {
            page_name: Some("home".to_string()),
            element_selector: Some(".nope".to_string()),
        };
        assert!(matches!(
            service.delete(&key).await,
            Err(ContentError::NotFound)
        ));
    }
}
