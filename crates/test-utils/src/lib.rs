//! Atelier test utilities.
//!
//! Request body builders and JSON assertion helpers for editable-content
//! integration tests.

use serde_json::{Value, json};

/// Start a fragment body for `PATCH /editable-content/element`.
pub fn fragment(page_name: &str, element_selector: &str, content_html: &str) -> TestFragment {
    TestFragment {
        page_name: page_name.to_string(),
        element_selector: element_selector.to_string(),
        content_html: content_html.to_string(),
        element_type: None,
    }
}

/// A fragment request builder.
#[derive(Debug, Clone)]
pub struct TestFragment {
    pub page_name: String,
    pub element_selector: String,
    pub content_html: String,
    pub element_type: Option<String>,
}

impl TestFragment {
    /// Set the element type.
    pub fn with_type(mut self, element_type: &str) -> Self {
        self.element_type = Some(element_type.to_string());
        self
    }

    /// Render the request body.
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "page_name": self.page_name,
            "element_selector": self.element_selector,
            "content_html": self.content_html,
        });
        if let Some(element_type) = &self.element_type {
            body["element_type"] = json!(element_type);
        }
        body
    }

    /// The `(page_name, element_selector)` key of this fragment.
    pub fn key(&self) -> Value {
        key(&self.page_name, &self.element_selector)
    }
}

/// Body for `DELETE /editable-content/element`.
pub fn key(page_name: &str, element_selector: &str) -> Value {
    json!({
        "page_name": page_name,
        "element_selector": element_selector,
    })
}

/// Body for both bulk endpoints.
pub fn bulk(items: impl IntoIterator<Item = Value>) -> Value {
    json!({ "elements": items.into_iter().collect::<Vec<_>>() })
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }
}
