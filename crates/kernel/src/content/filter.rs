//! HTML filters for editable content.
//!
//! Two independent passes, both built on ammonia's allow-list cleaner:
//! - [`FragmentHtmlFilter`]: the storage boundary. Keeps a small inline tag
//!   set with per-tag attributes and http(s)/mailto links only.
//! - [`PlainTextFilter`]: strips every tag and returns the trimmed text. It
//!   cleans its input itself instead of assuming the first pass already ran.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use ammonia::{Builder, UrlRelative};

/// Tags kept in stored fragments.
pub const ALLOWED_TAGS: &[&str] = &["b", "strong", "i", "em", "a", "br", "p", "span"];

/// URL schemes permitted in `href`.
pub const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Inline style properties a `span` may carry.
const ALLOWED_STYLE_PROPERTIES: &[&str] = &[
    "color",
    "background-color",
    "font-weight",
    "font-style",
    "font-size",
    "text-decoration",
];

/// Tags removed together with everything inside them.
const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea",
];

/// Trait for text filters applied to editable content.
pub trait TextFilter: Send + Sync {
    /// Filter name for debugging.
    fn name(&self) -> &str;

    /// Process the input text and return filtered output.
    fn process(&self, input: &str) -> String;
}

static FRAGMENT_CLEANER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let tag_attributes = HashMap::from([
        ("a", HashSet::from(["href", "title", "target"])),
        ("span", HashSet::from(["style"])),
    ]);

    let mut builder = Builder::empty();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .tag_attributes(tag_attributes)
        .filter_style_properties(ALLOWED_STYLE_PROPERTIES.iter().copied().collect())
        .url_schemes(ALLOWED_URL_SCHEMES.iter().copied().collect())
        .url_relative(UrlRelative::PassThrough)
        .link_rel(None)
        .clean_content_tags(DROP_WITH_CONTENT.iter().copied().collect())
        .strip_comments(true);
    builder
});

static TEXT_CLEANER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::empty();
    builder
        .clean_content_tags(DROP_WITH_CONTENT.iter().copied().collect())
        .strip_comments(true);
    builder
});

/// Allow-list sanitizer for stored fragment HTML.
pub struct FragmentHtmlFilter;

impl TextFilter for FragmentHtmlFilter {
    fn name(&self) -> &str {
        "fragment_html"
    }

    fn process(&self, input: &str) -> String {
        FRAGMENT_CLEANER.clean(input).to_string()
    }
}

/// Tag-stripping filter producing the plain-text projection.
///
/// The output is text with HTML entities still escaped (`&lt;`, `&amp;`),
/// safe to embed anywhere the stored HTML could go.
pub struct PlainTextFilter;

impl TextFilter for PlainTextFilter {
    fn name(&self) -> &str {
        "plain_text"
    }

    fn process(&self, input: &str) -> String {
        TEXT_CLEANER.clean(input).to_string().trim().to_string()
    }
}

/// Sanitize untrusted HTML for storage.
pub fn sanitize_html(html: &str) -> String {
    FragmentHtmlFilter.process(html)
}

/// Derive the plain-text projection of `html`.
pub fn extract_text(html: &str) -> String {
    PlainTextFilter.process(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_allowed_inline_markup() {
        let input = "<p>Hello <b>bold</b>, <strong>strong</strong>, <i>i</i>, <em>em</em><br></p>";
        assert_eq!(sanitize_html(input), input);
    }

    #[test]
    fn strips_script_and_iframe_but_keeps_siblings() {
        let output = sanitize_html(
            r#"<script>alert(1)</script><strong>ok</strong><iframe src="x"></iframe>"#,
        );
        assert_eq!(output, "<strong>ok</strong>");
    }

    #[test]
    fn script_content_is_dropped_not_kept_as_text() {
        assert_eq!(sanitize_html("<script>evil()</script>"), "");
        assert_eq!(sanitize_html("<style>body{}</style>"), "");
    }

    #[test]
    fn unknown_tags_are_unwrapped() {
        assert_eq!(sanitize_html("<div><h1>Title</h1></div>"), "Title");
    }

    #[test]
    fn removes_event_handlers() {
        let output = sanitize_html(r#"<strong onclick="alert(1)">x</strong><img src=x onerror=alert(1)>"#);
        assert_eq!(output, "<strong>x</strong>");
    }

    #[test]
    fn rejects_dangerous_link_schemes() {
        let output = sanitize_html(r#"<a href="javascript:alert(1)">link</a>"#);
        assert!(!output.contains("javascript"));
        assert!(output.contains("link"));

        let output = sanitize_html(r#"<a href="data:text/html;base64,PHNjcmlwdD4=">x</a>"#);
        assert!(!output.contains("data:"));
    }

    #[test]
    fn keeps_http_and_mailto_links_with_allowed_attributes() {
        let output = sanitize_html(
            r#"<a href="https://example.com" title="Site" target="_blank" rel="opener" class="btn">go</a>"#,
        );
        assert!(output.contains(r#"href="https://example.com""#));
        assert!(output.contains(r#"title="Site""#));
        assert!(output.contains(r#"target="_blank""#));
        assert!(!output.contains("rel="));
        assert!(!output.contains("class="));

        let output = sanitize_html(r#"<a href="mailto:contact@example.com">mail</a>"#);
        assert!(output.contains("mailto:contact@example.com"));
    }

    #[test]
    fn span_keeps_only_safe_style() {
        let output = sanitize_html(
            r#"<span style="color: red; position: fixed" data-x="1" class="c">t</span>"#,
        );
        assert!(output.starts_with("<span"));
        assert!(output.contains("color"));
        assert!(!output.contains("position"));
        assert!(!output.contains("data-x"));
        assert!(!output.contains("class"));
    }

    #[test]
    fn style_not_allowed_outside_span() {
        let output = sanitize_html(r#"<p style="color: red">x</p>"#);
        assert_eq!(output, "<p>x</p>");
    }

    #[test]
    fn extract_text_strips_all_tags() {
        assert_eq!(extract_text("<strong>Marie <em>Dubois</em></strong>"), "Marie Dubois");
        assert_eq!(extract_text("  <p> spaced </p>  "), "spaced");
    }

    #[test]
    fn extract_text_does_not_trust_its_input() {
        assert_eq!(extract_text("<script>alert(1)</script>hi"), "hi");
        assert_eq!(extract_text("<b>a &lt; b</b>"), "a &lt; b");
    }

    #[test]
    fn filter_names() {
        assert_eq!(FragmentHtmlFilter.name(), "fragment_html");
        assert_eq!(PlainTextFilter.name(), "plain_text");
    }
}
