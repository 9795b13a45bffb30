//! CSS selector validation for editable regions.
//!
//! Selectors are stored as part of a fragment's key and used client-side as
//! DOM queries, so anything outside a conservative character set is refused.

/// Longest accepted selector, in characters.
pub const MAX_SELECTOR_LEN: usize = 200;

/// Punctuation allowed in a selector besides letters, digits and whitespace.
const SELECTOR_PUNCTUATION: &[char] = &[
    '-', '_', '#', '.', '[', ']', '(', ')', ':', ',', '>', '+', '~', '"', '\'', '=', '^', '$', '*',
    '|',
];

fn is_selector_char(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || SELECTOR_PUNCTUATION.contains(&c)
}

/// Check whether `selector` is an acceptable element selector.
///
/// Rejects empty and whitespace-only input, anything longer than
/// [`MAX_SELECTOR_LEN`], and any character outside the allowed set (angle
/// brackets, braces, slashes, semicolons, quotes other than `"` and `'`).
pub fn validate_selector(selector: &str) -> bool {
    if selector.trim().is_empty() {
        return false;
    }

    if selector.chars().count() > MAX_SELECTOR_LEN {
        return false;
    }

    selector.chars().all(is_selector_char)
}
