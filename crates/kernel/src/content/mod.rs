//! Editable-content pipeline.
//!
//! Validates selectors, sanitizes HTML, derives plain text, and upserts
//! fragments one at a time or in batches with per-item error reporting.

pub mod bulk;
pub mod filter;
pub mod selector;
pub mod service;

use thiserror::Error;

pub use bulk::{BatchItemError, BatchStatus, BulkOutcome, MAX_BATCH_SIZE};
pub use filter::{extract_text, sanitize_html};
pub use selector::validate_selector;
pub use service::{EditableContentService, FragmentInput, FragmentKey, UpsertOutcome};

/// Errors raised by the editable-content pipeline.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid CSS selector")]
    InvalidSelector,

    #[error("content was entirely removed by HTML sanitization")]
    ContentRejected,

    #[error("element not found")]
    NotFound,

    #[error("invalid element: {0}")]
    InvalidElement(String),

    #[error("elements must contain between 1 and {max} items", max = MAX_BATCH_SIZE)]
    BatchSize,

    #[error("storage error: {0}")]
    Store(#[source] anyhow::Error),
}
