//! Batch operations with per-item error reporting.
//!
//! Items are processed sequentially in request order. A failing item is
//! recorded with its index and never stops the items after it; each
//! successful item is persisted on its own, so a batch is not atomic.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use super::ContentError;
use super::service::{EditableContentService, FragmentInput, FragmentKey};
use crate::models::EditableFragment;

/// Largest accepted batch.
pub const MAX_BATCH_SIZE: usize = 20;

/// One failed item of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemError {
    /// 0-based position in the request.
    pub index: usize,
    pub error: String,
    /// The offending item, echoed back as received.
    pub item: Value,
}

/// Aggregate outcome of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every item succeeded.
    Complete,
    /// Some items succeeded, some failed.
    Partial,
    /// No item succeeded.
    Failed,
}

/// Successes and per-item failures of a batch.
#[derive(Debug)]
pub struct BulkOutcome {
    pub succeeded: Vec<EditableFragment>,
    pub errors: Vec<BatchItemError>,
}

impl BulkOutcome {
    fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn record(
        &mut self,
        index: usize,
        item: &Value,
        result: Result<EditableFragment, ContentError>,
    ) {
        match result {
            Ok(fragment) => self.succeeded.push(fragment),
            Err(e) => {
                warn!(index, error = %e, "batch item failed");
                self.errors.push(BatchItemError {
                    index,
                    error: e.to_string(),
                    item: item.clone(),
                });
            }
        }
    }

    pub fn status(&self) -> BatchStatus {
        match (self.succeeded.is_empty(), self.errors.is_empty()) {
            (_, true) => BatchStatus::Complete,
            (true, false) => BatchStatus::Failed,
            (false, false) => BatchStatus::Partial,
        }
    }
}

/// Reject the whole batch when it is empty or too large.
fn check_batch_size(items: &[Value]) -> Result<(), ContentError> {
    if items.is_empty() || items.len() > MAX_BATCH_SIZE {
        return Err(ContentError::BatchSize);
    }
    Ok(())
}

fn parse_item<T: DeserializeOwned>(item: &Value) -> Result<T, ContentError> {
    if !item.is_object() {
        return Err(ContentError::InvalidElement("expected an object".to_string()));
    }
    serde_json::from_value(item.clone()).map_err(|e| ContentError::InvalidElement(e.to_string()))
}

impl EditableContentService {
    /// Upsert every item of `items`, collecting per-item failures.
    ///
    /// Returns [`ContentError::BatchSize`] without touching the store when the
    /// batch is empty or larger than [`MAX_BATCH_SIZE`].
    pub async fn bulk_upsert(&self, items: &[Value]) -> Result<BulkOutcome, ContentError> {
        check_batch_size(items)?;

        let mut outcome = BulkOutcome::new();
        for (index, item) in items.iter().enumerate() {
            let result = match parse_item::<FragmentInput>(item) {
                Ok(input) => self.upsert(&input).await.map(|o| o.fragment),
                Err(e) => Err(e),
            };
            outcome.record(index, item, result);
        }

        info!(
            total = items.len(),
            updated = outcome.succeeded.len(),
            errors = outcome.errors.len(),
            "bulk update processed"
        );
        Ok(outcome)
    }

    /// Delete every item of `items`, collecting per-item failures.
    ///
    /// An absent fragment is a per-item error.
    pub async fn bulk_delete(&self, items: &[Value]) -> Result<BulkOutcome, ContentError> {
        check_batch_size(items)?;

        let mut outcome = BulkOutcome::new();
        for (index, item) in items.iter().enumerate() {
            let result = match parse_item::<FragmentKey>(item) {
                Ok(key) => self.delete(&key).await,
                Err(e) => Err(e),
            };
            outcome.record(index, item, result);
        }

        info!(
            total = items.len(),
            deleted = outcome.succeeded.len(),
            errors = outcome.errors.len(),
            "bulk delete processed"
        );
        Ok(outcome)
    }
}
