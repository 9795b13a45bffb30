//! Editable-content routes.
//!
//! Reads are public. Mutations require a bearer token and are rate limited
//! per caller.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::content::{BatchItemError, BatchStatus, BulkOutcome, FragmentInput, FragmentKey};
use crate::error::{AppError, AppResult};
use crate::middleware::{BearerAuth, ClientId};
use crate::models::{EditableFragment, UpsertStatus};
use crate::routes::helpers::{enforce_rate_limit, json_body};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub page_name: String,
    pub elements: Vec<EditableFragment>,
    pub total_elements: usize,
}

#[derive(Debug, Serialize)]
pub struct ElementResponse {
    pub message: String,
    pub element: EditableFragment,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub deleted_element: EditableFragment,
}

/// Body of both bulk endpoints. Items stay untyped so one malformed item
/// becomes a per-item error instead of failing the whole request.
#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub elements: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResponse {
    pub message: String,
    pub updated_elements: Vec<EditableFragment>,
    pub total_updated: usize,
    pub errors: Vec<BatchItemError>,
    pub total_errors: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted_elements: Vec<EditableFragment>,
    pub total_deleted: usize,
    pub errors: Vec<BatchItemError>,
    pub total_errors: usize,
}

/// HTTP status for an aggregate batch outcome.
pub fn batch_status_code(status: BatchStatus) -> StatusCode {
    match status {
        BatchStatus::Complete => StatusCode::OK,
        BatchStatus::Partial => StatusCode::MULTI_STATUS,
        BatchStatus::Failed => StatusCode::BAD_REQUEST,
    }
}

/// GET /editable-content/{page_name}: All fragments of a page.
async fn get_page(
    State(state): State<AppState>,
    Path(page_name): Path<String>,
) -> AppResult<Json<PageResponse>> {
    let elements = state.content().page(&page_name).await?;

    // Zero fragments reads as "page not found".
    if elements.is_empty() {
        return Err(AppError::NotFound(format!(
            "no editable content found for page '{page_name}'"
        )));
    }

    Ok(Json(PageResponse {
        page_name,
        total_elements: elements.len(),
        elements,
    }))
}

/// PATCH /editable-content/element: Create or update one fragment.
async fn update_element(
    State(state): State<AppState>,
    auth: BearerAuth,
    client: ClientId,
    payload: Result<Json<FragmentInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ElementResponse>)> {
    enforce_rate_limit(&state, &client)?;
    let input = json_body(payload)?;

    let outcome = state.content().upsert(&input).await?;
    debug!(user_id = %auth.user_id, status = ?outcome.status, "element saved via API");

    let (status, message) = match outcome.status {
        UpsertStatus::Created => (StatusCode::CREATED, "Element created"),
        UpsertStatus::Updated => (StatusCode::OK, "Element updated"),
    };

    Ok((
        status,
        Json(ElementResponse {
            message: message.to_string(),
            element: outcome.fragment,
        }),
    ))
}

/// POST /editable-content/bulk-update: Upsert up to 20 fragments.
async fn bulk_update(
    State(state): State<AppState>,
    auth: BearerAuth,
    client: ClientId,
    payload: Result<Json<BulkRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BulkUpdateResponse>)> {
    enforce_rate_limit(&state, &client)?;
    let request = json_body(payload)?;
    let items = request.elements.unwrap_or_default();

    let outcome = state.content().bulk_upsert(&items).await?;
    debug!(user_id = %auth.user_id, "bulk update via API");

    let status = outcome.status();
    let message = match status {
        BatchStatus::Complete => "All elements updated",
        BatchStatus::Partial => "Some elements could not be updated",
        BatchStatus::Failed => "No element could be updated",
    };
    let BulkOutcome { succeeded, errors } = outcome;

    Ok((
        batch_status_code(status),
        Json(BulkUpdateResponse {
            message: message.to_string(),
            total_updated: succeeded.len(),
            updated_elements: succeeded,
            total_errors: errors.len(),
            errors,
        }),
    ))
}

/// DELETE /editable-content/element: Delete one fragment.
async fn delete_element(
    State(state): State<AppState>,
    auth: BearerAuth,
    client: ClientId,
    payload: Result<Json<FragmentKey>, JsonRejection>,
) -> AppResult<Json<DeleteResponse>> {
    enforce_rate_limit(&state, &client)?;
    let key = json_body(payload)?;

    let removed = state.content().delete(&key).await?;
    debug!(user_id = %auth.user_id, "element deleted via API");

    Ok(Json(DeleteResponse {
        message: "Element deleted".to_string(),
        deleted_element: removed,
    }))
}

/// DELETE /editable-content/bulk-delete: Delete up to 20 fragments.
async fn bulk_delete(
    State(state): State<AppState>,
    auth: BearerAuth,
    client: ClientId,
    payload: Result<Json<BulkRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BulkDeleteResponse>)> {
    enforce_rate_limit(&state, &client)?;
    let request = json_body(payload)?;
    let items = request.elements.unwrap_or_default();

    let outcome = state.content().bulk_delete(&items).await?;
    debug!(user_id = %auth.user_id, "bulk delete via API");

    let status = outcome.status();
    let message = match status {
        BatchStatus::Complete => "All elements deleted",
        BatchStatus::Partial => "Some elements could not be deleted",
        BatchStatus::Failed => "No element could be deleted",
    };
    let BulkOutcome { succeeded, errors } = outcome;

    Ok((
        batch_status_code(status),
        Json(BulkDeleteResponse {
            message: message.to_string(),
            total_deleted: succeeded.len(),
            deleted_elements: succeeded,
            total_errors: errors.len(),
            errors,
        }),
    ))
}

/// Create the editable-content router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/editable-content/bulk-update", post(bulk_update))
        .route("/editable-content/bulk-delete", delete(bulk_delete))
        .route(
            "/editable-content/element",
            patch(update_element).delete(delete_element),
        )
        .route("/editable-content/{page_name}", get(get_page))
}
