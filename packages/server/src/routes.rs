//! Edit-intake HTTP API.
//!
//! Request order is fixed: origin check, payload validation (every failure
//! reported in one response), record creation, then the configured applier.
//! The record is saved before any apply attempt; if the store is down the
//! request fails outright.

use crate::applier::EditApplier;
use crate::cors::{cors_layer, OriginMatcher};
use crate::error::ApiError;
use axum::extract::{Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use copydesk_store::{
    EditRecord, EditStatus, EditStore, EditTarget, EditTargetKind, ListFilter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub struct AppState {
    pub store: Arc<dyn EditStore>,
    pub applier: Arc<dyn EditApplier>,
    pub origins: OriginMatcher,
}

pub type SharedState = Arc<AppState>;

pub fn build_router(state: SharedState) -> Router {
    let matcher = state.origins.clone();
    Router::new()
        .route("/api/edits/text", post(submit_text_edit))
        .route("/api/edits/metadata", post(submit_metadata_edits))
        .route("/api/edits", get(list_edits))
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(state.clone(), enforce_origin))
        .layer(cors_layer(matcher))
        .with_state(state)
}

/// Cross-origin requests from unlisted origins are refused with 403, not
/// just left without CORS headers. No `Origin` header always passes.
async fn enforce_origin(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let origin = origin.to_str().unwrap_or_default();
        if !state.origins.allows(origin) {
            tracing::warn!(origin, "rejected cross-origin request");
            return Err(ApiError::OriginNotAllowed(origin.to_string()));
        }
    }
    Ok(next.run(request).await)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================================
// Text edits
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEditRequest {
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub new_text: String,
    #[serde(default)]
    pub edit_id: Option<String>,
    #[serde(default)]
    pub component_id: Option<String>,
    #[serde(default)]
    pub element_tag: Option<String>,
    #[serde(default)]
    pub page_key: Option<String>,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub contains_html_links: bool,
    #[serde(default)]
    pub link_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEditResponse {
    pub success: bool,
    pub edit_id: Uuid,
    pub message: String,
    pub is_production: bool,
}

async fn submit_text_edit(
    State(state): State<SharedState>,
    Json(request): Json<TextEditRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    if request.original_text.trim().is_empty() {
        errors.push("originalText must not be empty".to_string());
    }
    if request.new_text.trim().is_empty() {
        errors.push("newText must not be empty".to_string());
    }
    if request.edit_id.is_none() && request.component_id.is_none() {
        errors.push("one of editId or componentId is required".to_string());
    }
    if request.page_url.trim().is_empty() {
        errors.push("pageUrl must not be empty".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let page_key = request
        .page_key
        .clone()
        .unwrap_or_else(|| page_key_from_url(&request.page_url));

    let mut record = EditRecord::new(
        EditTarget {
            kind: EditTargetKind::Text,
            page_key,
            component_id: request.component_id.clone(),
            edit_id: request.edit_id.clone(),
            field_path: None,
            instance: None,
            element_tag: request.element_tag.clone(),
        },
        request.original_text.clone(),
        request.new_text.clone(),
        request.page_url.clone(),
    );
    if request.contains_html_links {
        record.metadata = serde_json::json!({
            "containsHtmlLinks": true,
            "linkMetadata": request.link_metadata,
        });
    }

    state.store.save(&record)?;
    let outcome = state.applier.apply(state.store.as_ref(), &record)?;

    Ok(edit_outcome_response(&outcome, state.applier.is_production()))
}

fn edit_outcome_response(record: &EditRecord, is_production: bool) -> Response {
    let (status, success, message) = match record.status {
        EditStatus::Applied => (StatusCode::OK, true, "Edit applied".to_string()),
        EditStatus::Pending => (
            StatusCode::OK,
            true,
            "Edit recorded; it will be applied in the next publish".to_string(),
        ),
        EditStatus::Failed => (
            StatusCode::UNPROCESSABLE_ENTITY,
            false,
            record.metadata["error"]
                .as_str()
                .unwrap_or("edit failed")
                .to_string(),
        ),
        EditStatus::Processing => (
            StatusCode::INTERNAL_SERVER_ERROR,
            false,
            "edit stuck in processing".to_string(),
        ),
    };
    (
        status,
        Json(TextEditResponse {
            success,
            edit_id: record.id,
            message,
            is_production,
        }),
    )
        .into_response()
}

/// Page key from a page URL path: `/` is `home`, otherwise the trimmed path
fn page_key_from_url(page_url: &str) -> String {
    let after_scheme = page_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(page_url);
    let path = after_scheme
        .split_once('/')
        .map(|(_, path)| path)
        .unwrap_or("");
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "home".to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// Metadata and structured-data edits
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEditBatch {
    #[serde(default)]
    pub page_key: String,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub metadata_edits: Vec<FieldEditRequest>,
    #[serde(default)]
    pub structured_data_edits: Vec<StructuredEditRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldEditRequest {
    #[serde(default)]
    pub field_path: String,
    #[serde(default)]
    pub original_value: String,
    #[serde(default)]
    pub new_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredEditRequest {
    #[serde(default)]
    pub component_id: String,
    #[serde(default)]
    pub instance: Option<usize>,
    #[serde(default)]
    pub field_path: String,
    #[serde(default)]
    pub original_value: String,
    #[serde(default)]
    pub new_value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub edit_id: Uuid,
    pub status: EditStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEditResponse {
    pub success: bool,
    pub is_production: bool,
    pub metadata: Vec<EditOutcome>,
    pub structured_data: Vec<EditOutcome>,
}

async fn submit_metadata_edits(
    State(state): State<SharedState>,
    Json(batch): Json<MetadataEditBatch>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    if batch.page_key.trim().is_empty() {
        errors.push("pageKey must not be empty".to_string());
    }
    if batch.page_url.trim().is_empty() {
        errors.push("pageUrl must not be empty".to_string());
    }
    if batch.metadata_edits.is_empty() && batch.structured_data_edits.is_empty() {
        errors.push("at least one edit is required".to_string());
    }
    for (i, edit) in batch.metadata_edits.iter().enumerate() {
        if edit.field_path.trim().is_empty() {
            errors.push(format!("metadataEdits[{}].fieldPath must not be empty", i));
        }
        if edit.original_value.trim().is_empty() {
            errors.push(format!(
                "metadataEdits[{}].originalValue must not be empty",
                i
            ));
        }
        if edit.new_value.trim().is_empty() {
            errors.push(format!("metadataEdits[{}].newValue must not be empty", i));
        }
    }
    for (i, edit) in batch.structured_data_edits.iter().enumerate() {
        if edit.component_id.trim().is_empty() {
            errors.push(format!(
                "structuredDataEdits[{}].componentId must not be empty",
                i
            ));
        }
        if edit.field_path.trim().is_empty() {
            errors.push(format!(
                "structuredDataEdits[{}].fieldPath must not be empty",
                i
            ));
        }
        if edit.original_value.trim().is_empty() {
            errors.push(format!(
                "structuredDataEdits[{}].originalValue must not be empty",
                i
            ));
        }
        if edit.new_value.trim().is_empty() {
            errors.push(format!(
                "structuredDataEdits[{}].newValue must not be empty",
                i
            ));
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let mut metadata_outcomes = Vec::new();
    for edit in &batch.metadata_edits {
        // the exported object is always named `metadata` on the wire
        let target = EditTarget {
            kind: EditTargetKind::MetadataField,
            page_key: batch.page_key.clone(),
            component_id: None,
            edit_id: None,
            field_path: Some(format!("metadata.{}", edit.field_path)),
            instance: None,
            element_tag: None,
        };
        metadata_outcomes.push(run_one(
            &state,
            target,
            &edit.original_value,
            &edit.new_value,
            &batch.page_url,
        )?);
    }

    let mut structured_outcomes = Vec::new();
    for edit in &batch.structured_data_edits {
        let target = EditTarget {
            kind: EditTargetKind::StructuredDataField,
            page_key: batch.page_key.clone(),
            component_id: Some(edit.component_id.clone()),
            edit_id: None,
            field_path: Some(edit.field_path.clone()),
            instance: edit.instance,
            element_tag: None,
        };
        structured_outcomes.push(run_one(
            &state,
            target,
            &edit.original_value,
            &edit.new_value,
            &batch.page_url,
        )?);
    }

    let any_failed = metadata_outcomes
        .iter()
        .chain(structured_outcomes.iter())
        .any(|o| o.status == EditStatus::Failed);
    let status = if any_failed {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(MetadataEditResponse {
            success: !any_failed,
            is_production: state.applier.is_production(),
            metadata: metadata_outcomes,
            structured_data: structured_outcomes,
        }),
    ))
}

/// One record through save plus apply; only store failures abort the batch
fn run_one(
    state: &AppState,
    target: EditTarget,
    original_value: &str,
    new_value: &str,
    page_url: &str,
) -> Result<EditOutcome, ApiError> {
    let record = EditRecord::new(target, original_value, new_value, page_url);
    state.store.save(&record)?;
    let outcome = state.applier.apply(state.store.as_ref(), &record)?;
    Ok(EditOutcome {
        edit_id: outcome.id,
        status: outcome.status,
        error: outcome.metadata["error"].as_str().map(str::to_string),
    })
}

// ============================================================================
// Audit view
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page_key: Option<String>,
}

async fn list_edits(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match &query.status {
        Some(raw) => Some(EditStatus::parse(raw).ok_or_else(|| {
            ApiError::Validation(vec![format!("unknown status: {}", raw)])
        })?),
        None => None,
    };
    let filter = ListFilter {
        status,
        page_key: query.page_key.clone(),
    };
    let records = state.store.list(&filter)?;
    Ok(Json(serde_json::json!({ "edits": records })))
}
