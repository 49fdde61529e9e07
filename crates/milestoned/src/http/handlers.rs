//! Request handlers for the milestone API.
//!
//! Response bodies follow the contract the service's clients already speak:
//! `{message, milestone, imageUrls}` on create, `{error, requestedId, dbIds}`
//! on a delete miss, `{error, details}` on unexpected failures.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::{error, info};

use super::AppState;
use crate::error::Result;
use crate::milestone::{Milestone, MilestoneDraft};
use crate::store::RemoveOutcome;

/// Form field carrying uploaded image files. The HTML-array spelling
/// `images[]` is accepted as the same field.
const IMAGE_FIELD: &str = "images";

/// Form field that may carry JSON-encoded milestone metadata.
const EVENT_FIELD: &str = "event";

/// Infer the externally visible `scheme://host` prefix for this request.
///
/// Honors `x-forwarded-proto` for reverse-proxy deployments; the fallback is
/// the connection protocol, which this server only ever speaks as plain HTTP.
pub(crate) fn base_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

/// `GET /milestones` — the full collection, empty store included.
pub async fn list_milestones(State(state): State<AppState>) -> Json<Vec<Milestone>> {
    let records = state.records.lock().await;
    Json(records.load())
}

/// `POST /milestones` — create a milestone from a multipart payload.
pub async fn create_milestone(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    match create_inner(&state, &headers, multipart).await {
        Ok((milestone, image_urls)) => {
            info!("created milestone with id {}", milestone.id);
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Milestone created successfully",
                    "milestone": milestone,
                    "imageUrls": image_urls,
                })),
            )
                .into_response()
        }
        Err(err) => {
            error!("milestone creation failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "details": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// Drain the multipart payload, store the files, and persist the record.
///
/// Files already written to the File Store are not rolled back when a later
/// step fails.
async fn create_inner(
    state: &AppState,
    headers: &HeaderMap,
    mut multipart: Multipart,
) -> Result<(Milestone, Vec<String>)> {
    let base = base_url(headers);

    let mut event_json: Option<String> = None;
    let mut form_fields = Map::new();
    let mut image_urls = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() && (name == IMAGE_FIELD || name == "images[]") {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            let stored = state.files.accept(&original_name, &bytes)?;
            image_urls.push(state.files.url_for(&base, &stored));
        } else if name == EVENT_FIELD {
            event_json = Some(field.text().await?);
        } else {
            form_fields.insert(name, Value::String(field.text().await?));
        }
    }

    // Malformed event JSON falls back to the flattened form fields; the
    // failure is never surfaced to the caller.
    let draft = match event_json {
        Some(raw) => serde_json::from_str::<MilestoneDraft>(&raw)
            .unwrap_or_else(|_| MilestoneDraft::from_fields(form_fields)),
        None => MilestoneDraft::from_fields(form_fields),
    };

    let milestone = Milestone::from_draft(draft, image_urls.clone());

    let records = state.records.lock().await;
    records.append(milestone.clone())?;

    Ok((milestone, image_urls))
}

/// `DELETE /milestones/:id` — remove every record matching the id.
///
/// A duplicated client-supplied id is therefore deleted wholesale. A miss
/// answers 404 and echoes the known ids so callers can debug mismatches.
pub async fn delete_milestone(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("delete requested for milestone id {id}");

    let records = state.records.lock().await;
    match records.remove(&id) {
        Ok(RemoveOutcome::Removed { remaining }) => {
            info!("deleted milestone {id}; {remaining} records remain");
            Json(json!({ "message": "Deleted successfully" })).into_response()
        }
        Ok(RemoveOutcome::NotFound { known_ids }) => {
            info!("milestone {id} not found among {} records", known_ids.len());
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "Milestone not found",
                    "requestedId": id,
                    "dbIds": known_ids,
                })),
            )
                .into_response()
        }
        Err(err) => {
            error!("milestone deletion failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}
