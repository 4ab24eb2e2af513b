//! Evidence upload and listing
//!
//! Files arrive base64-encoded in the JSON body (no streaming; uploads are
//! small office documents) and land in the object store under
//! `evidencias/<planId>/<timestamp>-<random>-<filename>`.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use base64::Engine;
use relevo_common::db::models::{ActionPlan, Evidence};
use serde::Deserialize;

use crate::api::auth::CurrentUser;
use crate::db::{actions, evidence, succession};
use crate::error::{ApiError, ApiResult};
use crate::services::storage::{content_type_for, evidence_key};
use crate::AppState;

/// Base64-encoded evidence file
#[derive(Debug, Deserialize)]
pub struct EvidencePayload {
    pub filename: String,
    pub content_base64: String,
}

/// Decode, store and register one evidence file for an action plan
pub async fn store_evidence(
    state: &AppState,
    action: &ActionPlan,
    payload: &EvidencePayload,
    uploaded_by: &str,
) -> ApiResult<Evidence> {
    if payload.filename.trim().is_empty() {
        return Err(ApiError::BadRequest("El campo filename es obligatorio".to_string()));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.content_base64.as_bytes())
        .map_err(|e| ApiError::BadRequest(format!("Contenido base64 invalido: {}", e)))?;

    // The storage key is scoped by the plan behind this action's record
    let record = succession::get_record(&state.db, &action.succession_id).await?;
    let key = evidence_key(&record.plan_id, &payload.filename);
    let content_type = content_type_for(&payload.filename);
    let url = state.storage.put(&key, &bytes)?;

    let evidence = evidence::insert_evidence(
        &state.db,
        &action.id,
        &payload.filename,
        &key,
        &url,
        content_type,
        bytes.len() as i64,
        uploaded_by,
    )
    .await?;
    Ok(evidence)
}

/// POST /api/acciones/:id/evidencias
pub async fn upload_evidence(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<EvidencePayload>,
) -> ApiResult<Json<Evidence>> {
    let action = actions::get_action(&state.db, &id).await?;
    let evidence = store_evidence(&state, &action, &payload, &current_user.username).await?;
    Ok(Json(evidence))
}

/// GET /api/acciones/:id/evidencias
pub async fn list_evidence(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Evidence>>> {
    Ok(Json(evidence::list_for_action(&state.db, &id).await?))
}
