//! Succession record endpoints, including the repair operations

use axum::{
    extract::{Path, State},
    Json,
};
use relevo_common::db::models::SuccessionRecord;
use relevo_common::db::succession_sync::{
    check_integrity, clean_orphaned_records, sync_missing_plans, IntegrityReport,
};
use serde::Serialize;

use crate::db::succession;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/sucesion
pub async fn list_records(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SuccessionRecord>>> {
    Ok(Json(succession::list_records(&state.db).await?))
}

/// GET /api/sucesion/:id
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessionRecord>> {
    Ok(Json(succession::get_record(&state.db, &id).await?))
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    /// Records created for key plans that were missing one
    pub sincronizados: u32,
}

/// POST /api/sucesion/sync
///
/// Creates succession records for key-position plans missing one.
/// Idempotent; a second call reports 0.
pub async fn sync_missing(State(state): State<AppState>) -> ApiResult<Json<SyncResponse>> {
    let sincronizados = sync_missing_plans(&state.db).await?;
    Ok(Json(SyncResponse { sincronizados }))
}

#[derive(Debug, Serialize)]
pub struct CleanResponse {
    /// Orphaned records removed
    pub eliminados: u32,
}

/// POST /api/sucesion/limpiar
pub async fn clean_orphans(State(state): State<AppState>) -> ApiResult<Json<CleanResponse>> {
    let eliminados = clean_orphaned_records(&state.db).await?;
    Ok(Json(CleanResponse { eliminados }))
}

/// GET /api/sucesion/integridad
///
/// Read-only consistency counts; never fails, a broken database reports
/// zeros so the dashboard keeps rendering.
pub async fn integrity(State(state): State<AppState>) -> Json<IntegrityReport> {
    Json(check_integrity(&state.db).await)
}
