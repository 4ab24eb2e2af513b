//! Audit trail endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use relevo_common::db::models::AuditEntry;

use crate::db::audit;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/acciones/:id/auditoria
///
/// Field-level change history for one action plan, newest first.
pub async fn list_audit_entries(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    Ok(Json(audit::list_for_action(&state.db, &id).await?))
}
