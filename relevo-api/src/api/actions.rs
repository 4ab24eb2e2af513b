//! Action plan endpoints
//!
//! Updates write one audit entry per changed field; audit failures are
//! logged and never block the update itself. A progress update may carry a
//! base64 evidence file, stored through the object store.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use relevo_common::db::models::ActionPlan;
use serde::Deserialize;
use tracing::info;

use crate::api::auth::CurrentUser;
use crate::api::evidence::{store_evidence, EvidencePayload};
use crate::db::actions::{self, ActionChanges, NewAction};
use crate::error::ApiResult;
use crate::services::audit;
use crate::AppState;

/// GET /api/sucesion/:id/acciones
pub async fn list_actions(
    State(state): State<AppState>,
    Path(succession_id): Path<String>,
) -> ApiResult<Json<Vec<ActionPlan>>> {
    Ok(Json(actions::list_by_succession(&state.db, &succession_id).await?))
}

/// POST /api/sucesion/:id/acciones
pub async fn create_action(
    State(state): State<AppState>,
    Path(succession_id): Path<String>,
    Json(new_action): Json<NewAction>,
) -> ApiResult<Json<ActionPlan>> {
    Ok(Json(actions::create_action(&state.db, &succession_id, &new_action).await?))
}

/// Write one audit entry per changed field (best-effort)
async fn audit_changes(state: &AppState, before: &ActionPlan, after: &ActionPlan, changed_by: &str) {
    let fields: [(&str, &str, &str); 4] = [
        ("descripcion", &before.descripcion, &after.descripcion),
        ("responsable", &before.responsable, &after.responsable),
        ("estado", &before.estado, &after.estado),
        (
            "fecha_objetivo",
            before.fecha_objetivo.as_deref().unwrap_or(""),
            after.fecha_objetivo.as_deref().unwrap_or(""),
        ),
    ];
    for (field, old_value, new_value) in fields {
        if old_value != new_value {
            audit::record_change(
                &state.db,
                &after.id,
                field,
                Some(old_value),
                Some(new_value),
                changed_by,
            )
            .await;
        }
    }
    if before.progreso != after.progreso {
        audit::record_change(
            &state.db,
            &after.id,
            "progreso",
            Some(&before.progreso.to_string()),
            Some(&after.progreso.to_string()),
            changed_by,
        )
        .await;
    }
}

/// PUT /api/acciones/:id
pub async fn update_action(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(changes): Json<ActionChanges>,
) -> ApiResult<Json<ActionPlan>> {
    let (before, after) = actions::update_action(&state.db, &id, &changes).await?;
    audit_changes(&state, &before, &after, &current_user.username).await;

    // Completion is worth telling the responsible about; best-effort
    if before.estado != after.estado && after.estado == "Completado" && !after.responsable.is_empty()
    {
        state
            .notifier
            .notify(
                &after.responsable,
                "Plan de accion completado",
                &format!("El plan de accion \"{}\" fue completado.", after.descripcion),
            )
            .await;
    }

    Ok(Json(after))
}

#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    /// 0..=100
    pub progreso: i64,
    pub estado: Option<String>,
    /// Optional evidence file attached to this progress update
    pub evidencia: Option<EvidencePayload>,
}

/// POST /api/acciones/:id/progreso
pub async fn update_progress(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(update): Json<ProgressUpdate>,
) -> ApiResult<Json<ActionPlan>> {
    let changes = ActionChanges {
        progreso: Some(update.progreso),
        estado: update.estado.clone(),
        ..Default::default()
    };
    let (before, after) = actions::update_action(&state.db, &id, &changes).await?;
    audit_changes(&state, &before, &after, &current_user.username).await;

    if let Some(payload) = &update.evidencia {
        let evidence = store_evidence(&state, &after, payload, &current_user.username).await?;
        info!(
            "Evidence {} attached to action plan {} ({}% progress)",
            evidence.filename, after.id, after.progreso
        );
    }

    Ok(Json(after))
}
