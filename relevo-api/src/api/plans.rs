//! Substitution plan endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use relevo_common::db::models::SubstitutionPlan;
use serde_json::{json, Value};

use crate::db::plans::{self, NewPlan, PlanChanges};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/planes
pub async fn list_plans(State(state): State<AppState>) -> ApiResult<Json<Vec<SubstitutionPlan>>> {
    Ok(Json(plans::list_plans(&state.db).await?))
}

/// GET /api/planes/:id
pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SubstitutionPlan>> {
    Ok(Json(plans::get_plan(&state.db, &id).await?))
}

/// POST /api/planes
///
/// Creates the plan with derived risk fields; a key position gets its
/// succession record in the same request. Duplicate colaborador answers
/// 409 naming the colaborador.
pub async fn create_plan(
    State(state): State<AppState>,
    Json(new_plan): Json<NewPlan>,
) -> ApiResult<Json<SubstitutionPlan>> {
    Ok(Json(plans::create_plan(&state.db, &new_plan).await?))
}

/// PUT /api/planes/:id
pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<PlanChanges>,
) -> ApiResult<Json<SubstitutionPlan>> {
    Ok(Json(plans::update_plan(&state.db, &id, &changes).await?))
}

/// DELETE /api/planes/:id
pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    plans::delete_plan(&state.db, &id).await?;
    Ok(Json(json!({ "ok": true })))
}
