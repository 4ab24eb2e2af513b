//! Employee endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use relevo_common::db::models::Employee;
use serde_json::{json, Value};

use crate::db::employees::{self, EmployeeChanges, NewEmployee};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/empleados
pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<Employee>>> {
    Ok(Json(employees::list_employees(&state.db).await?))
}

/// GET /api/empleados/:id
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(employees::get_employee(&state.db, &id).await?))
}

/// POST /api/empleados
pub async fn create_employee(
    State(state): State<AppState>,
    Json(new_employee): Json<NewEmployee>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(employees::create_employee(&state.db, &new_employee).await?))
}

/// PUT /api/empleados/:id
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<EmployeeChanges>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(employees::update_employee(&state.db, &id, &changes).await?))
}

/// DELETE /api/empleados/:id (soft delete)
pub async fn deactivate_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    employees::deactivate_employee(&state.db, &id).await?;
    Ok(Json(json!({ "ok": true })))
}
