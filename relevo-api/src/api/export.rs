//! CSV export endpoints
//!
//! Downloads are audit-logged best-effort: a failed audit write never
//! blocks the download itself.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension,
};

use crate::api::auth::CurrentUser;
use crate::db::{plans, succession};
use crate::error::ApiResult;
use crate::services::{audit, csv_export};
use crate::AppState;

fn csv_response(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /api/export/planes.csv
pub async fn export_plans_csv(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<Response> {
    let plans = plans::list_plans(&state.db).await?;
    let body = csv_export::plans_to_csv(&plans)?;

    audit::record_download(&state.db, "planes.csv", &current_user.username).await;
    Ok(csv_response("planes.csv", body))
}

/// GET /api/export/sucesion.csv
pub async fn export_succession_csv(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<Response> {
    let records = succession::list_records(&state.db).await?;
    let body = csv_export::succession_to_csv(&records)?;

    audit::record_download(&state.db, "sucesion.csv", &current_user.username).await;
    Ok(csv_response("sucesion.csv", body))
}
