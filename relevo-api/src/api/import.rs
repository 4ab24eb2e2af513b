//! Batch plan import
//!
//! The client parses the spreadsheet; this endpoint receives the rows and
//! applies them one by one. The batch never aborts on a bad row: every row
//! ends up counted as imported, duplicated or errored, with per-row detail
//! messages for the dashboard to display.

use axum::{extract::State, Json};
use relevo_common::Error;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::plans::{self, NewPlan};
use crate::error::ApiResult;
use crate::AppState;

/// One spreadsheet row
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRow {
    #[serde(default)]
    pub colaborador: String,
    #[serde(default)]
    pub puesto: String,
    #[serde(default)]
    pub departamento: String,
    #[serde(default)]
    pub reemplazo: String,
    #[serde(default)]
    pub puesto_clave: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub filas: Vec<ImportRow>,
}

/// Per-batch outcome counts
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub importados: u32,
    pub duplicados: u32,
    pub errores: u32,
    /// One message per duplicated or errored row
    pub detalles: Vec<String>,
}

/// POST /api/import/planes
pub async fn import_plans(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<Json<ImportSummary>> {
    let mut summary = ImportSummary::default();

    for (index, row) in request.filas.iter().enumerate() {
        let row_number = index + 1;

        if row.colaborador.trim().is_empty() {
            summary.errores += 1;
            summary
                .detalles
                .push(format!("Fila {}: falta el campo colaborador", row_number));
            continue;
        }

        let new_plan = NewPlan {
            colaborador: row.colaborador.clone(),
            puesto: row.puesto.clone(),
            departamento: row.departamento.clone(),
            reemplazo: row.reemplazo.clone(),
            puesto_clave: row.puesto_clave.clone(),
        };

        match plans::create_plan(&state.db, &new_plan).await {
            Ok(_) => summary.importados += 1,
            Err(Error::Duplicate(colaborador)) => {
                summary.duplicados += 1;
                summary.detalles.push(format!(
                    "Fila {}: ya existe un plan para {}",
                    row_number, colaborador
                ));
            }
            Err(e) => {
                summary.errores += 1;
                summary.detalles.push(format!("Fila {}: {}", row_number, e));
            }
        }
    }

    info!(
        "Plan import: {} imported, {} duplicated, {} errored",
        summary.importados, summary.duplicados, summary.errores
    );
    Ok(Json(summary))
}
