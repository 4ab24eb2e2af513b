//! Dashboard aggregation
//!
//! Read path with soft failure: if the database is unavailable every count
//! comes back zero instead of a 500, so the dashboards still render.

use axum::{extract::State, Json};
use relevo_common::db::succession_sync::{check_integrity, IntegrityReport};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Default, Serialize)]
pub struct DashboardStats {
    pub total_planes: i64,
    pub planes_clave: i64,
    pub riesgo_alto: i64,
    pub riesgo_medio: i64,
    pub riesgo_bajo: i64,
    pub total_sucesion: i64,
    pub acciones_no_iniciadas: i64,
    pub acciones_en_progreso: i64,
    pub acciones_completadas: i64,
    pub acciones_retrasadas: i64,
    pub integridad: IntegrityReport,
}

/// COUNT(*) that degrades to zero when the query fails
async fn count_or_zero(pool: &SqlitePool, sql: &str) -> i64 {
    match sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await {
        Ok(count) => count,
        Err(e) => {
            warn!("Dashboard count unavailable ({}): {}", sql, e);
            0
        }
    }
}

/// GET /api/dashboard
pub async fn dashboard_stats(State(state): State<AppState>) -> Json<DashboardStats> {
    let db = &state.db;

    let stats = DashboardStats {
        total_planes: count_or_zero(db, "SELECT COUNT(*) FROM substitution_plans").await,
        planes_clave: count_or_zero(
            db,
            "SELECT COUNT(*) FROM substitution_plans WHERE puesto_clave = 'Si'",
        )
        .await,
        riesgo_alto: count_or_zero(
            db,
            "SELECT COUNT(*) FROM substitution_plans WHERE riesgo_continuidad = 'Alto'",
        )
        .await,
        riesgo_medio: count_or_zero(
            db,
            "SELECT COUNT(*) FROM substitution_plans WHERE riesgo_continuidad = 'Medio'",
        )
        .await,
        riesgo_bajo: count_or_zero(
            db,
            "SELECT COUNT(*) FROM substitution_plans WHERE riesgo_continuidad = 'Bajo'",
        )
        .await,
        total_sucesion: count_or_zero(db, "SELECT COUNT(*) FROM succession_records").await,
        acciones_no_iniciadas: count_or_zero(
            db,
            "SELECT COUNT(*) FROM action_plans WHERE estado = 'NoIniciado'",
        )
        .await,
        acciones_en_progreso: count_or_zero(
            db,
            "SELECT COUNT(*) FROM action_plans WHERE estado = 'EnProgreso'",
        )
        .await,
        acciones_completadas: count_or_zero(
            db,
            "SELECT COUNT(*) FROM action_plans WHERE estado = 'Completado'",
        )
        .await,
        acciones_retrasadas: count_or_zero(
            db,
            "SELECT COUNT(*) FROM action_plans WHERE estado = 'Retrasado'",
        )
        .await,
        integridad: check_integrity(db).await,
    };

    Json(stats)
}
