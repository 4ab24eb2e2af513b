//! Succession-table synchronization
//!
//! Every substitution plan flagged `puesto_clave = Si` must have exactly one
//! mirrored row in `succession_records`, and no record may outlive its plan.
//! Normal request handling maintains the invariant inline (create/toggle/
//! delete); the routines here repair drift left behind by imports, partial
//! failures or deletions that did not cascade.

use crate::db::models::SubstitutionPlan;
use crate::risk::classify_replacement;
use crate::session::now_ms;
use crate::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

/// Insert the mirrored succession record for a key-position plan
///
/// Risk fields are recomputed from the plan's replacement value here, never
/// copied from the plan row, so creation and sync cannot diverge.
pub async fn insert_succession_record(pool: &SqlitePool, plan: &SubstitutionPlan) -> Result<String> {
    let profile = classify_replacement(&plan.reemplazo);
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO succession_records (
            id, plan_id, colaborador, puesto, departamento, reemplazo,
            riesgo_continuidad, prioridad_sucesion, critico, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&plan.id)
    .bind(&plan.colaborador)
    .bind(&plan.puesto)
    .bind(&plan.departamento)
    .bind(&plan.reemplazo)
    .bind(profile.riesgo.as_str())
    .bind(profile.prioridad.as_str())
    .bind(profile.critico_str())
    .bind(now_ms())
    .execute(pool)
    .await?;

    Ok(id)
}

/// Create missing succession records for key-position plans
///
/// Scans plans with `puesto_clave = Si` whose id has no succession record
/// and inserts one per plan. Best-effort: a failed insert is logged and
/// skipped, the batch continues. Returns the number of records created.
/// Idempotent: a second run right after finds nothing to do.
pub async fn sync_missing_plans(pool: &SqlitePool) -> Result<u32> {
    let missing: Vec<SubstitutionPlan> = sqlx::query_as(
        r#"
        SELECT * FROM substitution_plans
        WHERE puesto_clave = 'Si'
          AND id NOT IN (SELECT plan_id FROM succession_records)
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut synced = 0u32;
    for plan in &missing {
        match insert_succession_record(pool, plan).await {
            Ok(_) => synced += 1,
            Err(e) => {
                warn!(
                    "Could not create succession record for plan {} ({}): {}",
                    plan.id, plan.colaborador, e
                );
            }
        }
    }

    if synced > 0 {
        info!("Synchronized {} missing succession record(s)", synced);
    }
    Ok(synced)
}

/// Delete succession records whose plan no longer exists
///
/// Handles plan deletions that did not cascade. Returns the number of
/// orphaned records removed; valid records are untouched.
pub async fn clean_orphaned_records(pool: &SqlitePool) -> Result<u32> {
    let result = sqlx::query(
        "DELETE FROM succession_records WHERE plan_id NOT IN (SELECT id FROM substitution_plans)",
    )
    .execute(pool)
    .await?;

    let removed = result.rows_affected() as u32;
    if removed > 0 {
        info!("Removed {} orphaned succession record(s)", removed);
    }
    Ok(removed)
}

/// Consistency counts between the two tables
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IntegrityReport {
    /// Key-position plans without a succession record
    pub faltantes: i64,
    /// Succession records whose plan is gone
    pub huerfanos: i64,
}

/// Read-only integrity check
///
/// Never fails: if the database is unavailable the report comes back
/// zeroed, so read-only dashboards keep rendering.
pub async fn check_integrity(pool: &SqlitePool) -> IntegrityReport {
    let faltantes: i64 = match sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM substitution_plans
        WHERE puesto_clave = 'Si'
          AND id NOT IN (SELECT plan_id FROM succession_records)
        "#,
    )
    .fetch_one(pool)
    .await
    {
        Ok(count) => count,
        Err(e) => {
            warn!("Integrity check unavailable (missing count): {}", e);
            return IntegrityReport::default();
        }
    };

    let huerfanos: i64 = match sqlx::query_scalar(
        "SELECT COUNT(*) FROM succession_records WHERE plan_id NOT IN (SELECT id FROM substitution_plans)",
    )
    .fetch_one(pool)
    .await
    {
        Ok(count) => count,
        Err(e) => {
            warn!("Integrity check unavailable (orphan count): {}", e);
            return IntegrityReport::default();
        }
    };

    IntegrityReport { faltantes, huerfanos }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::create_schema;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    async fn insert_plan(pool: &SqlitePool, id: &str, colaborador: &str, reemplazo: &str, clave: &str) {
        let profile = classify_replacement(reemplazo);
        sqlx::query(
            r#"
            INSERT INTO substitution_plans (
                id, colaborador, puesto, departamento, reemplazo, puesto_clave,
                riesgo_continuidad, prioridad_sucesion, critico, created_at, updated_at
            )
            VALUES (?, ?, 'Gerente', 'Finanzas', ?, ?, ?, ?, ?, 0, 0)
            "#,
        )
        .bind(id)
        .bind(colaborador)
        .bind(reemplazo)
        .bind(clave)
        .bind(profile.riesgo.as_str())
        .bind(profile.prioridad.as_str())
        .bind(profile.critico_str())
        .execute(pool)
        .await
        .unwrap();
    }

    async fn record_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM succession_records")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_sync_creates_missing_records() {
        let pool = test_pool().await;
        insert_plan(&pool, "p1", "Ana Lopez", "Maria Garcia", "Si").await;
        insert_plan(&pool, "p2", "Luis Paz", "", "Si").await;
        insert_plan(&pool, "p3", "Eva Ruiz", "Juan Soto", "No").await;

        let synced = sync_missing_plans(&pool).await.unwrap();
        assert_eq!(synced, 2);
        assert_eq!(record_count(&pool).await, 2);

        // Non-key plan must not get a record
        let for_p3: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM succession_records WHERE plan_id = 'p3'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(for_p3, 0);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let pool = test_pool().await;
        insert_plan(&pool, "p1", "Ana Lopez", "Maria Garcia", "Si").await;

        assert_eq!(sync_missing_plans(&pool).await.unwrap(), 1);
        assert_eq!(sync_missing_plans(&pool).await.unwrap(), 0);
        assert_eq!(record_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_sync_skips_failed_row_and_continues() {
        let pool = test_pool().await;
        insert_plan(&pool, "p1", "Ana Lopez", "", "Si").await;
        insert_plan(&pool, "p2", "Luis Paz", "", "Si").await;

        // Make one row uninsertable
        sqlx::query(
            r#"
            CREATE TRIGGER reject_ana BEFORE INSERT ON succession_records
            WHEN NEW.colaborador = 'Ana Lopez'
            BEGIN SELECT RAISE(ABORT, 'bloqueado'); END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        // The failed row is skipped, the other still lands
        assert_eq!(sync_missing_plans(&pool).await.unwrap(), 1);
        let survivor: String = sqlx::query_scalar("SELECT plan_id FROM succession_records")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(survivor, "p2");

        // Once unblocked, a later run picks the skipped plan up
        sqlx::query("DROP TRIGGER reject_ana").execute(&pool).await.unwrap();
        assert_eq!(sync_missing_plans(&pool).await.unwrap(), 1);
        assert_eq!(record_count(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_sync_recomputes_risk_fields() {
        let pool = test_pool().await;
        insert_plan(&pool, "p1", "Luis Paz", "NO APLICA", "Si").await;
        sync_missing_plans(&pool).await.unwrap();

        let (riesgo, prioridad, critico): (String, String, String) = sqlx::query_as(
            "SELECT riesgo_continuidad, prioridad_sucesion, critico FROM succession_records WHERE plan_id = 'p1'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(riesgo, "Alto");
        assert_eq!(prioridad, "Alta");
        assert_eq!(critico, "Si");
    }

    #[tokio::test]
    async fn test_clean_removes_only_orphans() {
        let pool = test_pool().await;
        insert_plan(&pool, "p1", "Ana Lopez", "Maria Garcia", "Si").await;
        sync_missing_plans(&pool).await.unwrap();

        // Fabricate an orphan pointing at a vanished plan
        sqlx::query(
            r#"
            INSERT INTO succession_records (
                id, plan_id, colaborador, puesto, departamento, reemplazo,
                riesgo_continuidad, prioridad_sucesion, critico, created_at
            )
            VALUES ('r-orphan', 'p-gone', 'Otro', '', '', '', 'Alto', 'Alta', 'Si', 0)
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        assert_eq!(clean_orphaned_records(&pool).await.unwrap(), 1);
        assert_eq!(record_count(&pool).await, 1);

        let survivor: String =
            sqlx::query_scalar("SELECT plan_id FROM succession_records")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(survivor, "p1");
    }

    #[tokio::test]
    async fn test_integrity_counts() {
        let pool = test_pool().await;
        insert_plan(&pool, "p1", "Ana Lopez", "", "Si").await;
        sqlx::query(
            r#"
            INSERT INTO succession_records (
                id, plan_id, colaborador, puesto, departamento, reemplazo,
                riesgo_continuidad, prioridad_sucesion, critico, created_at
            )
            VALUES ('r-orphan', 'p-gone', 'Otro', '', '', '', 'Alto', 'Alta', 'Si', 0)
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let report = check_integrity(&pool).await;
        assert_eq!(report.faltantes, 1);
        assert_eq!(report.huerfanos, 1);

        sync_missing_plans(&pool).await.unwrap();
        clean_orphaned_records(&pool).await.unwrap();

        let report = check_integrity(&pool).await;
        assert_eq!(report.faltantes, 0);
        assert_eq!(report.huerfanos, 0);
    }

    #[tokio::test]
    async fn test_integrity_soft_fails_without_schema() {
        // No tables at all: the report must come back zeroed, not error
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let report = check_integrity(&pool).await;
        assert_eq!(report.faltantes, 0);
        assert_eq!(report.huerfanos, 0);
    }
}
