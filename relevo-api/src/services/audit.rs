//! Best-effort audit recording
//!
//! Audit writes must never block the primary user action: a failed insert
//! is logged and swallowed. The append-only entries themselves live in
//! `audit_entries`.

use relevo_common::session::now_ms;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

/// Record one field-level change; failures are logged, not returned
pub async fn record_change(
    pool: &SqlitePool,
    action_plan_id: &str,
    field: &str,
    old_value: Option<&str>,
    new_value: Option<&str>,
    changed_by: &str,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO audit_entries (id, action_plan_id, field, old_value, new_value, changed_by, changed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(action_plan_id)
    .bind(field)
    .bind(old_value)
    .bind(new_value)
    .bind(changed_by)
    .bind(now_ms())
    .execute(pool)
    .await;

    if let Err(e) = result {
        warn!(
            "Audit write failed for action plan {} field {}: {}",
            action_plan_id, field, e
        );
    }
}

/// Record a report download against the export pseudo-resource
pub async fn record_download(pool: &SqlitePool, resource: &str, downloaded_by: &str) {
    record_change(
        pool,
        resource,
        "descarga",
        None,
        Some(resource),
        downloaded_by,
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use relevo_common::db::create_schema;

    #[tokio::test]
    async fn test_change_is_recorded() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();

        record_change(&pool, "ap-1", "estado", Some("NoIniciado"), Some("EnProgreso"), "admin").await;

        let (field, old_value, new_value): (String, Option<String>, Option<String>) =
            sqlx::query_as(
                "SELECT field, old_value, new_value FROM audit_entries WHERE action_plan_id = 'ap-1'",
            )
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(field, "estado");
        assert_eq!(old_value.as_deref(), Some("NoIniciado"));
        assert_eq!(new_value.as_deref(), Some("EnProgreso"));
    }

    #[tokio::test]
    async fn test_failed_write_does_not_panic() {
        // No schema: the insert fails but the call must still return
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        record_change(&pool, "ap-1", "estado", None, Some("EnProgreso"), "admin").await;
    }
}
