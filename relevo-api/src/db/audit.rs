//! Audit trail reads (writes go through `services::audit`)

use relevo_common::db::models::AuditEntry;
use relevo_common::Result;
use sqlx::SqlitePool;

/// Entries for one action plan, newest first
pub async fn list_for_action(pool: &SqlitePool, action_plan_id: &str) -> Result<Vec<AuditEntry>> {
    let entries = sqlx::query_as::<_, AuditEntry>(
        "SELECT * FROM audit_entries WHERE action_plan_id = ? ORDER BY changed_at DESC",
    )
    .bind(action_plan_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}
