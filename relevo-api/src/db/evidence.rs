//! Evidence metadata repository (file bytes live in the object store)

use relevo_common::db::models::Evidence;
use relevo_common::session::now_ms;
use relevo_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

#[allow(clippy::too_many_arguments)]
pub async fn insert_evidence(
    pool: &SqlitePool,
    action_plan_id: &str,
    filename: &str,
    storage_key: &str,
    url: &str,
    content_type: &str,
    size_bytes: i64,
    uploaded_by: &str,
) -> Result<Evidence> {
    let evidence = Evidence {
        id: Uuid::new_v4().to_string(),
        action_plan_id: action_plan_id.to_string(),
        filename: filename.to_string(),
        storage_key: storage_key.to_string(),
        url: url.to_string(),
        content_type: content_type.to_string(),
        size_bytes,
        uploaded_by: uploaded_by.to_string(),
        created_at: now_ms(),
    };

    sqlx::query(
        r#"
        INSERT INTO evidences (
            id, action_plan_id, filename, storage_key, url, content_type,
            size_bytes, uploaded_by, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&evidence.id)
    .bind(&evidence.action_plan_id)
    .bind(&evidence.filename)
    .bind(&evidence.storage_key)
    .bind(&evidence.url)
    .bind(&evidence.content_type)
    .bind(evidence.size_bytes)
    .bind(&evidence.uploaded_by)
    .bind(evidence.created_at)
    .execute(pool)
    .await?;

    Ok(evidence)
}

pub async fn list_for_action(pool: &SqlitePool, action_plan_id: &str) -> Result<Vec<Evidence>> {
    let evidences = sqlx::query_as::<_, Evidence>(
        "SELECT * FROM evidences WHERE action_plan_id = ? ORDER BY created_at DESC",
    )
    .bind(action_plan_id)
    .fetch_all(pool)
    .await?;
    Ok(evidences)
}
