//! Succession record repository (reads; writes go through the plan
//! repository and the sync routines)

use relevo_common::db::models::SuccessionRecord;
use relevo_common::{Error, Result};
use sqlx::SqlitePool;

pub async fn list_records(pool: &SqlitePool) -> Result<Vec<SuccessionRecord>> {
    let records = sqlx::query_as::<_, SuccessionRecord>(
        "SELECT * FROM succession_records ORDER BY colaborador",
    )
    .fetch_all(pool)
    .await?;
    Ok(records)
}

pub async fn get_record(pool: &SqlitePool, id: &str) -> Result<SuccessionRecord> {
    sqlx::query_as::<_, SuccessionRecord>("SELECT * FROM succession_records WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Plan de sucesion: {}", id)))
}
