//! Action plan repository

use relevo_common::db::models::{ActionPlan, EstadoAccion};
use relevo_common::session::now_ms;
use relevo_common::{Error, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAction {
    pub descripcion: String,
    #[serde(default)]
    pub responsable: String,
    pub fecha_objetivo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionChanges {
    pub descripcion: Option<String>,
    pub responsable: Option<String>,
    pub estado: Option<String>,
    pub progreso: Option<i64>,
    pub fecha_objetivo: Option<String>,
}

pub async fn list_by_succession(pool: &SqlitePool, succession_id: &str) -> Result<Vec<ActionPlan>> {
    let actions = sqlx::query_as::<_, ActionPlan>(
        "SELECT * FROM action_plans WHERE succession_id = ? ORDER BY created_at",
    )
    .bind(succession_id)
    .fetch_all(pool)
    .await?;
    Ok(actions)
}

pub async fn get_action(pool: &SqlitePool, id: &str) -> Result<ActionPlan> {
    sqlx::query_as::<_, ActionPlan>("SELECT * FROM action_plans WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Plan de accion: {}", id)))
}

pub async fn create_action(
    pool: &SqlitePool,
    succession_id: &str,
    new_action: &NewAction,
) -> Result<ActionPlan> {
    if new_action.descripcion.trim().is_empty() {
        return Err(Error::InvalidInput("El campo descripcion es obligatorio".to_string()));
    }

    // The parent record must exist
    let parent: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM succession_records WHERE id = ?")
        .bind(succession_id)
        .fetch_one(pool)
        .await?;
    if parent == 0 {
        return Err(Error::NotFound(format!("Plan de sucesion: {}", succession_id)));
    }

    let now = now_ms();
    let action = ActionPlan {
        id: Uuid::new_v4().to_string(),
        succession_id: succession_id.to_string(),
        descripcion: new_action.descripcion.trim().to_string(),
        responsable: new_action.responsable.clone(),
        estado: EstadoAccion::NoIniciado.as_str().to_string(),
        progreso: 0,
        fecha_objetivo: new_action.fecha_objetivo.clone(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO action_plans (
            id, succession_id, descripcion, responsable, estado, progreso,
            fecha_objetivo, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&action.id)
    .bind(&action.succession_id)
    .bind(&action.descripcion)
    .bind(&action.responsable)
    .bind(&action.estado)
    .bind(action.progreso)
    .bind(&action.fecha_objetivo)
    .bind(action.created_at)
    .bind(action.updated_at)
    .execute(pool)
    .await?;

    Ok(action)
}

/// Validate and apply a partial update; returns (before, after) so the
/// caller can audit field-level changes
pub async fn update_action(
    pool: &SqlitePool,
    id: &str,
    changes: &ActionChanges,
) -> Result<(ActionPlan, ActionPlan)> {
    let existing = get_action(pool, id).await?;

    if let Some(estado) = &changes.estado {
        estado
            .parse::<EstadoAccion>()
            .map_err(Error::InvalidInput)?;
    }
    if let Some(progreso) = changes.progreso {
        if !(0..=100).contains(&progreso) {
            return Err(Error::InvalidInput(format!(
                "Progreso fuera de rango (0-100): {}",
                progreso
            )));
        }
    }

    let updated = ActionPlan {
        descripcion: changes
            .descripcion
            .clone()
            .unwrap_or_else(|| existing.descripcion.clone()),
        responsable: changes
            .responsable
            .clone()
            .unwrap_or_else(|| existing.responsable.clone()),
        estado: changes.estado.clone().unwrap_or_else(|| existing.estado.clone()),
        progreso: changes.progreso.unwrap_or(existing.progreso),
        fecha_objetivo: changes
            .fecha_objetivo
            .clone()
            .or_else(|| existing.fecha_objetivo.clone()),
        updated_at: now_ms(),
        ..existing.clone()
    };

    sqlx::query(
        r#"
        UPDATE action_plans SET
            descripcion = ?, responsable = ?, estado = ?, progreso = ?,
            fecha_objetivo = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&updated.descripcion)
    .bind(&updated.responsable)
    .bind(&updated.estado)
    .bind(updated.progreso)
    .bind(&updated.fecha_objetivo)
    .bind(updated.updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok((existing, updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::plans::{create_plan, NewPlan};
    use relevo_common::db::create_schema;

    async fn pool_with_record() -> (SqlitePool, String) {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        create_plan(
            &pool,
            &NewPlan {
                colaborador: "Ana Lopez".to_string(),
                puesto: "Gerente".to_string(),
                departamento: "Finanzas".to_string(),
                reemplazo: String::new(),
                puesto_clave: "Si".to_string(),
            },
        )
        .await
        .unwrap();
        let record_id: String = sqlx::query_scalar("SELECT id FROM succession_records")
            .fetch_one(&pool)
            .await
            .unwrap();
        (pool, record_id)
    }

    #[tokio::test]
    async fn test_action_starts_not_started() {
        let (pool, record_id) = pool_with_record().await;
        let action = create_action(
            &pool,
            &record_id,
            &NewAction {
                descripcion: "Formar al reemplazo".to_string(),
                responsable: "RRHH".to_string(),
                fecha_objetivo: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(action.estado, "NoIniciado");
        assert_eq!(action.progreso, 0);
        assert_eq!(list_by_succession(&pool, &record_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_existing_record() {
        let (pool, _) = pool_with_record().await;
        let result = create_action(
            &pool,
            "no-existe",
            &NewAction {
                descripcion: "x".to_string(),
                responsable: String::new(),
                fecha_objetivo: None,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_returns_before_and_after() {
        let (pool, record_id) = pool_with_record().await;
        let action = create_action(
            &pool,
            &record_id,
            &NewAction {
                descripcion: "Formar al reemplazo".to_string(),
                responsable: String::new(),
                fecha_objetivo: None,
            },
        )
        .await
        .unwrap();

        let changes = ActionChanges {
            estado: Some("EnProgreso".to_string()),
            progreso: Some(40),
            ..Default::default()
        };
        let (before, after) = update_action(&pool, &action.id, &changes).await.unwrap();
        assert_eq!(before.estado, "NoIniciado");
        assert_eq!(after.estado, "EnProgreso");
        assert_eq!(after.progreso, 40);
    }

    #[tokio::test]
    async fn test_progress_out_of_range_rejected() {
        let (pool, record_id) = pool_with_record().await;
        let action = create_action(
            &pool,
            &record_id,
            &NewAction {
                descripcion: "x".to_string(),
                responsable: String::new(),
                fecha_objetivo: None,
            },
        )
        .await
        .unwrap();

        for progreso in [-1, 101, 500] {
            let changes = ActionChanges {
                progreso: Some(progreso),
                ..Default::default()
            };
            assert!(update_action(&pool, &action.id, &changes).await.is_err());
        }
    }

    #[tokio::test]
    async fn test_unknown_estado_rejected() {
        let (pool, record_id) = pool_with_record().await;
        let action = create_action(
            &pool,
            &record_id,
            &NewAction {
                descripcion: "x".to_string(),
                responsable: String::new(),
                fecha_objetivo: None,
            },
        )
        .await
        .unwrap();

        let changes = ActionChanges {
            estado: Some("Pendiente".to_string()),
            ..Default::default()
        };
        assert!(update_action(&pool, &action.id, &changes).await.is_err());
    }
}
