//! Substitution plan repository
//!
//! Plan writes keep the succession table consistent inline: creating or
//! toggling a key-position plan creates/updates/removes its mirrored
//! succession record in the same request. The derived risk fields always
//! come from [`relevo_common::risk::classify_replacement`].

use relevo_common::db::models::SubstitutionPlan;
use relevo_common::db::succession_sync::insert_succession_record;
use relevo_common::risk::classify_replacement;
use relevo_common::session::now_ms;
use relevo_common::{Error, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fields accepted when creating a plan
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlan {
    pub colaborador: String,
    #[serde(default)]
    pub puesto: String,
    #[serde(default)]
    pub departamento: String,
    #[serde(default)]
    pub reemplazo: String,
    /// `Si` marks the position as organizationally critical
    #[serde(default)]
    pub puesto_clave: String,
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanChanges {
    pub colaborador: Option<String>,
    pub puesto: Option<String>,
    pub departamento: Option<String>,
    pub reemplazo: Option<String>,
    pub puesto_clave: Option<String>,
}

/// Normalize the `puesto_clave` flag to its stored form
pub fn normalize_clave(value: &str) -> &'static str {
    if value.trim().eq_ignore_ascii_case("si") {
        "Si"
    } else {
        "No"
    }
}

pub async fn list_plans(pool: &SqlitePool) -> Result<Vec<SubstitutionPlan>> {
    let plans = sqlx::query_as::<_, SubstitutionPlan>(
        "SELECT * FROM substitution_plans ORDER BY colaborador",
    )
    .fetch_all(pool)
    .await?;
    Ok(plans)
}

pub async fn get_plan(pool: &SqlitePool, id: &str) -> Result<SubstitutionPlan> {
    sqlx::query_as::<_, SubstitutionPlan>("SELECT * FROM substitution_plans WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Plan de sustitucion: {}", id)))
}

pub async fn find_by_colaborador(
    pool: &SqlitePool,
    colaborador: &str,
) -> Result<Option<SubstitutionPlan>> {
    let plan = sqlx::query_as::<_, SubstitutionPlan>(
        "SELECT * FROM substitution_plans WHERE colaborador = ?",
    )
    .bind(colaborador)
    .fetch_optional(pool)
    .await?;
    Ok(plan)
}

/// Create a plan, enforcing the duplicate-colaborador guard and mirroring
/// key positions into the succession table
pub async fn create_plan(pool: &SqlitePool, new_plan: &NewPlan) -> Result<SubstitutionPlan> {
    let colaborador = new_plan.colaborador.trim();
    if colaborador.is_empty() {
        return Err(Error::InvalidInput("El campo colaborador es obligatorio".to_string()));
    }

    // Exact, case-sensitive match; the unique index backs this pre-check
    if find_by_colaborador(pool, colaborador).await?.is_some() {
        return Err(Error::Duplicate(colaborador.to_string()));
    }

    let profile = classify_replacement(&new_plan.reemplazo);
    let clave = normalize_clave(&new_plan.puesto_clave);
    let now = now_ms();
    let plan = SubstitutionPlan {
        id: Uuid::new_v4().to_string(),
        colaborador: colaborador.to_string(),
        puesto: new_plan.puesto.clone(),
        departamento: new_plan.departamento.clone(),
        reemplazo: new_plan.reemplazo.clone(),
        puesto_clave: clave.to_string(),
        riesgo_continuidad: profile.riesgo.as_str().to_string(),
        prioridad_sucesion: profile.prioridad.as_str().to_string(),
        critico: profile.critico_str().to_string(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO substitution_plans (
            id, colaborador, puesto, departamento, reemplazo, puesto_clave,
            riesgo_continuidad, prioridad_sucesion, critico, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&plan.id)
    .bind(&plan.colaborador)
    .bind(&plan.puesto)
    .bind(&plan.departamento)
    .bind(&plan.reemplazo)
    .bind(&plan.puesto_clave)
    .bind(&plan.riesgo_continuidad)
    .bind(&plan.prioridad_sucesion)
    .bind(&plan.critico)
    .bind(plan.created_at)
    .bind(plan.updated_at)
    .execute(pool)
    .await?;

    if plan.puesto_clave == "Si" {
        insert_succession_record(pool, &plan).await?;
    }

    Ok(plan)
}

/// Apply a partial update, re-deriving risk fields and keeping the
/// succession mirror consistent with the `puesto_clave` toggle
pub async fn update_plan(
    pool: &SqlitePool,
    id: &str,
    changes: &PlanChanges,
) -> Result<SubstitutionPlan> {
    let existing = get_plan(pool, id).await?;

    let colaborador = changes
        .colaborador
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.colaborador)
        .to_string();
    if colaborador.is_empty() {
        return Err(Error::InvalidInput("El campo colaborador es obligatorio".to_string()));
    }
    if colaborador != existing.colaborador {
        if find_by_colaborador(pool, &colaborador).await?.is_some() {
            return Err(Error::Duplicate(colaborador));
        }
    }

    let reemplazo = changes
        .reemplazo
        .clone()
        .unwrap_or_else(|| existing.reemplazo.clone());
    let clave = changes
        .puesto_clave
        .as_deref()
        .map(normalize_clave)
        .unwrap_or(existing.puesto_clave.as_str());
    let profile = classify_replacement(&reemplazo);

    let updated = SubstitutionPlan {
        id: existing.id.clone(),
        colaborador,
        puesto: changes.puesto.clone().unwrap_or_else(|| existing.puesto.clone()),
        departamento: changes
            .departamento
            .clone()
            .unwrap_or_else(|| existing.departamento.clone()),
        reemplazo,
        puesto_clave: clave.to_string(),
        riesgo_continuidad: profile.riesgo.as_str().to_string(),
        prioridad_sucesion: profile.prioridad.as_str().to_string(),
        critico: profile.critico_str().to_string(),
        created_at: existing.created_at,
        updated_at: now_ms(),
    };

    sqlx::query(
        r#"
        UPDATE substitution_plans SET
            colaborador = ?, puesto = ?, departamento = ?, reemplazo = ?,
            puesto_clave = ?, riesgo_continuidad = ?, prioridad_sucesion = ?,
            critico = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&updated.colaborador)
    .bind(&updated.puesto)
    .bind(&updated.departamento)
    .bind(&updated.reemplazo)
    .bind(&updated.puesto_clave)
    .bind(&updated.riesgo_continuidad)
    .bind(&updated.prioridad_sucesion)
    .bind(&updated.critico)
    .bind(updated.updated_at)
    .bind(&updated.id)
    .execute(pool)
    .await?;

    match (existing.puesto_clave.as_str(), updated.puesto_clave.as_str()) {
        // No -> Si: create the mirrored record (unless one already exists)
        ("No", "Si") => {
            let present: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM succession_records WHERE plan_id = ?",
            )
            .bind(&updated.id)
            .fetch_one(pool)
            .await?;
            if present == 0 {
                insert_succession_record(pool, &updated).await?;
            }
        }
        // Si -> No: the key position is gone, so is its record
        ("Si", "No") => {
            sqlx::query("DELETE FROM succession_records WHERE plan_id = ?")
                .bind(&updated.id)
                .execute(pool)
                .await?;
        }
        // Si -> Si: keep the mirror's fields in step with the plan
        ("Si", "Si") => {
            sqlx::query(
                r#"
                UPDATE succession_records SET
                    colaborador = ?, puesto = ?, departamento = ?, reemplazo = ?,
                    riesgo_continuidad = ?, prioridad_sucesion = ?, critico = ?
                WHERE plan_id = ?
                "#,
            )
            .bind(&updated.colaborador)
            .bind(&updated.puesto)
            .bind(&updated.departamento)
            .bind(&updated.reemplazo)
            .bind(&updated.riesgo_continuidad)
            .bind(&updated.prioridad_sucesion)
            .bind(&updated.critico)
            .bind(&updated.id)
            .execute(pool)
            .await?;
        }
        _ => {}
    }

    Ok(updated)
}

/// Delete a plan and its succession record
pub async fn delete_plan(pool: &SqlitePool, id: &str) -> Result<()> {
    // Record first: succession_records has no FK cascade back to plans
    sqlx::query("DELETE FROM succession_records WHERE plan_id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let result = sqlx::query("DELETE FROM substitution_plans WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Plan de sustitucion: {}", id)));
    }
    Ok(())
}
