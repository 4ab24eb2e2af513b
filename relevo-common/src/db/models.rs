//! Database models
//!
//! Explicit result record types per query; enum-valued columns (`estado`,
//! `riesgo_continuidad`, ...) stay TEXT in the row structs and are parsed
//! where the value matters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub salt: String,
    pub display_name: String,
    pub role: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub kind: String,
    pub last_signed_in: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: String,
    pub nombre: String,
    pub puesto: String,
    pub departamento: String,
    pub email: Option<String>,
    pub activo: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubstitutionPlan {
    pub id: String,
    pub colaborador: String,
    pub puesto: String,
    pub departamento: String,
    /// Designated replacement (person or pool); empty or "NO APLICA" means none
    pub reemplazo: String,
    /// `Si` when the position is organizationally critical
    pub puesto_clave: String,
    pub riesgo_continuidad: String,
    pub prioridad_sucesion: String,
    pub critico: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SuccessionRecord {
    pub id: String,
    pub plan_id: String,
    pub colaborador: String,
    pub puesto: String,
    pub departamento: String,
    pub reemplazo: String,
    pub riesgo_continuidad: String,
    pub prioridad_sucesion: String,
    pub critico: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActionPlan {
    pub id: String,
    pub succession_id: String,
    pub descripcion: String,
    pub responsable: String,
    pub estado: String,
    /// 0..=100
    pub progreso: i64,
    pub fecha_objetivo: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: String,
    pub action_plan_id: String,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_by: String,
    pub changed_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Evidence {
    pub id: String,
    pub action_plan_id: String,
    pub filename: String,
    pub storage_key: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: String,
    pub created_at: i64,
}

/// Action-plan state (`estado` column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstadoAccion {
    NoIniciado,
    EnProgreso,
    Completado,
    Retrasado,
}

impl EstadoAccion {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoAccion::NoIniciado => "NoIniciado",
            EstadoAccion::EnProgreso => "EnProgreso",
            EstadoAccion::Completado => "Completado",
            EstadoAccion::Retrasado => "Retrasado",
        }
    }
}

impl fmt::Display for EstadoAccion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstadoAccion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NoIniciado" => Ok(EstadoAccion::NoIniciado),
            "EnProgreso" => Ok(EstadoAccion::EnProgreso),
            "Completado" => Ok(EstadoAccion::Completado),
            "Retrasado" => Ok(EstadoAccion::Retrasado),
            other => Err(format!("Estado desconocido: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estado_round_trip() {
        for estado in [
            EstadoAccion::NoIniciado,
            EstadoAccion::EnProgreso,
            EstadoAccion::Completado,
            EstadoAccion::Retrasado,
        ] {
            assert_eq!(estado.as_str().parse::<EstadoAccion>().unwrap(), estado);
        }
        assert!("Pendiente".parse::<EstadoAccion>().is_err());
    }
}
