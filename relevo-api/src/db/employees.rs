//! Employee repository

use relevo_common::db::models::Employee;
use relevo_common::session::now_ms;
use relevo_common::{Error, Result};
use serde::{Deserialize, Deserializer};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployee {
    pub nombre: String,
    #[serde(default)]
    pub puesto: String,
    #[serde(default)]
    pub departamento: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeChanges {
    pub nombre: Option<String>,
    pub puesto: Option<String>,
    pub departamento: Option<String>,
    /// Absent keeps the stored email; an explicit null clears it
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
}

/// Keeps "field missing" distinct from "field set to null"
fn double_option<'de, D>(de: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

pub async fn list_employees(pool: &SqlitePool) -> Result<Vec<Employee>> {
    let employees =
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE activo = 1 ORDER BY nombre")
            .fetch_all(pool)
            .await?;
    Ok(employees)
}

pub async fn get_employee(pool: &SqlitePool, id: &str) -> Result<Employee> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Empleado: {}", id)))
}

pub async fn create_employee(pool: &SqlitePool, new_employee: &NewEmployee) -> Result<Employee> {
    let nombre = new_employee.nombre.trim();
    if nombre.is_empty() {
        return Err(Error::InvalidInput("El campo nombre es obligatorio".to_string()));
    }

    let employee = Employee {
        id: Uuid::new_v4().to_string(),
        nombre: nombre.to_string(),
        puesto: new_employee.puesto.clone(),
        departamento: new_employee.departamento.clone(),
        email: new_employee.email.clone(),
        activo: true,
        created_at: now_ms(),
    };

    sqlx::query(
        r#"
        INSERT INTO employees (id, nombre, puesto, departamento, email, activo, created_at)
        VALUES (?, ?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(&employee.id)
    .bind(&employee.nombre)
    .bind(&employee.puesto)
    .bind(&employee.departamento)
    .bind(&employee.email)
    .bind(employee.created_at)
    .execute(pool)
    .await?;

    Ok(employee)
}

pub async fn update_employee(
    pool: &SqlitePool,
    id: &str,
    changes: &EmployeeChanges,
) -> Result<Employee> {
    let existing = get_employee(pool, id).await?;

    let updated = Employee {
        nombre: changes.nombre.clone().unwrap_or_else(|| existing.nombre.clone()),
        puesto: changes.puesto.clone().unwrap_or_else(|| existing.puesto.clone()),
        departamento: changes
            .departamento
            .clone()
            .unwrap_or_else(|| existing.departamento.clone()),
        email: changes.email.clone().unwrap_or_else(|| existing.email.clone()),
        ..existing
    };

    sqlx::query(
        "UPDATE employees SET nombre = ?, puesto = ?, departamento = ?, email = ? WHERE id = ?",
    )
    .bind(&updated.nombre)
    .bind(&updated.puesto)
    .bind(&updated.departamento)
    .bind(&updated.email)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(updated)
}

/// Soft delete: the row stays for historical plans, it just stops listing
pub async fn deactivate_employee(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("UPDATE employees SET activo = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Empleado: {}", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relevo_common::db::create_schema;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_employee_crud() {
        let pool = test_pool().await;
        let employee = create_employee(
            &pool,
            &NewEmployee {
                nombre: "Ana Lopez".to_string(),
                puesto: "Gerente".to_string(),
                departamento: "Finanzas".to_string(),
                email: Some("ana@example.com".to_string()),
            },
        )
        .await
        .unwrap();

        let fetched = get_employee(&pool, &employee.id).await.unwrap();
        assert_eq!(fetched.nombre, "Ana Lopez");
        assert!(fetched.activo);

        let changes = EmployeeChanges {
            puesto: Some("Directora".to_string()),
            ..Default::default()
        };
        let updated = update_employee(&pool, &employee.id, &changes).await.unwrap();
        assert_eq!(updated.puesto, "Directora");
        assert_eq!(updated.nombre, "Ana Lopez");

        deactivate_employee(&pool, &employee.id).await.unwrap();
        assert!(list_employees(&pool).await.unwrap().is_empty());
        // Row survives for history
        assert!(!get_employee(&pool, &employee.id).await.unwrap().activo);
    }

    #[tokio::test]
    async fn test_update_distinguishes_absent_from_null_email() {
        let pool = test_pool().await;
        let employee = create_employee(
            &pool,
            &NewEmployee {
                nombre: "Ana Lopez".to_string(),
                puesto: String::new(),
                departamento: String::new(),
                email: Some("ana@example.com".to_string()),
            },
        )
        .await
        .unwrap();

        // Absent field keeps the stored value
        let keep: EmployeeChanges = serde_json::from_str(r#"{"puesto":"Directora"}"#).unwrap();
        let updated = update_employee(&pool, &employee.id, &keep).await.unwrap();
        assert_eq!(updated.email.as_deref(), Some("ana@example.com"));

        // Explicit null clears it
        let clear: EmployeeChanges = serde_json::from_str(r#"{"email":null}"#).unwrap();
        let updated = update_employee(&pool, &employee.id, &clear).await.unwrap();
        assert_eq!(updated.email, None);
        assert_eq!(get_employee(&pool, &employee.id).await.unwrap().email, None);

        // And a new value replaces it
        let replace: EmployeeChanges =
            serde_json::from_str(r#"{"email":"ana.lopez@example.com"}"#).unwrap();
        let updated = update_employee(&pool, &employee.id, &replace).await.unwrap();
        assert_eq!(updated.email.as_deref(), Some("ana.lopez@example.com"));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let pool = test_pool().await;
        let result = create_employee(
            &pool,
            &NewEmployee {
                nombre: "   ".to_string(),
                puesto: String::new(),
                departamento: String::new(),
                email: None,
            },
        )
        .await;
        assert!(result.is_err());
    }
}
