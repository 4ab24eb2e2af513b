//! Database initialization
//!
//! Creates the database on first run and brings the schema up to date with
//! idempotent `CREATE TABLE IF NOT EXISTS` statements, then seeds default
//! settings. Safe to call on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and seed defaults (idempotent)
///
/// Exposed separately so tests can build an in-memory database.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_users_table(pool).await?;
    create_sessions_table(pool).await?;
    create_employees_table(pool).await?;
    create_substitution_plans_table(pool).await?;
    create_succession_records_table(pool).await?;
    create_action_plans_table(pool).await?;
    create_audit_entries_table(pool).await?;
    create_evidences_table(pool).await?;

    init_default_settings(pool).await?;

    Ok(())
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            salt TEXT NOT NULL,
            display_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'Lector',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            last_signed_in INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_employees_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id TEXT PRIMARY KEY,
            nombre TEXT NOT NULL,
            puesto TEXT NOT NULL DEFAULT '',
            departamento TEXT NOT NULL DEFAULT '',
            email TEXT,
            activo INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_substitution_plans_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS substitution_plans (
            id TEXT PRIMARY KEY,
            colaborador TEXT NOT NULL,
            puesto TEXT NOT NULL DEFAULT '',
            departamento TEXT NOT NULL DEFAULT '',
            reemplazo TEXT NOT NULL DEFAULT '',
            puesto_clave TEXT NOT NULL DEFAULT 'No',
            riesgo_continuidad TEXT NOT NULL,
            prioridad_sucesion TEXT NOT NULL,
            critico TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Backs the duplicate-colaborador guard (exact, case-sensitive match)
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_plans_colaborador ON substitution_plans(colaborador)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_succession_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS succession_records (
            id TEXT PRIMARY KEY,
            plan_id TEXT NOT NULL UNIQUE,
            colaborador TEXT NOT NULL,
            puesto TEXT NOT NULL DEFAULT '',
            departamento TEXT NOT NULL DEFAULT '',
            reemplazo TEXT NOT NULL DEFAULT '',
            riesgo_continuidad TEXT NOT NULL,
            prioridad_sucesion TEXT NOT NULL,
            critico TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_action_plans_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS action_plans (
            id TEXT PRIMARY KEY,
            succession_id TEXT NOT NULL REFERENCES succession_records(id) ON DELETE CASCADE,
            descripcion TEXT NOT NULL,
            responsable TEXT NOT NULL DEFAULT '',
            estado TEXT NOT NULL DEFAULT 'NoIniciado',
            progreso INTEGER NOT NULL DEFAULT 0,
            fecha_objetivo TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_audit_entries_table(pool: &SqlitePool) -> Result<()> {
    // Append-only; no foreign key so entries survive action-plan deletion
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_entries (
            id TEXT PRIMARY KEY,
            action_plan_id TEXT NOT NULL,
            field TEXT NOT NULL,
            old_value TEXT,
            new_value TEXT,
            changed_by TEXT NOT NULL,
            changed_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_evidences_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS evidences (
            id TEXT PRIMARY KEY,
            action_plan_id TEXT NOT NULL REFERENCES action_plans(id) ON DELETE CASCADE,
            filename TEXT NOT NULL,
            storage_key TEXT NOT NULL,
            url TEXT NOT NULL,
            content_type TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            uploaded_by TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('session_timeout_minutes', '30')",
    )
    .execute(pool)
    .await?;
    Ok(())
}
