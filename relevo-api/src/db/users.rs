//! Users and sessions

use relevo_common::db::models::{Session, User};
use relevo_common::session::{
    generate_salt, generate_token, hash_password, now_ms, SessionKind,
};
use relevo_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    display_name: &str,
    role: &str,
) -> Result<User> {
    let id = Uuid::new_v4().to_string();
    let salt = generate_salt();
    let password_hash = hash_password(password, &salt);
    let created_at = now_ms();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, salt, display_name, role, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(username)
    .bind(&password_hash)
    .bind(&salt)
    .bind(display_name)
    .bind(role)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(User {
        id,
        username: username.to_string(),
        password_hash,
        salt,
        display_name: display_name.to_string(),
        role: role.to_string(),
        created_at,
    })
}

/// Seed an administrator account on an empty users table
///
/// The generated credentials are `admin`/`admin`; the startup log insists
/// on changing them.
pub async fn ensure_default_admin(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if count == 0 {
        create_user(pool, "admin", "admin", "Administrador", "Admin").await?;
        warn!("Created default admin user (admin/admin) - change the password");
    }
    Ok(())
}

/// Create a session row and return its opaque token
pub async fn create_session(pool: &SqlitePool, user_id: &str, kind: SessionKind) -> Result<String> {
    let token = generate_token();
    let now = now_ms();

    sqlx::query(
        "INSERT INTO sessions (token, user_id, kind, last_signed_in, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&token)
    .bind(user_id)
    .bind(kind.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(token)
}

pub async fn find_session(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(session)
}

/// Refresh the last-signed-in timestamp of a live session
pub async fn touch_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("UPDATE sessions SET last_signed_in = ? WHERE token = ?")
        .bind(now_ms())
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Verify username/password, returning the user on success
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let user = find_by_username(pool, username)
        .await?
        .ok_or_else(|| Error::InvalidInput("Usuario o contrasena incorrectos".to_string()))?;

    if !relevo_common::session::verify_password(password, &user.salt, &user.password_hash) {
        return Err(Error::InvalidInput(
            "Usuario o contrasena incorrectos".to_string(),
        ));
    }
    Ok(user)
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
    async fn test_authenticate_round_trip() {
        let pool = test_pool().await;
        create_user(&pool, "rrhh", "clave123", "Recursos Humanos", "RRHH")
            .await
            .unwrap();

        let user = authenticate(&pool, "rrhh", "clave123").await.unwrap();
        assert_eq!(user.role, "RRHH");

        assert!(authenticate(&pool, "rrhh", "otra").await.is_err());
        assert!(authenticate(&pool, "nadie", "clave123").await.is_err());
    }

    #[tokio::test]
    async fn test_default_admin_seeded_once() {
        let pool = test_pool().await;
        ensure_default_admin(&pool).await.unwrap();
        ensure_default_admin(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let pool = test_pool().await;
        let user = create_user(&pool, "ana", "clave", "Ana", "Lector").await.unwrap();

        let token = create_session(&pool, &user.id, SessionKind::Local).await.unwrap();
        let session = find_session(&pool, &token).await.unwrap().unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.kind, "local");

        touch_session(&pool, &token).await.unwrap();
        delete_session(&pool, &token).await.unwrap();
        assert!(find_session(&pool, &token).await.unwrap().is_none());
    }
}
