//! Cookie-based session authentication
//!
//! Two cookies exist side by side: `relevo_sesion` for sessions minted from
//! the federated identity gateway and `relevo_sesion_local` for local
//! username/password sign-ins. Both point at rows in the `sessions` table.
//! The middleware enforces the inactivity timeout by comparing the stored
//! last-signed-in timestamp on every request; an expired or unknown session
//! answers 401 with both cookies cleared.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use relevo_common::session::{is_session_expired, SessionKind};

/// Federated session cookie name
pub const SESSION_COOKIE: &str = "relevo_sesion";
/// Local username/password session cookie name
pub const LOCAL_SESSION_COOKIE: &str = "relevo_sesion_local";

/// Authenticated user attached to the request by the middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: String,
    /// Token of the session that authenticated this request
    pub token: String,
}

/// Extract a named cookie from the request headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in raw.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=') {
            if key == name {
                return Some(value.to_string());
            }
        }
    }
    None
}

fn set_cookie(name: &str, token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, token)
}

fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", name)
}

/// 401 response that also clears both session cookies
fn unauthorized_with_cleared_cookies(message: &str) -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": { "code": "UNAUTHORIZED", "message": message }
        })),
    )
        .into_response();

    let headers = response.headers_mut();
    for cookie in [clear_cookie(SESSION_COOKIE), clear_cookie(LOCAL_SESSION_COOKIE)] {
        if let Ok(value) = cookie.parse() {
            headers.append(header::SET_COOKIE, value);
        }
    }
    response
}

/// Session middleware for all protected routes
///
/// Looks up the session behind either cookie, enforces the inactivity
/// timeout, refreshes the timestamp and attaches [`CurrentUser`].
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = cookie_value(request.headers(), SESSION_COOKIE)
        .or_else(|| cookie_value(request.headers(), LOCAL_SESSION_COOKIE));

    let Some(token) = token else {
        return unauthorized_with_cleared_cookies("Sesion no iniciada");
    };

    let session = match users::find_session(&state.db, &token).await {
        Ok(Some(session)) => session,
        Ok(None) => return unauthorized_with_cleared_cookies("Sesion no valida"),
        Err(e) => return ApiError::Common(e).into_response(),
    };

    let timeout_ms = state.config.session_timeout().as_millis() as i64;
    if is_session_expired(session.last_signed_in, timeout_ms) {
        // Stale session: remove it server-side and clear the cookies
        if let Err(e) = users::delete_session(&state.db, &token).await {
            tracing::warn!("Could not delete expired session: {}", e);
        }
        return unauthorized_with_cleared_cookies("Sesion expirada por inactividad");
    }

    let user = match users::find_by_id(&state.db, &session.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized_with_cleared_cookies("Usuario no encontrado"),
        Err(e) => return ApiError::Common(e).into_response(),
    };

    if let Err(e) = users::touch_session(&state.db, &token).await {
        tracing::warn!("Could not refresh session timestamp: {}", e);
    }

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        role: user.role,
        token,
    });

    next.run(request).await
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub display_name: String,
    pub role: String,
}

/// POST /api/auth/login
///
/// Local username/password sign-in; sets the local session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Response> {
    let user = users::authenticate(&state.db, &request.username, &request.password)
        .await
        .map_err(|_| ApiError::Unauthorized("Usuario o contrasena incorrectos".to_string()))?;

    let token = users::create_session(&state.db, &user.id, SessionKind::Local).await?;
    info!("Local sign-in: {}", user.username);

    let response = (
        [(header::SET_COOKIE, set_cookie(LOCAL_SESSION_COOKIE, &token))],
        Json(LoginResponse {
            username: user.username,
            display_name: user.display_name,
            role: user.role,
        }),
    )
        .into_response();
    Ok(response)
}

/// Identity asserted by the federated gateway in front of this service
#[derive(Debug, Deserialize)]
pub struct FederatedLoginRequest {
    /// Stable subject identifier issued by the identity provider
    pub subject: String,
    pub display_name: Option<String>,
}

/// POST /api/auth/federated
///
/// Exchange a gateway-asserted identity for a federated session cookie.
/// The reverse proxy in front of this service is responsible for having
/// validated the upstream identity token.
pub async fn federated_login(
    State(state): State<AppState>,
    Json(request): Json<FederatedLoginRequest>,
) -> ApiResult<Response> {
    let subject = request.subject.trim();
    if subject.is_empty() {
        return Err(ApiError::BadRequest("El campo subject es obligatorio".to_string()));
    }

    // First federated sign-in provisions the user as a reader
    let user = match users::find_by_username(&state.db, subject).await? {
        Some(user) => user,
        None => {
            let display_name = request.display_name.as_deref().unwrap_or(subject);
            users::create_user(
                &state.db,
                subject,
                &relevo_common::session::generate_token(),
                display_name,
                "Lector",
            )
            .await?
        }
    };

    let token = users::create_session(&state.db, &user.id, SessionKind::Federada).await?;
    info!("Federated sign-in: {}", user.username);

    let response = (
        [(header::SET_COOKIE, set_cookie(SESSION_COOKIE, &token))],
        Json(LoginResponse {
            username: user.username,
            display_name: user.display_name,
            role: user.role,
        }),
    )
        .into_response();
    Ok(response)
}

/// POST /api/auth/logout
///
/// Deletes the session row and clears both cookies.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<Response> {
    users::delete_session(&state.db, &current_user.token).await?;
    info!("Sign-out: {}", current_user.username);

    let mut response = Json(json!({ "ok": true })).into_response();
    let headers = response.headers_mut();
    for cookie in [clear_cookie(SESSION_COOKIE), clear_cookie(LOCAL_SESSION_COOKIE)] {
        if let Ok(value) = cookie.parse() {
            headers.append(header::SET_COOKIE, value);
        }
    }
    Ok(response)
}

/// GET /api/auth/me
pub async fn me(Extension(current_user): Extension<CurrentUser>) -> Json<LoginResponse> {
    Json(LoginResponse {
        username: current_user.username,
        display_name: current_user.display_name,
        role: current_user.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("otra=1; relevo_sesion=abc123; relevo_sesion_local=def456"),
        );

        assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("abc123"));
        assert_eq!(
            cookie_value(&headers, LOCAL_SESSION_COOKIE).as_deref(),
            Some("def456")
        );
        assert_eq!(cookie_value(&headers, "inexistente"), None);
    }

    #[test]
    fn test_cookie_value_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_cookie(SESSION_COOKIE);
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with("relevo_sesion=;"));
    }

    #[test]
    fn test_unauthorized_clears_both_cookies() {
        let response = unauthorized_with_cleared_cookies("Sesion expirada");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("relevo_sesion=;")));
        assert!(cookies.iter().any(|c| c.starts_with("relevo_sesion_local=;")));
    }
}
