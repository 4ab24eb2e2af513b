//! relevo-api library - HTTP service for succession & substitution planning
//!
//! Exposes the router and application state for integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use relevo_common::config::AppConfig;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::notifier::Notifier;
use crate::services::storage::ObjectStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Runtime configuration (session timeout, notification endpoint)
    pub config: AppConfig,
    /// Evidence object store
    pub storage: Arc<dyn ObjectStore>,
    /// Outbound email notifications (no-op when unconfigured)
    pub notifier: Notifier,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig, storage: Arc<dyn ObjectStore>) -> Self {
        let notifier = Notifier::new(
            config.notify_endpoint.clone(),
            config.notify_api_key.clone(),
        );
        Self {
            db,
            config,
            storage,
            notifier,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Public routes: health check and the two login endpoints. Everything else
/// runs behind the session middleware (cookie + inactivity timeout).
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};

    let protected = Router::new()
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/me", get(api::auth::me))
        .route("/api/empleados", get(api::employees::list_employees))
        .route("/api/empleados", post(api::employees::create_employee))
        .route("/api/empleados/:id", get(api::employees::get_employee))
        .route("/api/empleados/:id", put(api::employees::update_employee))
        .route("/api/empleados/:id", delete(api::employees::deactivate_employee))
        .route("/api/planes", get(api::plans::list_plans))
        .route("/api/planes", post(api::plans::create_plan))
        .route("/api/planes/:id", get(api::plans::get_plan))
        .route("/api/planes/:id", put(api::plans::update_plan))
        .route("/api/planes/:id", delete(api::plans::delete_plan))
        .route("/api/sucesion", get(api::succession::list_records))
        .route("/api/sucesion/sync", post(api::succession::sync_missing))
        .route("/api/sucesion/limpiar", post(api::succession::clean_orphans))
        .route("/api/sucesion/integridad", get(api::succession::integrity))
        .route("/api/sucesion/:id", get(api::succession::get_record))
        .route("/api/sucesion/:id/acciones", get(api::actions::list_actions))
        .route("/api/sucesion/:id/acciones", post(api::actions::create_action))
        .route("/api/acciones/:id", put(api::actions::update_action))
        .route("/api/acciones/:id/progreso", post(api::actions::update_progress))
        .route("/api/acciones/:id/auditoria", get(api::audit::list_audit_entries))
        .route("/api/acciones/:id/evidencias", get(api::evidence::list_evidence))
        .route("/api/acciones/:id/evidencias", post(api::evidence::upload_evidence))
        .route("/api/export/planes.csv", get(api::export::export_plans_csv))
        .route("/api/export/sucesion.csv", get(api::export::export_succession_csv))
        .route("/api/import/planes", post(api::import::import_plans))
        .route("/api/dashboard", get(api::dashboard::dashboard_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::session_middleware,
        ));

    let public = Router::new()
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/federated", post(api::auth::federated_login))
        .merge(api::health::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        // Enable CORS for the dashboard frontend
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
