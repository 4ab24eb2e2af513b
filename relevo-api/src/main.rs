//! relevo-api - Succession & substitution planning HTTP service
//!
//! Serves the RPC-style JSON API consumed by the HR dashboards: plans,
//! succession records, action plans, audit trail, evidence uploads and
//! spreadsheet import/export.

use anyhow::Result;
use relevo_api::{build_router, AppState};
use relevo_common::config::AppConfig;
use relevo_common::db::init_database;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Relevo API (relevo-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli_root = std::env::args().nth(1);
    let config = AppConfig::from_env(cli_root.as_deref())?;
    config.ensure_root_exists()?;

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    // First run: make sure someone can sign in
    if let Err(e) = relevo_api::db::users::ensure_default_admin(&pool).await {
        warn!("Could not verify default admin user: {}", e);
    }

    let storage = Arc::new(relevo_api::services::storage::FsObjectStore::new(
        config.storage_root(),
    ));

    let state = AppState::new(pool, config.clone(), storage);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("relevo-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
