//! relevo-sync - Succession table maintenance tool
//!
//! Repairs drift between `substitution_plans` and `succession_records`
//! outside of request handling: creates missing records for key-position
//! plans, removes orphans left by non-cascaded deletions, and reports
//! integrity counts. Intended for cron or one-off operator runs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use relevo_common::config::resolve_root_folder;
use relevo_common::db::{
    check_integrity, clean_orphaned_records, init_database, sync_missing_plans,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "relevo-sync", about = "Mantenimiento de la tabla de sucesion")]
struct Cli {
    /// Root folder holding relevo.db (overrides RELEVO_ROOT)
    #[arg(long)]
    root: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create missing succession records for key-position plans
    Sync,
    /// Remove succession records whose plan no longer exists
    Clean,
    /// Report integrity counts without changing anything
    Check,
    /// Sync then clean
    Repair,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting Relevo Sync (relevo-sync) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();

    let root_folder = resolve_root_folder(cli.root.as_deref(), "RELEVO_ROOT")?;
    let db_path = root_folder.join("relevo.db");
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    match cli.command {
        Command::Sync => {
            let synced = sync_missing_plans(&pool).await?;
            println!("Registros sincronizados: {}", synced);
        }
        Command::Clean => {
            let removed = clean_orphaned_records(&pool).await?;
            println!("Registros huerfanos eliminados: {}", removed);
        }
        Command::Check => {
            let report = check_integrity(&pool).await;
            println!("Planes clave sin registro: {}", report.faltantes);
            println!("Registros huerfanos: {}", report.huerfanos);
        }
        Command::Repair => {
            let synced = sync_missing_plans(&pool).await?;
            let removed = clean_orphaned_records(&pool).await?;
            println!("Registros sincronizados: {}", synced);
            println!("Registros huerfanos eliminados: {}", removed);
        }
    }

    Ok(())
}
