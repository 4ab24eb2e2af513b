//! Database access layer shared by the Relevo services

pub mod init;
pub mod models;
pub mod succession_sync;

pub use init::{create_schema, init_database};
pub use succession_sync::{check_integrity, clean_orphaned_records, sync_missing_plans, IntegrityReport};
