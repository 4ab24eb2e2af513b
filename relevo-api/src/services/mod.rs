//! Application services for relevo-api

pub mod audit;
pub mod csv_export;
pub mod notifier;
pub mod storage;
