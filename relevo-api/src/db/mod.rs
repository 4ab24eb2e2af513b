//! Repositories over the shared SQLite pool
//!
//! One module per resource; each returns the typed models from
//! `relevo_common::db::models`.

pub mod actions;
pub mod audit;
pub mod employees;
pub mod evidence;
pub mod plans;
pub mod succession;
pub mod users;
