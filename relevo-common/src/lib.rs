//! Shared library for the Relevo succession-planning services
//!
//! Holds everything more than one binary needs: the error type,
//! configuration and root-folder resolution, database initialization and
//! typed row models, the continuity-risk classification rule, the
//! succession-table synchronization routines, and session helpers.

pub mod config;
pub mod db;
pub mod error;
pub mod risk;
pub mod session;

pub use error::{Error, Result};
