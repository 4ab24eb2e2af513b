//! HTTP API handlers for relevo-api

pub mod actions;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod employees;
pub mod evidence;
pub mod export;
pub mod health;
pub mod import;
pub mod plans;
pub mod succession;

pub use auth::{session_middleware, CurrentUser};
pub use health::health_routes;
