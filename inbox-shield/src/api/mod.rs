//! REST API module for inbox-shield
//!
//! Provides HTTP endpoints for domain checks and reports

pub mod handlers;
pub mod server;

pub use handlers::{ApiError, AppState, CheckRequest};
pub use server::ApiServer;
