//! Perpus school library circulation server
//!
//! Members borrow books, admins process returns, and late returns suspend
//! borrowing for a fixed window. Data lives in a schemaless document store
//! (PostgreSQL JSONB or in memory) behind a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
