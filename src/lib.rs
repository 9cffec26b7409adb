//! Lendable equipment lending server
//!
//! REST JSON API for lending equipment to borrowers, with staff approval
//! and a return workflow that assesses late and damage fines before the
//! equipment is put back in stock.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod reconciliation;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
