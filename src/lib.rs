//! HBnB Server
//!
//! A REST JSON API for short-term rentals: users list places, attach
//! amenities, and review the places they stayed at.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
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

impl AppState {
    pub fn new(config: AppConfig, repos: repository::Repositories) -> Self {
        let services = services::Services::new(repos, config.auth.clone());
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
