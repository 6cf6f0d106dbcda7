//! Business logic services

pub mod amenities;
pub mod auth;
pub mod places;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::AppError,
    repository::{Entity, Repositories},
};

/// Use-case API over the four entity repositories.
///
/// Every foreign key is resolved against its repository before an entity is
/// built or patched, and cascades keep derived relationships consistent.
///
/// Repositories lock independently, so every mutation holds `writes`
/// exclusively from its first reference check to its last write. Reads
/// spanning several repositories hold it shared.
#[derive(Clone)]
pub struct Facade {
    repos: Repositories,
    writes: Arc<RwLock<()>>,
}

impl Facade {
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            writes: Arc::new(RwLock::new(())),
        }
    }

    async fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.writes.write().await
    }

    async fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.writes.read().await
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub facade: Facade,
    pub auth: auth::AuthService,
}

impl Services {
    pub fn new(repos: Repositories, auth_config: AuthConfig) -> Self {
        let facade = Facade::new(repos);
        Self {
            auth: auth::AuthService::new(facade.clone(), auth_config),
            facade,
        }
    }
}

fn not_found<T: Entity>(id: Uuid) -> AppError {
    AppError::NotFound(format!("{} with ID {} not found", T::KIND, id))
}
