//! Process-local repository

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Entity, Repository};
use crate::error::{AppError, AppResult};

/// Entities kept in insertion order behind a read/write lock.
///
/// Every mutation holds the write lock across its whole
/// read-check-write sequence, so interleaved requests cannot lose updates
/// or slip a duplicate unique key past the check.
pub struct InMemoryRepository<T: Entity> {
    items: RwLock<IndexMap<Uuid, T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(IndexMap::new()),
        }
    }

    fn check_unique(items: &IndexMap<Uuid, T>, candidate: &T) -> AppResult<()> {
        for key in candidate.unique_keys() {
            let taken = items
                .values()
                .any(|other| other.id() != candidate.id() && other.matches(&key));
            if taken {
                return Err(AppError::Conflict(format!(
                    "{} with {} already exists",
                    T::KIND,
                    key
                )));
            }
        }
        Ok(())
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn add(&self, obj: T) -> AppResult<T> {
        let mut items = self.items.write().await;
        if items.contains_key(&obj.id()) {
            return Err(AppError::Conflict(format!(
                "{} {} already exists",
                T::KIND,
                obj.id()
            )));
        }
        Self::check_unique(&items, &obj)?;
        items.insert(obj.id(), obj.clone());
        Ok(obj)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<T>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn get_all(&self) -> AppResult<Vec<T>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn get_by_attribute(&self, lookup: &T::Lookup) -> AppResult<Option<T>> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .find(|obj| obj.matches(lookup))
            .cloned())
    }

    async fn filter_by_attribute(&self, lookup: &T::Lookup) -> AppResult<Vec<T>> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|obj| obj.matches(lookup))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, patch: T::Patch) -> AppResult<Option<T>> {
        let mut items = self.items.write().await;
        let mut next = match items.get(&id) {
            Some(current) => current.clone(),
            None => return Ok(None),
        };
        next.apply(patch)?;
        Self::check_unique(&items, &next)?;
        // Existing key: IndexMap keeps its slot
        items.insert(id, next.clone());
        Ok(Some(next))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.items.write().await.shift_remove(&id).is_some())
    }
}
