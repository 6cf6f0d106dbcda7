//! Repository layer: one storage-agnostic contract, two implementations

pub mod amenities;
pub mod memory;
pub mod places;
pub mod reviews;
pub mod users;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Amenity, Place, Review, User},
};

pub use memory::InMemoryRepository;

/// A domain record with identity, owned by a repository.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Partial update; its fields are the exhaustive list of updatable attributes
    type Patch: Send + 'static;
    /// Typed attribute lookup key
    type Lookup: fmt::Debug + fmt::Display + Send + Sync + 'static;

    const KIND: &'static str;

    fn id(&self) -> Uuid;

    /// Apply `patch` and refresh `updated_at`. On error `self` is unchanged.
    fn apply(&mut self, patch: Self::Patch) -> AppResult<()>;

    fn matches(&self, lookup: &Self::Lookup) -> bool;

    /// Lookups that must not match any other stored entity
    fn unique_keys(&self) -> Vec<Self::Lookup>;
}

/// Uniform CRUD access to one entity type's storage
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert a new entity. Fails with `Conflict` on a duplicate id or unique key.
    async fn add(&self, obj: T) -> AppResult<T>;

    async fn get(&self, id: Uuid) -> AppResult<Option<T>>;

    async fn get_all(&self) -> AppResult<Vec<T>>;

    /// First entity matching `lookup`
    async fn get_by_attribute(&self, lookup: &T::Lookup) -> AppResult<Option<T>>;

    /// Every entity matching `lookup`
    async fn filter_by_attribute(&self, lookup: &T::Lookup) -> AppResult<Vec<T>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|obj| obj.matches(lookup))
            .collect())
    }

    /// Apply a partial update atomically. `Ok(None)` when `id` is absent.
    async fn update(&self, id: Uuid, patch: T::Patch) -> AppResult<Option<T>>;

    /// Remove an entity, returning whether it existed
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// One repository per entity type
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn Repository<User>>,
    pub places: Arc<dyn Repository<Place>>,
    pub reviews: Arc<dyn Repository<Review>>,
    pub amenities: Arc<dyn Repository<Amenity>>,
}

impl Repositories {
    /// Process-local storage
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryRepository::<User>::new()),
            places: Arc::new(InMemoryRepository::<Place>::new()),
            reviews: Arc::new(InMemoryRepository::<Review>::new()),
            amenities: Arc::new(InMemoryRepository::<Amenity>::new()),
        }
    }

    /// PostgreSQL storage over a shared pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(users::PgUsersRepository::new(pool.clone())),
            places: Arc::new(places::PgPlacesRepository::new(pool.clone())),
            reviews: Arc::new(reviews::PgReviewsRepository::new(pool.clone())),
            amenities: Arc::new(amenities::PgAmenitiesRepository::new(pool)),
        }
    }
}

/// Normalize store errors into the domain taxonomy
pub(crate) fn db_err<T: Entity>(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => {
                return AppError::Conflict(format!("{} already exists", T::KIND));
            }
            Some("23503") => {
                return AppError::NotFound(format!("{} references a missing record", T::KIND));
            }
            Some("40001") | Some("40P01") => {
                return AppError::Contention(format!(
                    "{} was modified concurrently, retry the request",
                    T::KIND
                ));
            }
            _ => {}
        }
    }
    AppError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreatePlace, UpdatePlace};

    async fn pool() -> Pool<Postgres> {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("Failed to connect to database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations");
        pool
    }

    #[tokio::test]
    #[ignore] // Run with: DATABASE_URL=... cargo test -- --ignored
    async fn test_postgres_round_trip_and_unique_name() {
        let repos = Repositories::postgres(pool().await);
        let name = format!("Sauna {}", Uuid::new_v4().simple());
        let sauna = repos.amenities.add(Amenity::new(&name).unwrap()).await.unwrap();
        assert_eq!(repos.amenities.get(sauna.id).await.unwrap(), Some(sauna.clone()));

        let err = repos
            .amenities
            .add(Amenity::new(name.to_uppercase()).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        assert!(repos.amenities.delete(sauna.id).await.unwrap());
        assert!(repos.amenities.get(sauna.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore]
    async fn test_postgres_place_update_is_atomic() {
        let repos = Repositories::postgres(pool().await);
        let email = format!("{}@example.com", Uuid::new_v4().simple());
        let owner = repos.users.add(User::new("Pg", "Owner", email, "hash", false).unwrap()).await.unwrap();
        let wifi = repos
            .amenities
            .add(Amenity::new(format!("Wi-Fi {}", Uuid::new_v4().simple())).unwrap())
            .await
            .unwrap();
        let place = Place::new(
            CreatePlace {
                title: "Loft".into(),
                description: None,
                price: 100.0,
                latitude: 10.0,
                longitude: 10.0,
                owner_id: None,
                amenity_ids: vec![wifi.id],
            },
            owner.id,
        )
        .unwrap();
        let place = repos.places.add(place).await.unwrap();
        assert_eq!(repos.places.get(place.id).await.unwrap(), Some(place.clone()));

        let bad = UpdatePlace {
            price: Some(-5.0),
            amenity_ids: Some(Vec::new()),
            ..Default::default()
        };
        assert!(repos.places.update(place.id, bad).await.is_err());
        assert_eq!(repos.places.get(place.id).await.unwrap(), Some(place));

        assert!(repos.users.delete(owner.id).await.unwrap());
        repos.amenities.delete(wifi.id).await.unwrap();
    }
}
