//! Amenities repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{db_err, Entity, Repository};
use crate::{
    error::AppResult,
    models::amenity::{Amenity, AmenityLookup, UpdateAmenity},
};

#[derive(Clone)]
pub struct PgAmenitiesRepository {
    pool: Pool<Postgres>,
}

impl PgAmenitiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Amenity> for PgAmenitiesRepository {
    async fn add(&self, amenity: Amenity) -> AppResult<Amenity> {
        sqlx::query("INSERT INTO amenities (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(amenity.id)
            .bind(&amenity.name)
            .bind(amenity.created_at)
            .bind(amenity.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_err::<Amenity>)?;
        Ok(amenity)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Amenity>> {
        let amenity = sqlx::query_as::<_, Amenity>("SELECT * FROM amenities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(amenity)
    }

    async fn get_all(&self) -> AppResult<Vec<Amenity>> {
        let amenities =
            sqlx::query_as::<_, Amenity>("SELECT * FROM amenities ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await?;
        Ok(amenities)
    }

    async fn get_by_attribute(&self, lookup: &AmenityLookup) -> AppResult<Option<Amenity>> {
        let amenity = match lookup {
            AmenityLookup::Name(name) => {
                sqlx::query_as::<_, Amenity>(
                    "SELECT * FROM amenities WHERE LOWER(name) = LOWER($1) LIMIT 1",
                )
                .bind(name)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(amenity)
    }

    async fn update(&self, id: Uuid, patch: UpdateAmenity) -> AppResult<Option<Amenity>> {
        let mut tx = self.pool.begin().await.map_err(db_err::<Amenity>)?;

        let Some(mut amenity) =
            sqlx::query_as::<_, Amenity>("SELECT * FROM amenities WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err::<Amenity>)?
        else {
            return Ok(None);
        };

        amenity.apply(patch)?;

        sqlx::query("UPDATE amenities SET name = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(&amenity.name)
            .bind(amenity.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err::<Amenity>)?;

        tx.commit().await.map_err(db_err::<Amenity>)?;
        Ok(Some(amenity))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM amenities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err::<Amenity>)?;
        Ok(result.rows_affected() > 0)
    }
}
