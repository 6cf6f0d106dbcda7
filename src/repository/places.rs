//! Places repository for database operations

use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use super::{db_err, Entity, Repository};
use crate::{
    error::AppResult,
    models::place::{Place, PlaceLookup, UpdatePlace},
};

/// Place columns plus the ordered amenity ids from the join table
const SELECT_PLACE: &str = r#"
    SELECT p.*,
           ARRAY(
               SELECT pa.amenity_id FROM place_amenities pa
               WHERE pa.place_id = p.id
               ORDER BY pa.position
           ) AS amenity_ids
    FROM places p
"#;

#[derive(Clone)]
pub struct PgPlacesRepository {
    pool: Pool<Postgres>,
}

impl PgPlacesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn select_where(&self, lookup: &PlaceLookup, limit: i64) -> AppResult<Vec<Place>> {
        let (clause, id) = match lookup {
            PlaceLookup::Owner(owner_id) => ("p.owner_id = $1", *owner_id),
            PlaceLookup::Amenity(amenity_id) => (
                "EXISTS (SELECT 1 FROM place_amenities pa WHERE pa.place_id = p.id AND pa.amenity_id = $1)",
                *amenity_id,
            ),
        };
        let query = format!("{SELECT_PLACE} WHERE {clause} ORDER BY p.created_at, p.id LIMIT $2");
        let places = sqlx::query_as::<_, Place>(&query)
            .bind(id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(places)
    }
}

/// Replace the join rows of `place` with its current amenity list
async fn write_amenities(conn: &mut PgConnection, place: &Place) -> AppResult<()> {
    sqlx::query("DELETE FROM place_amenities WHERE place_id = $1")
        .bind(place.id)
        .execute(&mut *conn)
        .await
        .map_err(db_err::<Place>)?;

    for (position, amenity_id) in place.amenity_ids.iter().enumerate() {
        sqlx::query("INSERT INTO place_amenities (place_id, amenity_id, position) VALUES ($1, $2, $3)")
            .bind(place.id)
            .bind(*amenity_id)
            .bind(position as i32)
            .execute(&mut *conn)
            .await
            .map_err(db_err::<Place>)?;
    }
    Ok(())
}

#[async_trait]
impl Repository<Place> for PgPlacesRepository {
    async fn add(&self, place: Place) -> AppResult<Place> {
        let mut tx = self.pool.begin().await.map_err(db_err::<Place>)?;

        sqlx::query(
            r#"
            INSERT INTO places (id, title, description, price, latitude, longitude, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(place.id)
        .bind(&place.title)
        .bind(&place.description)
        .bind(place.price)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(place.owner_id)
        .bind(place.created_at)
        .bind(place.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err::<Place>)?;

        write_amenities(&mut *tx, &place).await?;

        tx.commit().await.map_err(db_err::<Place>)?;
        Ok(place)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Place>> {
        let query = format!("{SELECT_PLACE} WHERE p.id = $1");
        let place = sqlx::query_as::<_, Place>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(place)
    }

    async fn get_all(&self) -> AppResult<Vec<Place>> {
        let query = format!("{SELECT_PLACE} ORDER BY p.created_at, p.id");
        let places = sqlx::query_as::<_, Place>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(places)
    }

    async fn get_by_attribute(&self, lookup: &PlaceLookup) -> AppResult<Option<Place>> {
        Ok(self.select_where(lookup, 1).await?.into_iter().next())
    }

    async fn filter_by_attribute(&self, lookup: &PlaceLookup) -> AppResult<Vec<Place>> {
        self.select_where(lookup, i64::MAX).await
    }

    async fn update(&self, id: Uuid, patch: UpdatePlace) -> AppResult<Option<Place>> {
        let mut tx = self.pool.begin().await.map_err(db_err::<Place>)?;

        let query = format!("{SELECT_PLACE} WHERE p.id = $1 FOR UPDATE OF p");
        let Some(mut place) = sqlx::query_as::<_, Place>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err::<Place>)?
        else {
            return Ok(None);
        };

        let amenities_changed = patch.amenity_ids.is_some();
        place.apply(patch)?;

        sqlx::query(
            r#"
            UPDATE places
            SET title = $2, description = $3, price = $4, latitude = $5,
                longitude = $6, owner_id = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&place.title)
        .bind(&place.description)
        .bind(place.price)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(place.owner_id)
        .bind(place.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err::<Place>)?;

        if amenities_changed {
            write_amenities(&mut *tx, &place).await?;
        }

        tx.commit().await.map_err(db_err::<Place>)?;
        Ok(Some(place))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // place_amenities and reviews rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err::<Place>)?;
        Ok(result.rows_affected() > 0)
    }
}
