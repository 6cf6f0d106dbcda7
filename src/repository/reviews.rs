//! Reviews repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{db_err, Entity, Repository};
use crate::{
    error::AppResult,
    models::review::{Review, ReviewLookup, UpdateReview},
};

#[derive(Clone)]
pub struct PgReviewsRepository {
    pool: Pool<Postgres>,
}

impl PgReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn select_where(&self, lookup: &ReviewLookup, limit: i64) -> AppResult<Vec<Review>> {
        let (place_id, user_id) = match lookup {
            ReviewLookup::Place(place_id) => (Some(*place_id), None),
            ReviewLookup::Author(user_id) => (None, Some(*user_id)),
            ReviewLookup::AuthorAndPlace { user_id, place_id } => (Some(*place_id), Some(*user_id)),
        };
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE ($1::uuid IS NULL OR place_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at, id
            LIMIT $3
            "#,
        )
        .bind(place_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }
}

#[async_trait]
impl Repository<Review> for PgReviewsRepository {
    async fn add(&self, review: Review) -> AppResult<Review> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, text, rating, place_id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(review.id)
        .bind(&review.text)
        .bind(review.rating)
        .bind(review.place_id)
        .bind(review.user_id)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err::<Review>)?;
        Ok(review)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn get_all(&self) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>("SELECT * FROM reviews ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(reviews)
    }

    async fn get_by_attribute(&self, lookup: &ReviewLookup) -> AppResult<Option<Review>> {
        Ok(self.select_where(lookup, 1).await?.into_iter().next())
    }

    async fn filter_by_attribute(&self, lookup: &ReviewLookup) -> AppResult<Vec<Review>> {
        self.select_where(lookup, i64::MAX).await
    }

    async fn update(&self, id: Uuid, patch: UpdateReview) -> AppResult<Option<Review>> {
        let mut tx = self.pool.begin().await.map_err(db_err::<Review>)?;

        let Some(mut review) = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err::<Review>)?
        else {
            return Ok(None);
        };

        review.apply(patch)?;

        sqlx::query("UPDATE reviews SET text = $2, rating = $3, updated_at = $4 WHERE id = $1")
            .bind(id)
            .bind(&review.text)
            .bind(review.rating)
            .bind(review.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err::<Review>)?;

        tx.commit().await.map_err(db_err::<Review>)?;
        Ok(Some(review))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err::<Review>)?;
        Ok(result.rows_affected() > 0)
    }
}
