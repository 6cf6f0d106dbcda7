//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{db_err, Entity, Repository};
use crate::{
    error::AppResult,
    models::user::{User, UserLookup, UserPatch},
};

#[derive(Clone)]
pub struct PgUsersRepository {
    pool: Pool<Postgres>,
}

impl PgUsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn select_where(&self, lookup: &UserLookup, limit: i64) -> AppResult<Vec<User>> {
        let rows = match lookup {
            UserLookup::Email(email) => {
                sqlx::query_as::<_, User>(
                    "SELECT * FROM users WHERE LOWER(email) = LOWER($1) ORDER BY created_at, id LIMIT $2",
                )
                .bind(email)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }
}

#[async_trait]
impl Repository<User> for PgUsersRepository {
    async fn add(&self, user: User) -> AppResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, is_admin, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err::<User>)?;
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_all(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn get_by_attribute(&self, lookup: &UserLookup) -> AppResult<Option<User>> {
        Ok(self.select_where(lookup, 1).await?.into_iter().next())
    }

    async fn filter_by_attribute(&self, lookup: &UserLookup) -> AppResult<Vec<User>> {
        self.select_where(lookup, i64::MAX).await
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> AppResult<Option<User>> {
        let mut tx = self.pool.begin().await.map_err(db_err::<User>)?;

        let Some(mut user) = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err::<User>)?
        else {
            return Ok(None);
        };

        user.apply(patch)?;

        sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, password_hash = $5,
                is_admin = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err::<User>)?;

        tx.commit().await.map_err(db_err::<User>)?;
        Ok(Some(user))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err::<User>)?;
        Ok(result.rows_affected() > 0)
    }
}
