//! User operations

use uuid::Uuid;
use validator::Validate;

use super::{auth::AuthService, not_found, Facade};
use crate::{
    error::{AppError, AppResult},
    models::{CreateUser, Place, PlaceLookup, ReviewLookup, UpdateUser, User, UserLookup, UserPatch},
};

impl Facade {
    /// Register a new user; the email must not be taken (case-insensitive)
    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        data.validate()?;
        let password_hash = AuthService::hash_password(&data.password)?;

        let _writes = self.exclusive().await;
        if self.get_user_by_email(&data.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                data.email
            )));
        }

        let user = User::new(
            data.first_name,
            data.last_name,
            data.email,
            password_hash,
            data.is_admin,
        )?;
        let user = self.repos.users.add(user).await?;

        tracing::info!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        self.repos.users.get(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.repos
            .users
            .get_by_attribute(&UserLookup::Email(email.to_string()))
            .await
    }

    pub async fn get_all_users(&self) -> AppResult<Vec<User>> {
        self.repos.users.get_all().await
    }

    pub async fn update_user(&self, id: Uuid, data: UpdateUser) -> AppResult<User> {
        data.validate()?;
        let password_hash = data
            .password
            .as_deref()
            .map(AuthService::hash_password)
            .transpose()?;

        let _writes = self.exclusive().await;
        let current = self.require_user(id).await?;

        if let Some(email) = &data.email {
            if email.to_lowercase() != current.email.to_lowercase()
                && self.get_user_by_email(email).await?.is_some()
            {
                return Err(AppError::Conflict(format!(
                    "Email {} is already registered",
                    email
                )));
            }
        }

        let patch = UserPatch {
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            password_hash,
            is_admin: data.is_admin,
        };

        let user = self
            .repos
            .users
            .update(id, patch)
            .await?
            .ok_or_else(|| not_found::<User>(id))?;

        tracing::info!("Updated user {}", id);
        Ok(user)
    }

    /// Delete a user together with the reviews they wrote and the places
    /// they own (and those places' reviews)
    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let _writes = self.exclusive().await;
        self.require_user(id).await?;

        for place in self.get_places_by_owner(id).await? {
            self.remove_place(place.id).await?;
        }
        for review in self
            .repos
            .reviews
            .filter_by_attribute(&ReviewLookup::Author(id))
            .await?
        {
            self.repos.reviews.delete(review.id).await?;
        }

        if !self.repos.users.delete(id).await? {
            return Err(not_found::<User>(id));
        }

        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    pub async fn get_places_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Place>> {
        self.repos
            .places
            .filter_by_attribute(&PlaceLookup::Owner(owner_id))
            .await
    }

    pub(super) async fn require_user(&self, id: Uuid) -> AppResult<User> {
        self.get_user(id).await?.ok_or_else(|| not_found::<User>(id))
    }
}
