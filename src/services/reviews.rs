//! Review operations

use uuid::Uuid;

use super::{not_found, Facade};
use crate::{
    error::{AppError, AppResult},
    models::{CreateReview, Review, ReviewLookup, UpdateReview},
};

impl Facade {
    /// Record a review. A user may review a place once, and never their own.
    pub async fn create_review(&self, data: CreateReview) -> AppResult<Review> {
        let user_id = data
            .user_id
            .ok_or_else(|| AppError::Validation("Review author is required".to_string()))?;

        let _writes = self.exclusive().await;
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found", user_id)))?;
        let place = self
            .get_place(data.place_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Place with ID {} not found", data.place_id)))?;

        if place.owner_id == user_id {
            return Err(AppError::BusinessRule(
                "You cannot review your own place".to_string(),
            ));
        }

        let existing = self
            .repos
            .reviews
            .get_by_attribute(&ReviewLookup::AuthorAndPlace {
                user_id,
                place_id: place.id,
            })
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "You have already reviewed this place".to_string(),
            ));
        }

        let review = Review::new(data.text, data.rating, place.id, user_id)?;
        let review = self.repos.reviews.add(review).await?;

        tracing::info!("User {} reviewed place {}", user_id, place.id);
        Ok(review)
    }

    pub async fn get_review(&self, id: Uuid) -> AppResult<Option<Review>> {
        self.repos.reviews.get(id).await
    }

    pub async fn get_all_reviews(&self) -> AppResult<Vec<Review>> {
        self.repos.reviews.get_all().await
    }

    /// Reviews of one place; `NotFound` when the place itself is unknown
    pub async fn get_reviews_by_place(&self, place_id: Uuid) -> AppResult<Vec<Review>> {
        let _writes = self.shared().await;
        self.require_place(place_id).await?;
        self.repos
            .reviews
            .filter_by_attribute(&ReviewLookup::Place(place_id))
            .await
    }

    pub async fn update_review(&self, id: Uuid, data: UpdateReview) -> AppResult<Review> {
        let _writes = self.exclusive().await;
        let review = self
            .repos
            .reviews
            .update(id, data)
            .await?
            .ok_or_else(|| not_found::<Review>(id))?;

        tracing::info!("Updated review {}", id);
        Ok(review)
    }

    pub async fn delete_review(&self, id: Uuid) -> AppResult<()> {
        let _writes = self.exclusive().await;
        if !self.repos.reviews.delete(id).await? {
            return Err(not_found::<Review>(id));
        }
        tracing::info!("Deleted review {}", id);
        Ok(())
    }
}
