//! Review model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::{error::AppResult, repository::Entity};

/// Review record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct Review {
    pub id: Uuid,
    #[validate(length(min = 1, max = 1024, message = "Review text must be between 1 and 1024 characters"))]
    pub text: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(text: impl Into<String>, rating: i32, place_id: Uuid, user_id: Uuid) -> AppResult<Self> {
        let now = super::now();
        let review = Self {
            id: Uuid::new_v4(),
            text: text.into(),
            rating,
            place_id,
            user_id,
            created_at: now,
            updated_at: now,
        };
        review.validate()?;
        Ok(review)
    }
}

/// Attributes a review can be looked up by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewLookup {
    Place(Uuid),
    Author(Uuid),
    AuthorAndPlace { user_id: Uuid, place_id: Uuid },
}

impl std::fmt::Display for ReviewLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewLookup::Place(id) => write!(f, "place {}", id),
            ReviewLookup::Author(id) => write!(f, "author {}", id),
            ReviewLookup::AuthorAndPlace { user_id, place_id } => {
                write!(f, "author {} and place {}", user_id, place_id)
            }
        }
    }
}

impl Entity for Review {
    type Patch = UpdateReview;
    type Lookup = ReviewLookup;

    const KIND: &'static str = "Review";

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, patch: UpdateReview) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(text) = patch.text {
            next.text = text;
        }
        if let Some(rating) = patch.rating {
            next.rating = rating;
        }
        next.validate()?;
        next.updated_at = super::now();
        *self = next;
        Ok(())
    }

    fn matches(&self, lookup: &ReviewLookup) -> bool {
        match lookup {
            ReviewLookup::Place(place_id) => self.place_id == *place_id,
            ReviewLookup::Author(user_id) => self.user_id == *user_id,
            ReviewLookup::AuthorAndPlace { user_id, place_id } => {
                self.user_id == *user_id && self.place_id == *place_id
            }
        }
    }

    fn unique_keys(&self) -> Vec<ReviewLookup> {
        vec![ReviewLookup::AuthorAndPlace {
            user_id: self.user_id,
            place_id: self.place_id,
        }]
    }
}

/// Create review request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub text: String,
    pub rating: i32,
    pub place_id: Uuid,
    /// Filled from the caller's identity when omitted
    pub user_id: Option<Uuid>,
}

/// Update review request; author and place are fixed once written
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub text: Option<String>,
    pub rating: Option<i32>,
}
