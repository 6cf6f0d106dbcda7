//! Place model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{Amenity, Review, UserSummary};
use crate::{
    error::{AppError, AppResult},
    repository::Entity,
};

/// Place record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct Place {
    pub id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,
    #[validate(length(max = 1024, message = "Description must be at most 1024 characters"))]
    pub description: Option<String>,
    /// Nightly price, strictly positive
    pub price: f64,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    pub owner_id: Uuid,
    /// Referenced amenities, in the order they were attached
    pub amenity_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Build a validated place. References are not resolved here.
    pub fn new(data: CreatePlace, owner_id: Uuid) -> AppResult<Self> {
        let now = super::now();
        let place = Self {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            price: data.price,
            latitude: data.latitude,
            longitude: data.longitude,
            owner_id,
            amenity_ids: dedup(data.amenity_ids),
            created_at: now,
            updated_at: now,
        };
        place.check()?;
        Ok(place)
    }

    fn check(&self) -> AppResult<()> {
        self.validate()?;
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(AppError::Validation("Price must be a positive number".to_string()));
        }
        if !(self.latitude.is_finite() && self.longitude.is_finite()) {
            return Err(AppError::Validation("Coordinates must be finite".to_string()));
        }
        Ok(())
    }
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Attributes a place can be looked up by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceLookup {
    Owner(Uuid),
    Amenity(Uuid),
}

impl std::fmt::Display for PlaceLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceLookup::Owner(id) => write!(f, "owner {}", id),
            PlaceLookup::Amenity(id) => write!(f, "amenity {}", id),
        }
    }
}

impl Entity for Place {
    type Patch = UpdatePlace;
    type Lookup = PlaceLookup;

    const KIND: &'static str = "Place";

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, patch: UpdatePlace) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title;
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(price) = patch.price {
            next.price = price;
        }
        if let Some(latitude) = patch.latitude {
            next.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            next.longitude = longitude;
        }
        if let Some(owner_id) = patch.owner_id {
            next.owner_id = owner_id;
        }
        if let Some(amenity_ids) = patch.amenity_ids {
            next.amenity_ids = dedup(amenity_ids);
        }
        next.check()?;
        next.updated_at = super::now();
        *self = next;
        Ok(())
    }

    fn matches(&self, lookup: &PlaceLookup) -> bool {
        match lookup {
            PlaceLookup::Owner(owner_id) => self.owner_id == *owner_id,
            PlaceLookup::Amenity(amenity_id) => self.amenity_ids.contains(amenity_id),
        }
    }

    fn unique_keys(&self) -> Vec<PlaceLookup> {
        Vec::new()
    }
}

/// Create place request
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlace {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Filled from the caller's identity when omitted
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub amenity_ids: Vec<Uuid>,
}

/// Update place request; also the partial update applied to a stored place
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlace {
    pub title: Option<String>,
    /// Absent keeps the description; `null` clears it
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub owner_id: Option<Uuid>,
    pub amenity_ids: Option<Vec<Uuid>>,
}

/// Place with its references resolved
#[derive(Debug, Clone, Serialize)]
pub struct PlaceDetails {
    #[serde(flatten)]
    pub place: Place,
    pub owner: Option<UserSummary>,
    pub amenities: Vec<Amenity>,
    pub reviews: Vec<Review>,
}
