//! Amenity model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::{error::AppResult, repository::Entity};

/// Amenity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct Amenity {
    pub id: Uuid,
    #[validate(length(min = 1, max = 50, message = "Amenity name must be between 1 and 50 characters"))]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Amenity {
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let now = super::now();
        let amenity = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        };
        amenity.validate()?;
        Ok(amenity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmenityLookup {
    Name(String),
}

impl std::fmt::Display for AmenityLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmenityLookup::Name(name) => write!(f, "name {}", name),
        }
    }
}

impl Entity for Amenity {
    type Patch = UpdateAmenity;
    type Lookup = AmenityLookup;

    const KIND: &'static str = "Amenity";

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, patch: UpdateAmenity) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name;
        }
        next.validate()?;
        next.updated_at = super::now();
        *self = next;
        Ok(())
    }

    fn matches(&self, lookup: &AmenityLookup) -> bool {
        match lookup {
            AmenityLookup::Name(name) => self.name.to_lowercase() == name.to_lowercase(),
        }
    }

    fn unique_keys(&self) -> Vec<AmenityLookup> {
        vec![AmenityLookup::Name(self.name.clone())]
    }
}

/// Create amenity request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAmenity {
    pub name: String,
}

/// Update amenity request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAmenity {
    pub name: Option<String>,
}
