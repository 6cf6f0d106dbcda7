//! Amenity operations

use uuid::Uuid;

use super::{not_found, Facade};
use crate::{
    error::{AppError, AppResult},
    models::{Amenity, AmenityLookup, CreateAmenity, PlaceLookup, UpdateAmenity, UpdatePlace},
};

impl Facade {
    pub async fn create_amenity(&self, data: CreateAmenity) -> AppResult<Amenity> {
        let amenity = Amenity::new(data.name)?;

        let _writes = self.exclusive().await;
        if self.get_amenity_by_name(&amenity.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Amenity {} already exists",
                amenity.name
            )));
        }

        let amenity = self.repos.amenities.add(amenity).await?;
        tracing::info!("Created amenity {} ({})", amenity.name, amenity.id);
        Ok(amenity)
    }

    pub async fn get_amenity(&self, id: Uuid) -> AppResult<Option<Amenity>> {
        self.repos.amenities.get(id).await
    }

    pub async fn get_amenity_by_name(&self, name: &str) -> AppResult<Option<Amenity>> {
        self.repos
            .amenities
            .get_by_attribute(&AmenityLookup::Name(name.to_string()))
            .await
    }

    pub async fn get_all_amenities(&self) -> AppResult<Vec<Amenity>> {
        self.repos.amenities.get_all().await
    }

    pub async fn update_amenity(&self, id: Uuid, data: UpdateAmenity) -> AppResult<Amenity> {
        let _writes = self.exclusive().await;
        self.require_amenity(id).await?;

        if let Some(name) = &data.name {
            if let Some(existing) = self.get_amenity_by_name(name).await? {
                if existing.id != id {
                    return Err(AppError::Conflict(format!("Amenity {} already exists", name)));
                }
            }
        }

        let amenity = self
            .repos
            .amenities
            .update(id, data)
            .await?
            .ok_or_else(|| not_found::<Amenity>(id))?;

        tracing::info!("Updated amenity {}", id);
        Ok(amenity)
    }

    /// Delete an amenity and detach it from every place offering it
    pub async fn delete_amenity(&self, id: Uuid) -> AppResult<()> {
        let _writes = self.exclusive().await;
        self.require_amenity(id).await?;

        let places = self
            .repos
            .places
            .filter_by_attribute(&PlaceLookup::Amenity(id))
            .await?;
        for place in places {
            let remaining = place
                .amenity_ids
                .iter()
                .copied()
                .filter(|amenity_id| *amenity_id != id)
                .collect();
            let patch = UpdatePlace {
                amenity_ids: Some(remaining),
                ..Default::default()
            };
            self.repos.places.update(place.id, patch).await?;
        }

        if !self.repos.amenities.delete(id).await? {
            return Err(not_found::<Amenity>(id));
        }

        tracing::info!("Deleted amenity {}", id);
        Ok(())
    }

    pub(super) async fn require_amenity(&self, id: Uuid) -> AppResult<Amenity> {
        self.get_amenity(id)
            .await?
            .ok_or_else(|| not_found::<Amenity>(id))
    }
}
