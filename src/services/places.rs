//! Place operations

use uuid::Uuid;

use super::{not_found, Facade};
use crate::{
    error::{AppError, AppResult},
    models::{
        Amenity, CreatePlace, Place, PlaceDetails, ReviewLookup, UpdatePlace, User,
    },
};

impl Facade {
    pub async fn create_place(&self, data: CreatePlace) -> AppResult<Place> {
        let owner_id = data
            .owner_id
            .ok_or_else(|| AppError::Validation("Place owner is required".to_string()))?;

        let _writes = self.exclusive().await;
        self.require_owner(owner_id).await?;
        self.resolve_amenities(&data.amenity_ids).await?;

        let place = Place::new(data, owner_id)?;
        let place = self.repos.places.add(place).await?;

        tracing::info!("Created place {} for owner {}", place.id, owner_id);
        Ok(place)
    }

    pub async fn get_place(&self, id: Uuid) -> AppResult<Option<Place>> {
        self.repos.places.get(id).await
    }

    /// Place with owner, amenities and reviews resolved
    pub async fn get_place_details(&self, id: Uuid) -> AppResult<Option<PlaceDetails>> {
        let _writes = self.shared().await;
        let Some(place) = self.get_place(id).await? else {
            return Ok(None);
        };

        let owner = self.get_user(place.owner_id).await?.map(|u| u.summary());
        let mut amenities = Vec::with_capacity(place.amenity_ids.len());
        for amenity_id in &place.amenity_ids {
            if let Some(amenity) = self.get_amenity(*amenity_id).await? {
                amenities.push(amenity);
            }
        }
        let reviews = self
            .repos
            .reviews
            .filter_by_attribute(&ReviewLookup::Place(id))
            .await?;

        Ok(Some(PlaceDetails {
            place,
            owner,
            amenities,
            reviews,
        }))
    }

    pub async fn get_all_places(&self) -> AppResult<Vec<Place>> {
        self.repos.places.get_all().await
    }

    /// Patch a place. A new owner must exist and must not have reviewed it.
    pub async fn update_place(&self, id: Uuid, data: UpdatePlace) -> AppResult<Place> {
        let _writes = self.exclusive().await;
        let current = self.require_place(id).await?;
        if let Some(owner_id) = data.owner_id.filter(|owner_id| *owner_id != current.owner_id) {
            self.require_owner(owner_id).await?;
            let reviewed = self
                .repos
                .reviews
                .get_by_attribute(&ReviewLookup::AuthorAndPlace {
                    user_id: owner_id,
                    place_id: id,
                })
                .await?;
            if reviewed.is_some() {
                return Err(AppError::BusinessRule(format!(
                    "User {} has reviewed this place and cannot own it",
                    owner_id
                )));
            }
        }
        if let Some(amenity_ids) = &data.amenity_ids {
            self.resolve_amenities(amenity_ids).await?;
        }

        let place = self
            .repos
            .places
            .update(id, data)
            .await?
            .ok_or_else(|| not_found::<Place>(id))?;

        tracing::info!("Updated place {}", id);
        Ok(place)
    }

    /// Delete a place and every review written about it
    pub async fn delete_place(&self, id: Uuid) -> AppResult<()> {
        let _writes = self.exclusive().await;
        self.remove_place(id).await
    }

    /// Cascade delete; the caller holds the write guard
    pub(super) async fn remove_place(&self, id: Uuid) -> AppResult<()> {
        self.require_place(id).await?;

        for review in self
            .repos
            .reviews
            .filter_by_attribute(&ReviewLookup::Place(id))
            .await?
        {
            self.repos.reviews.delete(review.id).await?;
        }

        if !self.repos.places.delete(id).await? {
            return Err(not_found::<Place>(id));
        }

        tracing::info!("Deleted place {}", id);
        Ok(())
    }

    pub(super) async fn require_place(&self, id: Uuid) -> AppResult<Place> {
        self.get_place(id).await?.ok_or_else(|| not_found::<Place>(id))
    }

    async fn require_owner(&self, owner_id: Uuid) -> AppResult<User> {
        self.get_user(owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Owner with ID {} not found", owner_id)))
    }

    async fn resolve_amenities(&self, ids: &[Uuid]) -> AppResult<Vec<Amenity>> {
        let mut amenities = Vec::with_capacity(ids.len());
        for id in ids {
            amenities.push(self.require_amenity(*id).await?);
        }
        Ok(amenities)
    }
}
