//! Place endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        place::{CreatePlace, Place, PlaceDetails, UpdatePlace},
        review::Review,
    },
};

use super::AuthenticatedUser;

pub async fn list_places(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Place>>> {
    let places = state.services.facade.get_all_places().await?;
    Ok(Json(places))
}

/// Place with owner, amenities and reviews
pub async fn get_place(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PlaceDetails>> {
    let place = state
        .services
        .facade
        .get_place_details(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Place with ID {} not found", id)))?;
    Ok(Json(place))
}

/// Create a place owned by the caller. Admins may name another owner.
pub async fn create_place(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(mut place): Json<CreatePlace>,
) -> AppResult<(StatusCode, Json<Place>)> {
    match place.owner_id {
        Some(owner_id) => claims.require_self_or_admin(owner_id)?,
        None => place.owner_id = Some(claims.user_id()?),
    }

    let created = state.services.facade.create_place(place).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a place (owner or admin). Only admins may transfer ownership.
pub async fn update_place(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdatePlace>,
) -> AppResult<Json<Place>> {
    let current = load(&state, id).await?;
    claims.require_self_or_admin(current.owner_id)?;
    if patch.owner_id.is_some_and(|owner_id| owner_id != current.owner_id) {
        claims.require_admin()?;
    }

    let updated = state.services.facade.update_place(id, patch).await?;
    Ok(Json(updated))
}

pub async fn delete_place(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let current = load(&state, id).await?;
    claims.require_self_or_admin(current.owner_id)?;

    state.services.facade.delete_place(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_place_reviews(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = state.services.facade.get_reviews_by_place(id).await?;
    Ok(Json(reviews))
}

async fn load(state: &crate::AppState, id: Uuid) -> AppResult<Place> {
    state
        .services
        .facade
        .get_place(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Place with ID {} not found", id)))
}
