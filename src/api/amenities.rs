//! Amenity endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::amenity::{Amenity, CreateAmenity, UpdateAmenity},
};

use super::AuthenticatedUser;

pub async fn list_amenities(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Amenity>>> {
    let amenities = state.services.facade.get_all_amenities().await?;
    Ok(Json(amenities))
}

pub async fn get_amenity(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Amenity>> {
    let amenity = state
        .services
        .facade
        .get_amenity(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Amenity with ID {} not found", id)))?;
    Ok(Json(amenity))
}

pub async fn create_amenity(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(amenity): Json<CreateAmenity>,
) -> AppResult<(StatusCode, Json<Amenity>)> {
    claims.require_admin()?;

    let created = state.services.facade.create_amenity(amenity).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_amenity(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(amenity): Json<UpdateAmenity>,
) -> AppResult<Json<Amenity>> {
    claims.require_admin()?;

    let updated = state.services.facade.update_amenity(id, amenity).await?;
    Ok(Json(updated))
}

pub async fn delete_amenity(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.facade.delete_amenity(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
