//! Review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::review::{CreateReview, Review, UpdateReview},
};

use super::AuthenticatedUser;

pub async fn list_reviews(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Review>>> {
    let reviews = state.services.facade.get_all_reviews().await?;
    Ok(Json(reviews))
}

pub async fn get_review(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Review>> {
    Ok(Json(load(&state, id).await?))
}

/// Review a place as the caller. Admins may write on behalf of another user.
pub async fn create_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(mut review): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    match review.user_id {
        Some(user_id) => claims.require_self_or_admin(user_id)?,
        None => review.user_id = Some(claims.user_id()?),
    }

    let created = state.services.facade.create_review(review).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateReview>,
) -> AppResult<Json<Review>> {
    let current = load(&state, id).await?;
    claims.require_self_or_admin(current.user_id)?;

    let updated = state.services.facade.update_review(id, patch).await?;
    Ok(Json(updated))
}

pub async fn delete_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let current = load(&state, id).await?;
    claims.require_self_or_admin(current.user_id)?;

    state.services.facade.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load(state: &crate::AppState, id: Uuid) -> AppResult<Review> {
    state
        .services
        .facade
        .get_review(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review with ID {} not found", id)))
}
