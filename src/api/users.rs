//! User management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
};

use super::AuthenticatedUser;

pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    let users = state.services.facade.get_all_users().await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    let user = state
        .services
        .facade
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found", id)))?;
    Ok(Json(user))
}

/// Create a new user (admin only)
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(user): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    claims.require_admin()?;
    user.validate()?;

    let created = state.services.facade.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a user. Users may edit their own names; email, password and
/// admin flag are reserved to administrators.
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(user): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    claims.require_self_or_admin(id)?;
    if user.touches_privileged_fields() {
        claims.require_admin()?;
    }
    user.validate()?;

    let updated = state.services.facade.update_user(id, user).await?;
    Ok(Json(updated))
}

/// Delete a user and everything they own (admin only)
pub async fn delete_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.facade.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
