//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{User, UserSummary},
};

use super::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserSummary,
}

/// Exchange credentials for a bearer token
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request.validate()?;

    let (token, user) = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        user: user.summary(),
    }))
}

/// Current user profile
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state
        .services
        .facade
        .get_user(claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::Authentication("Account no longer exists".to_string()))?;
    Ok(Json(user))
}
