//! API handlers for HBnB REST endpoints

pub mod amenities;
pub mod auth;
pub mod health;
pub mod places;
pub mod reviews;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = state.services.auth.verify_token(token)?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Amenities
        .route(
            "/amenities",
            get(amenities::list_amenities).post(amenities::create_amenity),
        )
        .route(
            "/amenities/:id",
            get(amenities::get_amenity)
                .put(amenities::update_amenity)
                .delete(amenities::delete_amenity),
        )
        // Places
        .route("/places", get(places::list_places).post(places::create_place))
        .route(
            "/places/:id",
            get(places::get_place)
                .put(places::update_place)
                .delete(places::delete_place),
        )
        .route("/places/:id/reviews", get(places::list_place_reviews))
        // Reviews
        .route("/reviews", get(reviews::list_reviews).post(reviews::create_review))
        .route(
            "/reviews/:id",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
