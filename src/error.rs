//! Error types for the HBnB server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    NotAuthorized = 3,
    NoSuchResource = 4,
    BadValue = 5,
    Duplicate = 6,
    RuleViolation = 7,
    StoreBusy = 8,
    DbFailure = 9,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Transaction lost a race inside the store; the caller may retry.
    #[error("Store contention: {0}")]
    Contention(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Contention(_))
    }

    fn parts(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchResource),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::BusinessRule(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::RuleViolation)
            }
            AppError::Contention(_) => (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::StoreBusy),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid ({})", field, e.code),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::BusinessRule(msg)
            | AppError::Contention(msg) => msg.clone(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
