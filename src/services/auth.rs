//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use super::Facade;
use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, User, UserClaims},
};

#[derive(Clone)]
pub struct AuthService {
    facade: Facade,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(facade: Facade, config: AuthConfig) -> Self {
        Self { facade, config }
    }

    /// Hash a password using Argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored Argon2 hash
    pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Authenticate by email and password, returning a JWT access token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .facade
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !Self::verify_password(&user.password_hash, password)? {
            tracing::warn!("Failed login attempt for user {}", user.id);
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.issue_token(&user)?;
        tracing::info!("User {} logged in", user.id);
        Ok((token, user))
    }

    /// Create JWT token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.id.to_string(),
            is_admin: user.is_admin,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }

    /// Create the configured admin account when the user store is empty.
    ///
    /// This is the only way to obtain the first administrator: creating
    /// users through the API already requires an admin token.
    pub async fn bootstrap_admin(&self) -> AppResult<Option<User>> {
        let (Some(email), Some(password)) = (
            self.config.bootstrap_admin_email.clone(),
            self.config.bootstrap_admin_password.clone(),
        ) else {
            return Ok(None);
        };

        if !self.facade.get_all_users().await?.is_empty() {
            tracing::debug!("Users already present, skipping admin bootstrap");
            return Ok(None);
        }

        let admin = self
            .facade
            .create_user(CreateUser {
                first_name: "Admin".to_string(),
                last_name: "HBnB".to_string(),
                email,
                password,
                is_admin: true,
            })
            .await?;
        tracing::info!("Bootstrapped admin account {}", admin.email);
        Ok(Some(admin))
    }
}
