//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    repository::Entity,
};

/// Full user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct User {
    pub id: Uuid,
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters"))]
    pub last_name: String,
    #[validate(
        length(max = 120, message = "Email must be at most 120 characters"),
        contains(pattern = "@", message = "Email must contain '@'")
    )]
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a validated user. The password must already be hashed.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        is_admin: bool,
    ) -> AppResult<Self> {
        let now = super::now();
        let user = Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_admin,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        Ok(user)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Updatable user fields. The password is carried hashed.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}

/// Attributes a user can be looked up by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Email(String),
}

impl std::fmt::Display for UserLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserLookup::Email(email) => write!(f, "email {}", email),
        }
    }
}

impl Entity for User {
    type Patch = UserPatch;
    type Lookup = UserLookup;

    const KIND: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, patch: UserPatch) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(first_name) = patch.first_name {
            next.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            next.last_name = last_name;
        }
        if let Some(email) = patch.email {
            next.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            next.password_hash = password_hash;
        }
        if let Some(is_admin) = patch.is_admin {
            next.is_admin = is_admin;
        }
        next.validate()?;
        next.updated_at = super::now();
        *self = next;
        Ok(())
    }

    fn matches(&self, lookup: &UserLookup) -> bool {
        match lookup {
            UserLookup::Email(email) => self.email.to_lowercase() == email.to_lowercase(),
        }
    }

    fn unique_keys(&self) -> Vec<UserLookup> {
        vec![UserLookup::Email(self.email.clone())]
    }
}

/// Public owner/author view embedded in other resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Update user request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

impl UpdateUser {
    /// Fields only an administrator may change
    pub fn touches_privileged_fields(&self) -> bool {
        self.email.is_some() || self.password.is_some() || self.is_admin.is_some()
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User id
    pub sub: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn user_id(&self) -> AppResult<Uuid> {
        self.sub
            .parse()
            .map_err(|_| AppError::Authentication("Malformed token subject".to_string()))
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin privileges required".to_string()))
        }
    }

    /// Require the caller to be `owner_id` or an admin
    pub fn require_self_or_admin(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.is_admin || self.user_id()? == owner_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You can only modify your own resources".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new("Ada", "Lovelace", "ada@example.com", "hash", false).unwrap()
    }

    #[test]
    fn test_new_user_keeps_inputs() {
        let user = sample();
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, "Lovelace");
        assert_eq!(user.email, "ada@example.com");
        assert!(!user.is_admin);
        assert_eq!(user.created_at, user.updated_at);
        assert!(!user.id.is_nil());
    }

    #[test]
    fn test_name_length_limits() {
        let fifty = "a".repeat(50);
        assert!(User::new(&fifty, &fifty, "a@x.com", "h", false).is_ok());
        let err = User::new("a".repeat(51), "b", "a@x.com", "h", false).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(User::new("a", "b".repeat(51), "a@x.com", "h", false).is_err());
        assert!(User::new("", "b", "a@x.com", "h", false).is_err());
    }

    #[test]
    fn test_email_requires_at_sign() {
        let err = User::new("a", "b", "not-an-email", "h", false).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains('@')));
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn test_rejected_patch_leaves_user_untouched() {
        let mut user = sample();
        let before = user.clone();
        let patch = UserPatch {
            first_name: Some("Grace".into()),
            email: Some("broken".into()),
            ..Default::default()
        };
        assert!(user.apply(patch).is_err());
        assert_eq!(user, before);
    }

    #[test]
    fn test_patch_refreshes_updated_at() {
        let mut user = sample();
        let id = user.id;
        let created = user.created_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        user.apply(UserPatch {
            last_name: Some("Byron".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.last_name, "Byron");
        assert_eq!(user.created_at, created);
        assert!(user.updated_at > created);
    }

    #[test]
    fn test_email_lookup_ignores_case() {
        let user = sample();
        assert!(user.matches(&UserLookup::Email("ADA@example.com".into())));
        assert!(!user.matches(&UserLookup::Email("bob@example.com".into())));

        let accented = User::new("Zoë", "Brontë", "zoë@example.com", "hash", false).unwrap();
        assert!(accented.matches(&UserLookup::Email("ZOË@EXAMPLE.COM".into())));
    }

    #[test]
    fn test_claims_round_trip_and_roles() {
        let user = sample();
        let claims = UserClaims {
            sub: user.id.to_string(),
            is_admin: false,
            exp: Utc::now().timestamp() + 60,
            iat: Utc::now().timestamp(),
        };
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id().unwrap(), user.id);
        assert!(parsed.require_self_or_admin(user.id).is_ok());
        assert!(parsed.require_self_or_admin(Uuid::new_v4()).is_err());
        assert!(parsed.require_admin().is_err());
        assert!(UserClaims::from_token(&token, "other").is_err());
    }
}
