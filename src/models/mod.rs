//! Data models for HBnB

pub mod amenity;
pub mod place;
pub mod review;
pub mod user;

use chrono::{DateTime, SubsecRound, Utc};

// Re-export commonly used types
pub use amenity::{Amenity, AmenityLookup, CreateAmenity, UpdateAmenity};
pub use place::{CreatePlace, Place, PlaceDetails, PlaceLookup, UpdatePlace};
pub use review::{CreateReview, Review, ReviewLookup, UpdateReview};
pub use user::{CreateUser, UpdateUser, User, UserClaims, UserLookup, UserPatch, UserSummary};

/// Current time at the precision the database keeps (microseconds), so an
/// entity read back from PostgreSQL compares equal to the one written.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
