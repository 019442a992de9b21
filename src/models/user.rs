// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'users' table in the database.
///
/// Credentials live with the external identity provider; this table only
/// carries the public profile the platform renders.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    pub fullname: String,

    pub profile_img: String,

    pub bio: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Public profile projection joined into lists and notifications.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicProfile {
    pub username: String,
    pub fullname: String,
    pub profile_img: String,
}

/// DTO for username search.
#[derive(Debug, Deserialize)]
pub struct SearchUsersRequest {
    pub query: String,
}

/// DTO for fetching a profile page.
#[derive(Debug, Deserialize)]
pub struct GetProfileRequest {
    pub username: String,
}
