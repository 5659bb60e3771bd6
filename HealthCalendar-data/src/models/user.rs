use serde::{Deserialize, Serialize};

/// Storage model for a registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identifier for the user
    pub id: String,

    /// Login name
    pub username: String,

    /// Email address, unique across users
    pub email: String,

    /// Argon2 PHC string
    pub password_hash: String,

    /// RFC 3339 creation timestamp
    pub created_at: String,

    /// Age in years
    pub age: Option<u32>,

    /// Sex as entered on the profile (male, female, other)
    pub sex: Option<String>,

    /// Free-text location
    pub location: Option<String>,

    /// Free-text known conditions
    pub conditions: Option<String>,

    /// Last submitted health assessment, stored as JSON
    pub health_data: Option<serde_json::Value>,

    /// RFC 3339 timestamp of the last assessment submission
    pub last_health_update: Option<String>,
}

/// Input data for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Profile fields that can be changed after registration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdateRecord {
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub location: Option<String>,
    pub conditions: Option<String>,
}
