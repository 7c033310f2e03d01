//! User administration models

use chrono::{DateTime, Utc};
use domain::{Category, GrantSet, Principal, Role};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

/// User row joined with its category grants
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub identity: Option<String>,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<String>,
}

/// User as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub identity: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<Category>,
}

impl UserResponse {
    pub fn principal(&self) -> Principal {
        Principal::new(
            self.role,
            self.active,
            self.categories.iter().copied().collect(),
        )
    }
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        let role = row.role.parse().unwrap_or_else(|_| {
            warn!("User {} has unknown role {:?}, treating as user", row.id, row.role);
            Role::User
        });

        Self {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            identity: row.identity,
            role,
            active: row.active,
            created_at: row.created_at,
            categories: GrantSet::from_codes(&row.categories).iter().collect(),
        }
    }
}

/// Request for creating a user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    pub identity: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
    pub password: Option<String>,
    pub confirm: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

fn default_active() -> bool {
    true
}

/// Request for updating a user
///
/// Absent `role`, `active` and `categories` keep their current values; an
/// absent or empty `password` keeps the current password.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    pub identity: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub password: Option<String>,
    pub confirm: Option<String>,
    pub categories: Option<Vec<String>>,
}

/// Request for setting a user's password
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
    pub confirm: Option<String>,
}

/// Validated values written to the `users` table
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub username: String,
    pub full_name: String,
    pub identity: Option<String>,
    pub role: Role,
    pub active: bool,
    /// `None` keeps the stored hash on update
    pub password_hash: Option<String>,
    pub grants: GrantSet,
}

/// Grants persisted for `role`: only plain users keep a category list
pub fn grants_for(role: Role, codes: &[String]) -> GrantSet {
    if role == Role::User {
        GrantSet::from_codes(codes)
    } else {
        GrantSet::new()
    }
}
