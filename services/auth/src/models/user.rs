//! User model as seen by the authentication service

use chrono::{DateTime, Utc};
use domain::Role;
use serde::Deserialize;

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// User login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    /// Login name with surrounding whitespace removed
    pub fn login_name(&self) -> &str {
        self.username.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_name_is_trimmed() {
        let credentials: LoginCredentials =
            serde_json::from_str(r#"{"username": "  maria ", "password": " p "}"#).unwrap();
        assert_eq!(credentials.login_name(), "maria");
        // The password is taken verbatim
        assert_eq!(credentials.password, " p ");
    }
}
