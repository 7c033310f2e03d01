//! User roles

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::DomainError;

/// Role assigned to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative and data access
    Admin,
    /// Access to every category, no administration
    All,
    /// Access only to granted categories
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::All => "all",
            Role::User => "user",
        }
    }

    /// Whether this role bypasses category grants
    pub fn bypasses_grants(&self) -> bool {
        matches!(self, Role::Admin | Role::All)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "all" => Ok(Role::All),
            "user" => Ok(Role::User),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_text() {
        for role in [Role::Admin, Role::All, Role::User] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_names_are_case_sensitive() {
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_admin_and_all_bypass_grants() {
        assert!(Role::Admin.bypasses_grants());
        assert!(Role::All.bypasses_grants());
        assert!(!Role::User.bypasses_grants());
    }
}
