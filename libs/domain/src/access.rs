//! Access policy for inventory categories
//!
//! A user may work on a category when the account is active and either its
//! role bypasses grants (`admin`, `all`) or a grant for that category exists.
//! User management is reserved to the `admin` role.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{category::Category, role::Role};

/// Source of per-category grants for a user
pub trait PermissionSource {
    /// Whether a grant exists for `category`
    fn has_grant(&self, category: Category) -> bool;
}

/// Set of categories granted to a user, built from grant rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSet(BTreeSet<Category>);

impl GrantSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category) -> bool {
        self.0.insert(category)
    }

    pub fn remove(&mut self, category: Category) -> bool {
        self.0.remove(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.iter().copied()
    }

    /// Build a grant set from raw category codes, skipping unknown codes
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .filter_map(|code| Category::parse_lenient(code.as_ref()))
            .collect()
    }
}

impl FromIterator<Category> for GrantSet {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl PermissionSource for GrantSet {
    fn has_grant(&self, category: Category) -> bool {
        self.0.contains(&category)
    }
}

/// Decide whether a user may operate on `category`.
///
/// `category` is matched case-insensitively after trimming; empty or unknown
/// codes never match a grant.
pub fn can_access<P>(role: Role, active: bool, grants: &P, category: &str) -> bool
where
    P: PermissionSource + ?Sized,
{
    if !active {
        return false;
    }

    if role.bypasses_grants() {
        return true;
    }

    match Category::parse_lenient(category) {
        Some(category) => grants.has_grant(category),
        None => false,
    }
}

/// Whether the user may perform administrative actions
pub fn is_admin(role: Role, active: bool) -> bool {
    active && role == Role::Admin
}

/// An authenticated user as seen by the access policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub role: Role,
    pub active: bool,
    pub grants: GrantSet,
}

impl Principal {
    pub fn new(role: Role, active: bool, grants: GrantSet) -> Self {
        Self {
            role,
            active,
            grants,
        }
    }

    pub fn can_access(&self, category: &str) -> bool {
        can_access(self.role, self.active, &self.grants, category)
    }

    pub fn can_access_category(&self, category: Category) -> bool {
        self.can_access(category.code())
    }

    pub fn is_admin(&self) -> bool {
        is_admin(self.role, self.active)
    }

    /// Categories this user can open, in display order
    pub fn accessible_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| self.can_access_category(*category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grants(codes: &[&str]) -> GrantSet {
        GrantSet::from_codes(codes.iter().copied())
    }

    #[test]
    fn test_bypass_roles_ignore_grants() {
        for role in [Role::Admin, Role::All] {
            let user = Principal::new(role, true, GrantSet::new());
            for category in Category::ALL {
                assert!(user.can_access_category(category));
            }
            // Even malformed input is allowed for bypass roles
            assert!(user.can_access(""));
        }
    }

    #[test]
    fn test_user_role_requires_grant() {
        let mut user = Principal::new(Role::User, true, grants(&["CL2"]));
        assert!(user.can_access("CL2"));
        assert!(user.can_access(" cl2 "));
        assert!(!user.can_access("CL6"));

        user.grants.remove(Category::Cl2);
        assert!(!user.can_access("CL2"));
    }

    #[test]
    fn test_user_role_denies_malformed_category() {
        let user = Principal::new(Role::User, true, grants(&["CL2", "CL6", "CL7"]));
        assert!(!user.can_access(""));
        assert!(!user.can_access("   "));
        assert!(!user.can_access("CL 2"));
    }

    #[test]
    fn test_inactive_users_are_always_denied() {
        for role in [Role::Admin, Role::All, Role::User] {
            let user = Principal::new(role, false, grants(&["CL2", "CL6", "CL7"]));
            for category in Category::ALL {
                assert!(!user.can_access_category(category));
            }
            assert!(!user.is_admin());
        }
    }

    #[test]
    fn test_is_admin_only_for_admin_role() {
        assert!(Principal::new(Role::Admin, true, GrantSet::new()).is_admin());
        assert!(!Principal::new(Role::All, true, GrantSet::new()).is_admin());
        assert!(!Principal::new(Role::User, true, grants(&["CL2"])).is_admin());
    }

    #[test]
    fn test_from_codes_skips_unknown() {
        let set = grants(&["cl7", "bogus", "CL2", ""]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Category::Cl2, Category::Cl7]);
    }

    #[test]
    fn test_accessible_categories_follow_grants() {
        let user = Principal::new(Role::User, true, grants(&["CL7", "CL2"]));
        assert_eq!(
            user.accessible_categories(),
            vec![Category::Cl2, Category::Cl7]
        );
    }
}
