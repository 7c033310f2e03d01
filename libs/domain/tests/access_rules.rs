//! End-to-end checks of the access and status rules as the services use them

use domain::{
    Category, CanonicalStatus, GrantSet, Principal, Role, normalize, summarize,
};

#[test]
fn test_every_active_bypass_role_reaches_every_category() {
    for role in [Role::Admin, Role::All] {
        let user = Principal::new(role, true, GrantSet::new());
        assert_eq!(user.accessible_categories(), Category::ALL.to_vec());
    }
}

#[test]
fn test_revoking_a_grant_takes_effect_immediately() {
    let mut grants = GrantSet::from_codes(["CL2", "CL6"]);
    let user = Principal::new(Role::User, true, grants.clone());
    assert!(user.can_access("cl6"));

    grants.remove(Category::Cl6);
    let user = Principal::new(Role::User, true, grants);
    assert!(!user.can_access("cl6"));
    assert!(user.can_access("cl2"));
}

#[test]
fn test_deactivated_admin_loses_everything() {
    let user = Principal::new(Role::Admin, false, GrantSet::new());
    assert!(user.accessible_categories().is_empty());
    assert!(!user.is_admin());
}

#[test]
fn test_all_role_is_not_admin() {
    let user = Principal::new(Role::All, true, GrantSet::new());
    assert!(user.can_access("CL7"));
    assert!(!user.is_admin());
}

#[test]
fn test_written_statuses_summarize_consistently() {
    let written: Vec<CanonicalStatus> = ["ok", "defeito", "emprestado", "em uso"]
        .into_iter()
        .map(|raw| normalize(Some(raw)))
        .collect();

    let summary = summarize(written.iter().map(CanonicalStatus::as_str));
    assert_eq!(summary.available, 1);
    assert_eq!(summary.unavailable, 1);
    assert_eq!(summary.checked_out, 1);
    assert_eq!(summary.unclassified, 1);
    assert_eq!(summary.total, 4);
}
