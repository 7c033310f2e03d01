//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

/// Trim a required text field and check its length
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String, String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(format!("{} is required", field));
    }

    if value.chars().count() > max {
        return Err(format!("{} must be at most {} characters long", field, max));
    }

    Ok(value.to_string())
}

/// Trim an optional text field; blank input becomes `None`
pub fn optional_text(field: &str, value: Option<String>, max: usize) -> Result<Option<String>, String> {
    let Some(value) = value else {
        return Ok(None);
    };

    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    if value.chars().count() > max {
        return Err(format!("{} must be at most {} characters long", field, max));
    }

    Ok(Some(value.to_string()))
}

/// Quantity field: absent is zero, negative falls back to zero
pub fn quantity(field: &str, value: Option<i32>) -> i32 {
    match value {
        Some(n) if n < 0 => {
            warn!("Negative {} ({}) replaced with 0", field, n);
            0
        }
        Some(n) => n,
        None => 0,
    }
}

/// Validate a login name
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() > 80 {
        return Err("Username must be at most 80 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{N}._@-]+$").expect("Failed to compile username regex")
    });

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, numbers, dots, dashes, underscores and @"
                .to_string(),
        );
    }

    Ok(())
}

/// Validate a password and its optional confirmation
pub fn validate_password(password: &str, confirm: Option<&str>) -> Result<(), String> {
    let length = password.chars().count();

    if length < 4 {
        return Err("Password must be at least 4 characters long".to_string());
    }

    if length > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    if confirm.is_some_and(|confirm| confirm != password) {
        return Err("Passwords do not match".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("Name", "  Radio  ", 120).unwrap(), "Radio");
        assert_eq!(required_text("Name", "   ", 120).unwrap_err(), "Name is required");
        assert!(required_text("Name", &"x".repeat(121), 120).is_err());
        // Length counts characters, not bytes
        assert!(required_text("Name", &"ç".repeat(120), 120).is_ok());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("Brand", None, 10).unwrap(), None);
        assert_eq!(optional_text("Brand", Some(" ".to_string()), 10).unwrap(), None);
        assert_eq!(
            optional_text("Brand", Some(" Motorola ".to_string()), 10).unwrap(),
            Some("Motorola".to_string())
        );
        assert!(optional_text("Brand", Some("x".repeat(11)), 10).is_err());
    }

    #[test]
    fn test_quantity_falls_back_to_zero() {
        assert_eq!(quantity("qtd", None), 0);
        assert_eq!(quantity("qtd", Some(-4)), 0);
        assert_eq!(quantity("qtd", Some(7)), 7);
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("maria.souza").is_ok());
        assert!(validate_username("joão").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("with space").is_err());
        assert!(validate_username(&"a".repeat(81)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("abcd", None).is_ok());
        assert!(validate_password("abc", None).is_err());
        assert!(validate_password(&"a".repeat(129), None).is_err());
        assert!(validate_password("abcd", Some("abcd")).is_ok());
        assert_eq!(
            validate_password("abcd", Some("abce")).unwrap_err(),
            "Passwords do not match"
        );
    }
}
