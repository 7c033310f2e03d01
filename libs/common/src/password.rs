//! Password hashing with argon2
//!
//! Passwords are stored as salted argon2 PHC strings and only ever compared
//! through [`verify_password`].

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::{Rng, distributions::Alphanumeric};
use std::sync::OnceLock;

use crate::error::PasswordError;

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Verify `password` against a stored hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash of a random secret nobody knows, for accounts created without a
/// password. Such accounts cannot log in until a password is set.
pub fn unusable_password_hash() -> Result<String, PasswordError> {
    let secret: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect();
    hash_password(&secret)
}

/// Run a full verification against a throwaway hash, for logins that match
/// no account. Always false; it only makes both paths cost the same.
pub fn verify_against_dummy(password: &str) -> bool {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    match DUMMY_HASH.get_or_init(|| unusable_password_hash().ok()) {
        Some(hash) => {
            let _ = verify_password(password, hash);
            false
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret", &hash).unwrap());
        assert!(!verify_password("S3cret", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_hash_is_an_error() {
        let err = verify_password("x", "plaintext").unwrap_err();
        assert!(matches!(err, PasswordError::InvalidHash(_)));
    }

    #[test]
    fn test_unusable_hash_rejects_empty_password() {
        let hash = unusable_password_hash().unwrap();
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_dummy_verification_never_succeeds() {
        assert!(!verify_against_dummy(""));
        assert!(!verify_against_dummy("s3cret"));
    }
}
