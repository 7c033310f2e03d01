//! JWT claims and verification shared by the services
//!
//! The auth service signs tokens with an RSA private key; every service
//! verifies them with the matching public key through [`TokenVerifier`].

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    /// Role at the time the token was issued, informational only
    pub role: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Unique token identifier
    pub jti: String,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// Read a PEM key given either inline or as a path to a file.
///
/// Relative paths are tried against the working directory first, then
/// against `manifest_dir`.
pub fn load_pem(value: &str, manifest_dir: &str) -> Result<String> {
    if value.starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    std::fs::read_to_string(value)
        .or_else(|_| std::fs::read_to_string(Path::new(manifest_dir).join(value)))
        .map(|pem| pem.trim().to_string())
        .map_err(|e| anyhow::anyhow!("Failed to read key file {}: {}", value, e))
}

/// Validates RS256 tokens with a public key
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_public_pem(public_key: &str) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Create a verifier from `JWT_PUBLIC_KEY` (PEM or path)
    pub fn from_env(manifest_dir: &str) -> Result<Self> {
        let public_key = std::env::var("JWT_PUBLIC_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_PUBLIC_KEY environment variable not set"))?;
        Self::from_public_pem(&load_pem(&public_key, manifest_dir)?)
    }

    /// Validate a token and return the claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Validate a token and require it to be of `expected` type
    pub fn validate_as(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let claims = self.validate(token)?;
        if claims.token_type != expected {
            anyhow::bail!("Expected a {:?} token", expected);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_pem_passes_inline_keys_through() {
        let pem = "-----BEGIN PUBLIC KEY-----\nabc\n-----END PUBLIC KEY-----";
        assert_eq!(load_pem(pem, ".").unwrap(), pem);
    }

    #[test]
    fn test_load_pem_reports_missing_file() {
        assert!(load_pem("does/not/exist.pem", env!("CARGO_MANIFEST_DIR")).is_err());
    }

    #[test]
    fn test_verifier_rejects_garbage_key() {
        assert!(TokenVerifier::from_public_pem("not a key").is_err());
    }

    #[test]
    fn test_claims_serialize_token_type_by_name() {
        let claims = Claims {
            sub: 7,
            role: "user".to_string(),
            iat: 1,
            exp: 2,
            jti: "x".to_string(),
            token_type: TokenType::Refresh,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["token_type"], "Refresh");
        assert_eq!(json["sub"], 7);
    }
}
