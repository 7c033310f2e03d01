//! JWT service for token generation, validation, and rotation
//!
//! Tokens are signed with RS256. Verification goes through the shared
//! [`TokenVerifier`] so the api service accepts exactly what this service
//! issues. Revocation lives in the Redis session store.

use anyhow::Result;
use common::{
    session::SessionStore,
    token::{Claims, TokenType, TokenVerifier, load_pem},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::models::User;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Private key for signing tokens
    pub private_key: String,
    /// Public key for verifying tokens
    pub public_key: String,
    /// Access token expiration time in seconds (default: 8 hours)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY`: Private key (PEM format) or path to the key file
    /// - `JWT_PUBLIC_KEY`: Public key (PEM format) or path to the key file
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 28800)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let manifest_dir = env!("CARGO_MANIFEST_DIR");

        let private_key = std::env::var("JWT_PRIVATE_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_PRIVATE_KEY environment variable not set"))?;
        let public_key = std::env::var("JWT_PUBLIC_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_PUBLIC_KEY environment variable not set"))?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(28_800);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(604_800);

        Ok(JwtConfig {
            private_key: load_pem(&private_key, manifest_dir)?,
            public_key: load_pem(&public_key, manifest_dir)?,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

fn now() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs())
}

fn token_id() -> String {
    Uuid::new_v4().to_string()
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    verifier: TokenVerifier,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;
        let verifier = TokenVerifier::from_public_pem(&config.public_key)?;

        Ok(JwtService {
            encoding_key,
            verifier,
            config,
        })
    }

    fn sign(&self, user: &User, token_type: TokenType, lifetime: u64) -> Result<String> {
        let iat = now()?;
        let claims = Claims {
            sub: user.id,
            role: user.role.to_string(),
            iat,
            exp: iat + lifetime,
            jti: token_id(),
            token_type,
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        self.sign(user, TokenType::Access, self.config.access_token_expiry)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user: &User) -> Result<String> {
        self.sign(user, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        self.verifier.validate(token)
    }

    /// Validate a token that must be a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims> {
        self.verifier.validate_as(token, TokenType::Refresh)
    }

    /// Seconds until the token described by `claims` expires
    pub fn remaining_lifetime(&self, claims: &Claims) -> Result<u64> {
        Ok(claims.exp.saturating_sub(now()?))
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }

    /// Rotate a refresh token
    ///
    /// The old refresh token is blacklisted for its remaining lifetime and a
    /// new one is issued and stored as the user's session.
    pub async fn rotate_refresh_token(
        &self,
        sessions: &SessionStore,
        user: &User,
        old_refresh_token: &str,
    ) -> Result<String> {
        let claims = self.validate_refresh_token(old_refresh_token)?;

        if claims.sub != user.id {
            return Err(anyhow::anyhow!("Token does not belong to user"));
        }

        sessions
            .blacklist(old_refresh_token, self.remaining_lifetime(&claims)?)
            .await?;

        let new_refresh_token = self.generate_refresh_token(user)?;
        sessions
            .store_session(user.id, &new_refresh_token, self.refresh_token_expiry())
            .await?;

        Ok(new_refresh_token)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use domain::Role;
    use serial_test::serial;

    pub(crate) fn test_config() -> JwtConfig {
        JwtConfig {
            private_key: include_str!("../fixtures/test_rsa_private.pem").to_string(),
            public_key: include_str!("../fixtures/test_rsa_public.pem").to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        }
    }

    pub(crate) fn test_user(role: Role) -> User {
        User {
            id: 42,
            username: "maria".to_string(),
            full_name: "Maria Souza".to_string(),
            password_hash: String::new(),
            role,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = JwtService::new(test_config()).unwrap();
        let token = service.generate_access_token(&test_user(Role::All)).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "all");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let service = JwtService::new(test_config()).unwrap();
        let token = service.generate_access_token(&test_user(Role::User)).unwrap();
        assert!(service.validate_refresh_token(&token).is_err());

        let refresh = service.generate_refresh_token(&test_user(Role::User)).unwrap();
        assert!(service.validate_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_tokens_are_unique() {
        let service = JwtService::new(test_config()).unwrap();
        let user = test_user(Role::Admin);
        let first = service.generate_refresh_token(&user).unwrap();
        let second = service.generate_refresh_token(&user).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = JwtService::new(test_config()).unwrap();
        let mut token = service.generate_access_token(&test_user(Role::User)).unwrap();
        token.push('x');
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_remaining_lifetime_never_underflows() {
        let service = JwtService::new(test_config()).unwrap();
        let claims = Claims {
            sub: 1,
            role: "user".to_string(),
            iat: 0,
            exp: 1,
            jti: "old".to_string(),
            token_type: TokenType::Refresh,
        };
        assert_eq!(service.remaining_lifetime(&claims).unwrap(), 0);
    }

    #[test]
    #[serial]
    fn test_config_from_env_reads_key_paths_and_defaults() {
        unsafe {
            std::env::set_var("JWT_PRIVATE_KEY", "fixtures/test_rsa_private.pem");
            std::env::set_var("JWT_PUBLIC_KEY", "fixtures/test_rsa_public.pem");
            std::env::remove_var("JWT_ACCESS_TOKEN_EXPIRY");
            std::env::set_var("JWT_REFRESH_TOKEN_EXPIRY", "not-a-number");
        }

        let config = JwtConfig::from_env().unwrap();
        assert!(config.private_key.starts_with("-----BEGIN"));
        assert_eq!(config.access_token_expiry, 28_800);
        assert_eq!(config.refresh_token_expiry, 604_800);
        assert!(JwtService::new(config).is_ok());

        unsafe {
            std::env::remove_var("JWT_PRIVATE_KEY");
        }
        assert!(JwtConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("JWT_PUBLIC_KEY");
            std::env::remove_var("JWT_REFRESH_TOKEN_EXPIRY");
        }
    }
}
