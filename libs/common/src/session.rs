//! Redis-backed session store
//!
//! Holds the current refresh token of every logged-in user under
//! `session:{user_id}` and the revoked tokens under `blacklisted_token:{token}`.
//! Both kinds of key expire with the token they describe.

use anyhow::Result;
use redis::{AsyncCommands, Client};
use tracing::info;

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        Ok(RedisConfig { url })
    }
}

fn session_key(user_id: i64) -> String {
    format!("session:{}", user_id)
}

fn blacklist_key(token: &str) -> String {
    format!("blacklisted_token:{}", token)
}

/// Session store shared by the auth and api services
#[derive(Clone)]
pub struct SessionStore {
    client: Client,
}

impl SessionStore {
    /// Open a client for the configured Redis server
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Record `refresh_token` as the live session of `user_id`
    pub async fn store_session(&self, user_id: i64, refresh_token: &str, ttl: u64) -> Result<()> {
        info!("Storing session for user: {}", user_id);
        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(session_key(user_id), refresh_token, ttl).await?;
        Ok(())
    }

    /// Refresh token of the live session, if any
    pub async fn session(&self, user_id: i64) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let token: Option<String> = conn.get(session_key(user_id)).await?;
        Ok(token)
    }

    /// Whether `user_id` currently has a live session
    pub async fn has_session(&self, user_id: i64) -> Result<bool> {
        let mut conn = self.connection().await?;
        let exists: bool = conn.exists(session_key(user_id)).await?;
        Ok(exists)
    }

    /// Check that `refresh_token` is the one stored for `user_id`
    pub async fn is_session_valid(&self, user_id: i64, refresh_token: &str) -> Result<bool> {
        Ok(self.session(user_id).await?.as_deref() == Some(refresh_token))
    }

    /// Drop the live session of `user_id`, logging them out everywhere
    pub async fn revoke_session(&self, user_id: i64) -> Result<()> {
        info!("Revoking session for user: {}", user_id);
        let mut conn = self.connection().await?;
        let _: u64 = conn.del(session_key(user_id)).await?;
        Ok(())
    }

    /// Refuse `token` for the next `ttl` seconds
    pub async fn blacklist(&self, token: &str, ttl: u64) -> Result<()> {
        // SETEX rejects a zero TTL; an already expired token needs no entry
        if ttl == 0 {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(blacklist_key(token), "1", ttl).await?;
        Ok(())
    }

    pub async fn is_blacklisted(&self, token: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let exists: bool = conn.exists(blacklist_key(token)).await?;
        Ok(exists)
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(session_key(42), "session:42");
        assert_eq!(blacklist_key("abc"), "blacklisted_token:abc");
    }

    #[test]
    fn test_new_rejects_malformed_url() {
        let config = RedisConfig {
            url: "not a url".to_string(),
        };
        assert!(SessionStore::new(&config).is_err());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_session_lifecycle() -> Result<()> {
        let store = SessionStore::new(&RedisConfig {
            url: "redis://localhost:6379".to_string(),
        })?;
        assert!(store.health_check().await?);

        store.store_session(9001, "refresh", 5).await?;
        assert!(store.has_session(9001).await?);
        assert!(store.is_session_valid(9001, "refresh").await?);
        assert!(!store.is_session_valid(9001, "other").await?);

        store.revoke_session(9001).await?;
        assert!(!store.has_session(9001).await?);

        store.blacklist("revoked-token", 5).await?;
        assert!(store.is_blacklisted("revoked-token").await?);
        Ok(())
    }
}
