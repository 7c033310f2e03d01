//! User repository for database operations

use anyhow::Result;
use common::password;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{info, warn};

use crate::models::User;

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

fn user_from_row(row: &PgRow) -> User {
    let role: String = row.get("role");
    User {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        password_hash: row.get("password_hash"),
        role: role.parse().unwrap_or_else(|e| {
            warn!("{}; treating account as plain user", e);
            domain::Role::User
        }),
        active: row.get("active"),
        created_at: row.get("created_at"),
    }
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active user by login name
    pub async fn find_active_by_username(&self, username: &str) -> Result<Option<User>> {
        info!("Finding active user by username: {}", username);

        let row = sqlx::query(
            r#"
            SELECT id, username, full_name, password_hash, role, active, created_at
            FROM users
            WHERE username = $1 AND active = TRUE
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, full_name, password_hash, role, active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        Ok(password::verify_password(password, &user.password_hash)?)
    }

    /// Look up an active user and check the password in one step.
    ///
    /// Unknown users, inactive users and wrong passwords all yield `None`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_active_by_username(username).await? else {
            // Unknown logins pay the same argon2 cost as known ones
            password::verify_against_dummy(password);
            return Ok(None);
        };

        match self.verify_password(&user, password) {
            Ok(true) => Ok(Some(user)),
            Ok(false) => Ok(None),
            Err(e) => {
                warn!("Stored password hash for {} is unusable: {}", user.username, e);
                Ok(None)
            }
        }
    }
}
