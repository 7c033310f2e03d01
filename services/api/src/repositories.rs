//! Repositories for database operations

use anyhow::Result;
use domain::{GrantSet, Role};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::models::users::{UserRecord, UserResponse, UserRow};

pub mod inventory;

pub use inventory::InventoryRepository;

const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.full_name, u.identity, u.role, u.active, u.created_at,
           COALESCE(
               array_agg(uc.category ORDER BY uc.category)
                   FILTER (WHERE uc.category IS NOT NULL),
               '{}'
           )::TEXT[] AS categories
    FROM users u
    LEFT JOIN user_classes uc ON uc.user_id = u.id
"#;

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List users, optionally filtered by login, name or role
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<UserResponse>> {
        let mut builder = QueryBuilder::<Postgres>::new(USER_SELECT);

        if let Some(term) = search {
            let pattern = format!("%{}%", term);
            builder
                .push(" WHERE (u.username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.role ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder.push(" GROUP BY u.id ORDER BY u.username");

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(UserResponse::from).collect())
    }

    /// Find a user by ID, with grants
    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserResponse>> {
        let sql = format!("{} WHERE u.id = $1 GROUP BY u.id", USER_SELECT);

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserResponse::from))
    }

    /// Whether `username` belongs to a user other than `except`
    pub async fn username_taken(&self, username: &str, except: Option<i64>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE username = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(username)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// Number of user accounts
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Create a user and its grants
    pub async fn create(&self, record: &UserRecord) -> Result<UserResponse> {
        let password_hash = record
            .password_hash
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("A password hash is required to create a user"))?;

        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, full_name, identity, password_hash, role, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&record.username)
        .bind(&record.full_name)
        .bind(&record.identity)
        .bind(password_hash)
        .bind(record.role.as_str())
        .bind(record.active)
        .fetch_one(&mut *tx)
        .await?;

        replace_grants(&mut tx, id, record.role, &record.grants).await?;
        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User {} vanished after insert", id))
    }

    /// Update a user and rewrite its grants
    pub async fn update(&self, id: i64, record: &UserRecord) -> Result<Option<UserResponse>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, full_name = $3, identity = $4, role = $5, active = $6,
                password_hash = COALESCE($7, password_hash)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&record.username)
        .bind(&record.full_name)
        .bind(&record.identity)
        .bind(record.role.as_str())
        .bind(record.active)
        .bind(&record.password_hash)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        replace_grants(&mut tx, id, record.role, &record.grants).await?;
        tx.commit().await?;

        self.find_by_id(id).await
    }

    /// Replace a user's password hash
    pub async fn set_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a user; grants go with it through the foreign key cascade
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn replace_grants(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    role: Role,
    grants: &GrantSet,
) -> Result<()> {
    sqlx::query("DELETE FROM user_classes WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    if role != Role::User {
        return Ok(());
    }

    for category in grants.iter() {
        sqlx::query("INSERT INTO user_classes (user_id, category) VALUES ($1, $2)")
            .bind(user_id)
            .bind(category.code())
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}
