//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database and Redis session store
//! are properly configured and accessible from the application.

use common::{
    database::{DatabaseConfig, health_check, init_pool},
    session::{RedisConfig, SessionStore},
};
use sqlx::Row;

/// Test that verifies both PostgreSQL and Redis are accessible
/// and can perform basic operations
#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis servers"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    let store = SessionStore::new(&RedisConfig::from_env()?)?;
    assert!(store.health_check().await?, "Redis health check failed");

    store.store_session(-1, "integration_refresh_token", 10).await?;
    assert!(store.is_session_valid(-1, "integration_refresh_token").await?);

    store.revoke_session(-1).await?;
    assert!(!store.has_session(-1).await?, "Redis delete operation failed");

    Ok(())
}

/// The schema enforces the grant cascade the access policy relies on
#[tokio::test]
#[ignore = "requires a PostgreSQL server with db/schema.sql applied"]
async fn test_deleting_a_user_cascades_grants() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    let mut tx = pool.begin().await?;

    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (full_name, username, password_hash, role) \
         VALUES ('Cascade', 'cascade_check', 'x', 'user') RETURNING id",
    )
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO user_classes (user_id, category) VALUES ($1, 'CL2'), ($1, 'CL7')")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_classes WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    assert_eq!(remaining, 0);

    tx.rollback().await?;
    Ok(())
}
