use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod middleware;
mod models;
mod report;
mod repositories;
mod routes;
mod state;
mod validation;

use common::{
    database::{self, DatabaseConfig},
    password::hash_password,
    session::{RedisConfig, SessionStore},
    settings::AppSettings,
    token::TokenVerifier,
};
use domain::{GrantSet, Role};

use crate::{
    models::users::UserRecord,
    repositories::{InventoryRepository, UserRepository},
    state::AppState,
};

/// Create the first administrator when the users table is empty and
/// `BOOTSTRAP_ADMIN_USERNAME` / `BOOTSTRAP_ADMIN_PASSWORD` are set
async fn bootstrap_admin(user_repository: &UserRepository) -> Result<()> {
    let (Ok(username), Ok(password)) = (
        std::env::var("BOOTSTRAP_ADMIN_USERNAME"),
        std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
    ) else {
        return Ok(());
    };

    if user_repository.count().await? > 0 {
        return Ok(());
    }

    let username = username.trim().to_string();
    if let Err(e) = validation::validate_username(&username)
        .and_then(|_| validation::validate_password(&password, None))
    {
        warn!("Skipping bootstrap administrator: {}", e);
        return Ok(());
    }

    let record = UserRecord {
        username,
        full_name: "Administrator".to_string(),
        identity: None,
        role: Role::Admin,
        active: true,
        password_hash: Some(hash_password(&password)?),
        grants: GrantSet::new(),
    };

    let user = user_repository.create(&record).await?;
    info!("Created bootstrap administrator {}", user.username);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let settings = AppSettings::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let sessions = SessionStore::new(&RedisConfig::from_env()?)?;
    let verifier = TokenVerifier::from_env(env!("CARGO_MANIFEST_DIR"))?;

    let user_repository = UserRepository::new(pool.clone());
    bootstrap_admin(&user_repository).await?;

    let app_state = AppState {
        inventory_repository: InventoryRepository::new(pool.clone()),
        user_repository,
        db_pool: pool,
        sessions,
        verifier,
        settings: settings.clone(),
    };

    info!("API service initialized successfully");

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&settings.api_bind).await?;
    info!("API service listening on {}", settings.api_bind);

    axum::serve(listener, app).await?;

    Ok(())
}
