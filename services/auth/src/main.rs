use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod jwt;
mod models;
mod rate_limiter;
mod repositories;
mod routes;

use common::{
    database::{self, DatabaseConfig},
    session::{RedisConfig, SessionStore},
    settings::AppSettings,
};
use sqlx::PgPool;

use crate::{
    jwt::{JwtConfig, JwtService},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub sessions: SessionStore,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub rate_limiter: RateLimiter,
    pub settings: AppSettings,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting authentication service");

    let settings = AppSettings::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;
    let sessions = SessionStore::new(&RedisConfig::from_env()?)?;

    let app_state = AppState {
        user_repository: UserRepository::new(pool.clone()),
        db_pool: pool,
        sessions,
        jwt_service,
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
        settings: settings.clone(),
    };

    info!("Authentication service initialized successfully");

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&settings.auth_bind).await?;
    info!("Authentication service listening on {}", settings.auth_bind);

    axum::serve(listener, app).await?;

    Ok(())
}
