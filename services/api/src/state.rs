//! Application state shared across handlers

use common::{session::SessionStore, settings::AppSettings, token::TokenVerifier};
use sqlx::PgPool;

use crate::repositories::{InventoryRepository, UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub sessions: SessionStore,
    pub verifier: TokenVerifier,
    pub user_repository: UserRepository,
    pub inventory_repository: InventoryRepository,
    pub settings: AppSettings,
}
