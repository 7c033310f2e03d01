//! API service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::{
    AppState,
    middleware::{AuthUser, auth_middleware},
    models::inventory::{Cl2Item, Cl6Item, Cl7Item},
};

pub mod admin;
pub mod inventory;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/dashboard", get(dashboard))
        .nest("/inv/cl2", inventory::routes::<Cl2Item>())
        .nest("/inv/cl6", inventory::routes::<Cl6Item>())
        .nest("/inv/cl7", inventory::routes::<Cl7Item>())
        .nest("/admin/users", admin::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);
    let sessions = state.sessions.health_check().await.unwrap_or(false);

    Json(json!({
        "status": if database && sessions { "ok" } else { "degraded" },
        "service": "api-service",
        "version": state.settings.version,
    }))
}

/// Landing page data for the signed-in user
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    Json(json!({
        "app": state.settings.name,
        "version": state.settings.version,
        "user": {
            "id": user.id,
            "username": user.username,
            "full_name": user.full_name,
        },
        "role": user.principal.role,
        "is_admin": user.principal.is_admin(),
        "categories": user.principal.accessible_categories(),
    }))
}
