//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{AppState, models::LoginCredentials};

/// Name of the cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Response for token generation
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request carrying a refresh token
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

/// Session cookie (no max-age): it ends with the browser session while the
/// token inside still expires on its own schedule
fn access_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.settings.cookie_secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);
    let sessions = state.sessions.health_check().await.unwrap_or(false);

    Json(serde_json::json!({
        "status": if database && sessions { "ok" } else { "degraded" },
        "service": "auth-service",
        "version": state.settings.version,
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginCredentials>,
) -> Result<impl IntoResponse, AuthError> {
    let username = payload.login_name();
    info!("Login attempt for user: {}", username);

    if username.is_empty() || payload.password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    if !state.rate_limiter.is_allowed(username).await {
        warn!("Login for {} refused by rate limiter", username);
        return Err(AuthError::TooManyAttempts);
    }

    let user = state
        .user_repository
        .authenticate(username, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to authenticate user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::InvalidCredentials)?;

    state.rate_limiter.reset(username).await;

    let access_token = state
        .jwt_service
        .generate_access_token(&user)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    let refresh_token = state
        .jwt_service
        .generate_refresh_token(&user)
        .map_err(|e| {
            error!("Failed to generate refresh token: {}", e);
            AuthError::InternalServerError
        })?;

    state
        .sessions
        .store_session(
            user.id,
            &refresh_token,
            state.jwt_service.refresh_token_expiry(),
        )
        .await
        .map_err(|e| {
            error!("Failed to store session in Redis: {}", e);
            AuthError::InternalServerError
        })?;

    info!("User {} logged in", user.username);

    let jar = jar.add(access_cookie(&state, access_token.clone()));
    let response = TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    };

    Ok((StatusCode::OK, jar, Json(response)))
}

/// Refresh token endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Token refresh request");

    let claims = state
        .jwt_service
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|_| AuthError::Unauthorized)?;

    let is_blacklisted = state
        .sessions
        .is_blacklisted(&payload.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to check if token is blacklisted: {}", e);
            AuthError::InternalServerError
        })?;

    if is_blacklisted {
        return Err(AuthError::Unauthorized);
    }

    let is_current = state
        .sessions
        .is_session_valid(claims.sub, &payload.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to read session from Redis: {}", e);
            AuthError::InternalServerError
        })?;

    if !is_current {
        return Err(AuthError::Unauthorized);
    }

    // The account may have been deleted or deactivated since login
    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to load user: {}", e);
            AuthError::InternalServerError
        })?
        .filter(|user| user.active)
        .ok_or(AuthError::Unauthorized)?;

    let access_token = state
        .jwt_service
        .generate_access_token(&user)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    let new_refresh_token = state
        .jwt_service
        .rotate_refresh_token(&state.sessions, &user, &payload.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to rotate refresh token: {}", e);
            AuthError::InternalServerError
        })?;

    let jar = jar.add(access_cookie(&state, access_token.clone()));
    let response = TokenResponse {
        access_token,
        refresh_token: new_refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    };

    Ok((StatusCode::OK, jar, Json(response)))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Logout request");

    let claims = state
        .jwt_service
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|_| AuthError::Unauthorized)?;

    let expiry = state.jwt_service.remaining_lifetime(&claims).map_err(|e| {
        error!("Failed to compute token lifetime: {}", e);
        AuthError::InternalServerError
    })?;

    state
        .sessions
        .blacklist(&payload.refresh_token, expiry)
        .await
        .map_err(|e| {
            error!("Failed to blacklist token: {}", e);
            AuthError::InternalServerError
        })?;

    state
        .sessions
        .revoke_session(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to remove session from Redis: {}", e);
            AuthError::InternalServerError
        })?;

    let jar = jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/").build());

    Ok((
        StatusCode::OK,
        jar,
        Json(serde_json::json!({"message": "Logged out successfully"})),
    ))
}

/// Custom error type for authentication errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown login, inactive account or wrong password, deliberately
    /// indistinguishable
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Too many login attempts, try again later")]
    TooManyAttempts,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
