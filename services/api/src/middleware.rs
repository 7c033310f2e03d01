//! Authentication and access guards
//!
//! `auth_middleware` resolves the caller on every request: it validates the
//! access token, checks it against the session store and reloads the user
//! with its grants, so deactivation and grant changes apply immediately.
//! The guards run after it and consult the access policy.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use common::token::TokenType;
use domain::{Category, Principal};
use tracing::{error, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::inventory::InventoryRecord,
    state::AppState,
};

/// Name of the cookie set by the auth service at login
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub principal: Principal,
}

/// Bearer token from the `Authorization` header, else the access cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers()).ok_or(ApiError::Unauthorized)?;

    let claims = state
        .verifier
        .validate_as(&token, TokenType::Access)
        .map_err(|e| {
            warn!("Rejected access token: {}", e);
            ApiError::Unauthorized
        })?;

    let is_blacklisted = state.sessions.is_blacklisted(&token).await.map_err(|e| {
        error!("Failed to check if token is blacklisted: {}", e);
        ApiError::InternalServerError
    })?;

    if is_blacklisted {
        return Err(ApiError::Unauthorized);
    }

    let has_session = state.sessions.has_session(claims.sub).await.map_err(|e| {
        error!("Failed to read session from Redis: {}", e);
        ApiError::InternalServerError
    })?;

    if !has_session {
        return Err(ApiError::Unauthorized);
    }

    // Deleted and deactivated accounts are refused even with a live token
    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to load user: {}", e);
            ApiError::InternalServerError
        })?
        .filter(|user| user.active)
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        principal: user.principal(),
        username: user.username,
        full_name: user.full_name,
    });

    Ok(next.run(req).await)
}

fn current_user(req: &Request) -> ApiResult<&AuthUser> {
    req.extensions()
        .get::<AuthUser>()
        .ok_or(ApiError::Unauthorized)
}

/// Policy check for one category
pub fn check_category(user: &AuthUser, category: Category) -> ApiResult<()> {
    if user.principal.can_access_category(category) {
        Ok(())
    } else {
        warn!("User {} denied access to {}", user.username, category);
        Err(ApiError::Forbidden)
    }
}

/// Policy check for user administration
pub fn check_admin(user: &AuthUser) -> ApiResult<()> {
    if user.principal.is_admin() {
        Ok(())
    } else {
        warn!("User {} denied administration", user.username);
        Err(ApiError::Forbidden)
    }
}

/// Guard for the routes of one inventory category
pub async fn require_category<R: InventoryRecord>(
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check_category(current_user(&req)?, R::CATEGORY)?;
    Ok(next.run(req).await)
}

/// Guard for the user administration routes
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    check_admin(current_user(&req)?)?;
    Ok(next.run(req).await)
}
