//! User administration routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use common::password::{hash_password, unusable_password_hash};
use serde_json::json;
use tracing::{error, info};

use crate::{
    AppState,
    error::{ApiError, ApiResult, internal},
    middleware::{AuthUser, require_admin},
    models::{
        ListQuery,
        users::{
            CreateUserRequest, PasswordRequest, UpdateUserRequest, UserRecord, UserResponse,
            grants_for,
        },
    },
    validation::{optional_text, required_text, validate_password, validate_username},
};

/// Routes for managing users, reserved to administrators
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/:id/password", put(set_password))
        .route_layer(middleware::from_fn(require_admin))
}

/// Hash a password supplied by an administrator; blank means "not supplied"
fn new_password_hash(password: Option<&str>, confirm: Option<&str>) -> ApiResult<Option<String>> {
    let Some(password) = password.filter(|password| !password.is_empty()) else {
        return Ok(None);
    };

    validate_password(password, confirm).map_err(ApiError::BadRequest)?;

    hash_password(password).map(Some).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::InternalServerError
    })
}

fn identity_fields(
    username: &str,
    full_name: &str,
    identity: Option<String>,
) -> ApiResult<(String, String, Option<String>)> {
    let username = username.trim().to_string();
    validate_username(&username).map_err(ApiError::BadRequest)?;

    let full_name = required_text("Full name", full_name, 120).map_err(ApiError::BadRequest)?;
    let identity = optional_text("Identity", identity, 40).map_err(ApiError::BadRequest)?;

    Ok((username, full_name, identity))
}

fn is_unique_violation(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}

fn username_conflict(except: Option<i64>) -> ApiError {
    let message = if except.is_some() {
        "Login already used by another user"
    } else {
        "User already exists"
    };

    ApiError::Conflict(message.to_string())
}

/// A concurrent write can still take the login after the pre-check
fn write_error(
    context: &'static str,
    except: Option<i64>,
) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        if is_unique_violation(&e) {
            username_conflict(except)
        } else {
            internal(context)(e)
        }
    }
}

async fn ensure_username_free(
    state: &AppState,
    username: &str,
    except: Option<i64>,
) -> ApiResult<()> {
    let taken = state
        .user_repository
        .username_taken(username, except)
        .await
        .map_err(internal("check username"))?;

    if !taken {
        return Ok(());
    }

    Err(username_conflict(except))
}

async fn revoke_session(state: &AppState, user_id: i64) -> ApiResult<()> {
    state
        .sessions
        .revoke_session(user_id)
        .await
        .map_err(internal("revoke session"))
}

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_repository
        .list(query.search())
        .await
        .map_err(internal("list users"))?;

    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(internal("get user"))?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(user))
}

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let (username, full_name, identity) =
        identity_fields(&payload.username, &payload.full_name, payload.identity)?;

    ensure_username_free(&state, &username, None).await?;

    // Without a password the account exists but cannot log in yet
    let password_hash = match new_password_hash(
        payload.password.as_deref(),
        payload.confirm.as_deref(),
    )? {
        Some(hash) => hash,
        None => unusable_password_hash().map_err(|e| {
            error!("Failed to generate placeholder password: {}", e);
            ApiError::InternalServerError
        })?,
    };

    let record = UserRecord {
        username,
        full_name,
        identity,
        role: payload.role,
        active: payload.active,
        password_hash: Some(password_hash),
        grants: grants_for(payload.role, &payload.categories),
    };

    let user = state
        .user_repository
        .create(&record)
        .await
        .map_err(write_error("create user", None))?;

    info!("Created user {} with role {}", user.username, user.role);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let current = state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(internal("get user"))?
        .ok_or(ApiError::NotFound("User"))?;

    let (username, full_name, identity) =
        identity_fields(&payload.username, &payload.full_name, payload.identity)?;

    ensure_username_free(&state, &username, Some(id)).await?;

    let password_hash =
        new_password_hash(payload.password.as_deref(), payload.confirm.as_deref())?;

    let role = payload.role.unwrap_or(current.role);
    let active = payload.active.unwrap_or(current.active);
    let grants = match payload.categories {
        Some(codes) => grants_for(role, &codes),
        None => {
            let codes: Vec<String> = current
                .categories
                .iter()
                .map(|category| category.code().to_string())
                .collect();
            grants_for(role, &codes)
        }
    };

    let record = UserRecord {
        username,
        full_name,
        identity,
        role,
        active,
        password_hash,
        grants,
    };

    let user = state
        .user_repository
        .update(id, &record)
        .await
        .map_err(write_error("update user", Some(id)))?
        .ok_or(ApiError::NotFound("User"))?;

    if !user.active {
        revoke_session(&state, id).await?;
    }

    info!("Updated user {}", user.username);

    Ok(Json(user))
}

/// Set a user's password
pub async fn set_password(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_password(&payload.password, payload.confirm.as_deref())
        .map_err(ApiError::BadRequest)?;

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::InternalServerError
    })?;

    let updated = state
        .user_repository
        .set_password(id, &password_hash)
        .await
        .map_err(internal("set password"))?;

    if !updated {
        return Err(ApiError::NotFound("User"));
    }

    info!("Password changed for user {}", id);

    Ok(Json(json!({"message": "Password updated successfully"})))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    if current_user.id == id {
        return Err(ApiError::Conflict(
            "You cannot delete your own account".to_string(),
        ));
    }

    let deleted = state
        .user_repository
        .delete(id)
        .await
        .map_err(internal("delete user"))?;

    if !deleted {
        return Err(ApiError::NotFound("User"));
    }

    revoke_session(&state, id).await?;

    info!("User {} deleted by {}", id, current_user.username);

    Ok(Json(json!({"message": "User deleted successfully"})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;

    #[derive(Debug, thiserror::Error)]
    #[error("duplicate key value violates unique constraint")]
    struct DuplicateKey;

    impl DatabaseError for DuplicateKey {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23505"))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn test_unique_violation_on_write_is_a_conflict() {
        let duplicate = anyhow::Error::from(sqlx::Error::Database(Box::new(DuplicateKey)));
        match write_error("create user", None)(duplicate) {
            ApiError::Conflict(message) => assert_eq!(message, "User already exists"),
            other => panic!("unexpected error: {:?}", other),
        }

        let duplicate = anyhow::Error::from(sqlx::Error::Database(Box::new(DuplicateKey)));
        match write_error("update user", Some(4))(duplicate) {
            ApiError::Conflict(message) => {
                assert_eq!(message, "Login already used by another user")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_other_write_failures_stay_internal() {
        let failure = anyhow::Error::from(sqlx::Error::RowNotFound);
        assert!(matches!(
            write_error("create user", None)(failure),
            ApiError::InternalServerError
        ));
        assert!(matches!(
            write_error("update user", Some(1))(anyhow::anyhow!("boom")),
            ApiError::InternalServerError
        ));
    }

    #[test]
    fn test_blank_password_is_not_supplied() {
        assert!(new_password_hash(None, None).unwrap().is_none());
        assert!(new_password_hash(Some(""), Some("")).unwrap().is_none());
    }

    #[test]
    fn test_password_rules_apply_when_supplied() {
        assert!(matches!(
            new_password_hash(Some("abc"), None),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            new_password_hash(Some("abcd"), Some("abce")),
            Err(ApiError::BadRequest(_))
        ));

        let hash = new_password_hash(Some("abcd"), Some("abcd"))
            .unwrap()
            .unwrap();
        assert!(common::password::verify_password("abcd", &hash).unwrap());
    }

    #[test]
    fn test_identity_fields_are_trimmed_and_checked() {
        let (username, full_name, identity) =
            identity_fields(" maria ", " Maria Souza ", Some(" ".to_string())).unwrap();
        assert_eq!(username, "maria");
        assert_eq!(full_name, "Maria Souza");
        assert_eq!(identity, None);

        assert!(identity_fields("", "Maria", None).is_err());
        assert!(identity_fields("maria", "  ", None).is_err());
        assert!(identity_fields("maria", "Maria", Some("x".repeat(41))).is_err());
    }
}
