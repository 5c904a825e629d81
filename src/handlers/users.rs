use axum::extract::{Path, State};

use crate::app::AppState;
use crate::auth::{generate_jwt, Claims};
use crate::database::models::{User, UserSummary};
use crate::database::{ColumnMap, DatabaseError, WriteMode, USERS};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::extract::JsonBody;

/// Duplicate keys on users get friendlier messages than the generic conflict
fn duplicate_user(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::UniqueViolation(constraint) if constraint.contains("email") => {
            ApiError::bad_request("Email already in use")
        }
        DatabaseError::UniqueViolation(_) => ApiError::bad_request("Username already taken"),
        other => other.into(),
    }
}

/// Mint a token for a user with the configured lifetime
pub(crate) fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    let claims = Claims::new(&user.username, user.is_admin, state.config.security.jwt_expiry_hours);
    Ok(generate_jwt(&claims, &state.config.security.jwt_secret)?)
}

/// GET /users
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<UserSummary>> {
    let users = User::all(state.db.pool()).await?;
    Ok(ApiResponse::ok("users", users))
}

/// POST /users - register and log in
pub async fn create(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<String> {
    let items = ColumnMap::from_body(&USERS, &body, WriteMode::Create)?;
    let user = User::create(state.db.pool(), &items, state.config.security.bcrypt_cost)
        .await
        .map_err(duplicate_user)?;

    tracing::info!("Registered user: {}", user.username);
    let token = issue_token(&state, &user)?;
    Ok(ApiResponse::created("token", token))
}

/// GET /users/:username
pub async fn get(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<User> {
    let user = User::get(state.db.pool(), &username).await?;
    Ok(ApiResponse::ok("user", user))
}

/// PATCH /users/:username
pub async fn update(
    State(state): State<AppState>,
    Path(username): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<User> {
    let items = ColumnMap::from_body(&USERS, &body, WriteMode::Update)?;
    let user = User::edit(state.db.pool(), &username, &items, state.config.security.bcrypt_cost)
        .await
        .map_err(duplicate_user)?;
    Ok(ApiResponse::ok("user", user))
}

/// DELETE /users/:username
pub async fn delete(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<String> {
    User::delete(state.db.pool(), &username).await?;
    tracing::info!("Deleted user: {}", username);
    Ok(ApiResponse::message("User deleted"))
}
