use axum::extract::State;
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::extract::ValidJson;
use super::users::issue_token;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /login
pub async fn login(State(state): State<AppState>, ValidJson(login): ValidJson<LoginRequest>) -> ApiResult<String> {
    let user = User::authenticate(state.db.pool(), &login.username, &login.password)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid credentials"))?;

    tracing::info!("User logged in: {}", user.username);
    let token = issue_token(&state, &user)?;
    Ok(ApiResponse::ok("token", token))
}
