use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::app::AppState;
use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// Runs on every request. A valid token from the Authorization header, or
/// from a top-level `"token"` field of a JSON body, puts an [`AuthUser`] into
/// the request extensions. Missing or invalid tokens leave the request
/// anonymous; the gates below decide whether that matters.
pub async fn authenticate_jwt(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let header_token = extract_jwt_from_headers(request.headers());

    // The body field is always stripped; a header token wins when both are sent
    let (body_token, mut request) = match take_token_from_body(request).await {
        Ok(pair) => pair,
        Err(e) => return e.into_response(),
    };
    let token = header_token.or(body_token);

    if let Some(token) = token {
        match validate_jwt(&token, &state.config.security.jwt_secret) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthUser::from(claims));
            }
            Err(e) => debug!("Ignoring invalid token: {}", e),
        }
    }

    next.run(request).await
}

/// Require any logged-in user
pub async fn ensure_logged_in(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<AuthUser>() {
        Some(_) => Ok(next.run(request).await),
        None => Err(ApiError::unauthorized("Unauthorized, please log in")),
    }
}

/// Require the token's user to match the `:username` path segment
pub async fn ensure_correct_user(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request.extensions().get::<AuthUser>();
    let target = params.get("username");

    match (user, target) {
        (Some(user), Some(target)) if &user.username == target => Ok(next.run(request).await),
        _ => Err(ApiError::unauthorized("Unauthorized, incorrect user")),
    }
}

/// Require an admin token
pub async fn ensure_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin => Ok(next.run(request).await),
        _ => Err(ApiError::unauthorized("Unauthorized, you are not an admin")),
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false)
}

/// Pull a `"token"` field out of a JSON object body and rebuild the request
/// without it. Any other body is passed through untouched.
async fn take_token_from_body(request: Request) -> Result<(Option<String>, Request), ApiError> {
    if !is_json(request.headers()) {
        return Ok((None, request));
    }

    let (mut parts, body) = request.into_parts();
    // Buffering through the Bytes extractor reports an exceeded body limit as 413
    let mut inner = Request::new(body);
    *inner.extensions_mut() = parts.extensions.clone();
    let bytes = Bytes::from_request(inner, &())
        .await
        .map_err(|rejection| match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large("Request body too large"),
            _ => ApiError::bad_request("Failed to read request body"),
        })?;

    let mut object = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(object)) if object.contains_key("token") => object,
        // Leave malformed or token-free bodies for the handler's extractor to judge
        _ => return Ok((None, Request::from_parts(parts, Body::from(bytes)))),
    };

    let token = match object.remove("token") {
        Some(Value::String(token)) => Some(token),
        _ => None,
    };

    let stripped = serde_json::to_vec(&Value::Object(object))
        .map_err(|_| ApiError::internal_server_error("Failed to rebuild request body"))?;
    parts.headers.remove(header::CONTENT_LENGTH);

    Ok((token, Request::from_parts(parts, Body::from(stripped))))
}
