//! Router construction and shared application state.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::handlers::{companies, health, jobs, login, users};
use crate::middleware::{authenticate_jwt, ensure_admin, ensure_correct_user, ensure_logged_in};

/// Shared by every handler; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DatabaseManager, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/login", post(login::login))
        .merge(company_routes())
        .merge(job_routes())
        .merge(user_routes())
        .fallback(health::not_found)
        // Global middleware
        .layer(from_fn_with_state(state.clone(), authenticate_jwt))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(RequestBodyLimitLayer::new(state.config.api.max_request_size_bytes));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(companies::list).post(companies::create))
        .route(
            "/companies/:handle",
            get(companies::get).patch(companies::update).delete(companies::delete),
        )
}

fn job_routes() -> Router<AppState> {
    let read = get(jobs::list).route_layer(from_fn(ensure_logged_in));
    let write = post(jobs::create).route_layer(from_fn(ensure_admin));

    let read_one = get(jobs::get).route_layer(from_fn(ensure_logged_in));
    let write_one = patch(jobs::update)
        .delete(jobs::delete)
        .route_layer(from_fn(ensure_admin));

    Router::new()
        .route("/jobs", read.merge(write))
        .route("/jobs/:id", read_one.merge(write_one))
}

fn user_routes() -> Router<AppState> {
    let owner_only = patch(users::update)
        .delete(users::delete)
        .route_layer(from_fn(ensure_correct_user));

    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/:username", get(users::get).merge(owner_only))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt, Claims};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = AppConfig::test();
        let db = DatabaseManager::connect_lazy(&config.database).unwrap();
        AppState::new(db, config)
    }

    async fn message_of(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        body["message"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn fallback_is_json_404() {
        let response = app(test_state())
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(message_of(response).await, "Not Found");
    }

    #[tokio::test]
    async fn admin_gate_checks_claims() {
        let state = test_state();
        let claims = Claims::new("plain", false, 1);
        let token = generate_jwt(&claims, &state.config.security.jwt_secret).unwrap();

        let response = app(state)
            .oneshot(
                Request::patch("/jobs/1")
                    .header("authorization", format!("Bearer {}", token))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"title":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(message_of(response).await, "Unauthorized, you are not an admin");
    }

    #[tokio::test]
    async fn streamed_body_over_the_limit_is_413() {
        let mut config = AppConfig::test();
        config.api.max_request_size_bytes = 16;
        let db = DatabaseManager::connect_lazy(&config.database).unwrap();

        // No content-length, so the limit trips while the body is buffered
        let response = app(AppState::new(db, config))
            .oneshot(
                Request::post("/companies")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"handle":"a-rather-long-handle","name":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(message_of(response).await, "Request body too large");
    }

    #[tokio::test]
    async fn tokens_signed_with_another_secret_are_ignored() {
        let token = generate_jwt(&Claims::new("root", true, 1), "someone-elses-secret").unwrap();

        let response = app(test_state())
            .oneshot(
                Request::get("/jobs")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(message_of(response).await, "Unauthorized, please log in");
    }
}
