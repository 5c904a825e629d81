#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::Mutex;

use jobly_api::auth::{generate_jwt, Claims};
use jobly_api::database::models::User;
use jobly_api::database::ColumnMap;
use jobly_api::{app, AppConfig, AppState, DatabaseManager};

// Serializes the first schema creation across concurrently running tests
static SCHEMA_READY: Mutex<bool> = Mutex::const_new(false);

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

/// Database for the data-backed tests. Unset means those tests skip.
pub fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty())
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::test();
    if let Some(url) = database_url() {
        config.database.url = url;
    }
    config.database.connection_timeout = 2;
    config
}

impl TestServer {
    /// Serve the router on a free port inside the current test runtime.
    /// The pool is lazy, so routes that never touch the database work
    /// without one.
    pub async fn spawn() -> Result<Self> {
        let config = test_config();
        let db = DatabaseManager::connect_lazy(&config.database).context("failed to build pool")?;
        Self::serve(AppState::new(db, config)).await
    }

    /// Like [`TestServer::spawn`] but returns `None` when no database is configured
    pub async fn spawn_with_db() -> Result<Option<Self>> {
        if database_url().is_none() {
            eprintln!("DATABASE_URL not set, skipping");
            return Ok(None);
        }

        let server = Self::spawn().await?;
        let mut ready = SCHEMA_READY.lock().await;
        if !*ready {
            server.state.db.ensure_schema().await.context("failed to apply schema")?;
            *ready = true;
        }
        drop(ready);

        Ok(Some(server))
    }

    async fn serve(state: AppState) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sign a token with the server's secret without touching the database
    pub fn token_for(&self, username: &str, is_admin: bool) -> String {
        let security = &self.state.config.security;
        generate_jwt(&Claims::new(username, is_admin, security.jwt_expiry_hours), &security.jwt_secret)
            .expect("token")
    }

    /// Insert a user straight into the database and return a token for it
    pub async fn create_user(&self, username: &str, is_admin: bool) -> Result<String> {
        let items = ColumnMap::new()
            .with("username", username)
            .with("password", "password1")
            .with("first_name", "Test")
            .with("last_name", "User")
            .with("email", format!("{}@example.com", username))
            .with("is_admin", is_admin);
        User::create(self.state.db.pool(), &items, self.state.config.security.bcrypt_cost).await?;
        Ok(self.token_for(username, is_admin))
    }
}

/// Short random suffix so data tests never collide
pub fn unique(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &id[..8])
}

pub async fn json_of(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let body = res.json::<Value>().await?;
    Ok((status, body))
}
