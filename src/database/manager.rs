use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::auth::password::PasswordError;
use crate::config::DatabaseConfig;
use crate::database::sql_builder::BuildError;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Errors from the database layer and the models built on it
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        let db_err = err.as_database_error();
        let code = db_err.and_then(|e| e.code()).map(|c| c.into_owned());
        let constraint = db_err
            .and_then(|e| e.constraint())
            .unwrap_or("unknown")
            .to_string();

        match code.as_deref() {
            Some("23505") => return DatabaseError::UniqueViolation(constraint),
            Some("23503") => return DatabaseError::ForeignKeyViolation(constraint),
            Some("22003") => return DatabaseError::InvalidInput("Value out of range for column type".to_string()),
            Some("23514") => {
                return DatabaseError::InvalidInput(format!("Value violates constraint '{}'", constraint))
            }
            _ => {}
        }

        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            other => DatabaseError::Sqlx(other),
        }
    }
}

impl From<BuildError> for DatabaseError {
    fn from(err: BuildError) -> Self {
        DatabaseError::InvalidInput(err.to_string())
    }
}

/// Owns the connection pool. Cloned into the application state and passed
/// explicitly to every model call.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Connect eagerly, failing fast when the database is unreachable
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = Self::pool_options(config).connect(&config.url).await?;
        info!("Created database pool for: {}", Self::redacted_url(&config.url)?);
        Ok(Self { pool })
    }

    /// Build the pool without opening a connection until first use
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = Self::pool_options(config).connect_lazy(&config.url)?;
        Ok(Self { pool })
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create the jobly tables if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        self.pool.execute(SCHEMA_SQL).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    /// Database URL with the password stripped, safe for logs
    pub fn redacted_url(database_url: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***")).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
