use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::auth::password::{hash_password, verify_password};
use crate::database::columns::USERS;
use crate::database::manager::DatabaseError;
use crate::database::query;
use crate::database::sql_builder::{sql_for_insert, sql_for_partial_update, ColumnMap};
use crate::database::value::SqlValue;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    /// Insert a user, hashing the plain-text `password` entry first
    pub async fn create(pool: &PgPool, items: &ColumnMap, bcrypt_cost: u32) -> Result<User, DatabaseError> {
        let items = with_hashed_password(items, bcrypt_cost).await?;
        let generated = sql_for_insert(USERS.name, &items)?;
        query::fetch_optional(pool, &generated)
            .await?
            .ok_or_else(|| DatabaseError::InvalidInput("Invalid parameters".to_string()))
    }

    pub async fn all(pool: &PgPool) -> Result<Vec<UserSummary>, DatabaseError> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT username, first_name, last_name, email
             FROM users
             ORDER BY username",
        )
        .fetch_all(pool)
        .await?;
        Ok(users)
    }

    pub async fn get(pool: &PgPool, username: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT username, password, first_name, last_name, email, photo_url, is_admin
             FROM users
             WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", username)))
    }

    pub async fn delete(pool: &PgPool, username: &str) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, String>("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", username)))
    }

    /// Update the supplied columns. A new password is hashed before storage.
    pub async fn edit(
        pool: &PgPool,
        username: &str,
        items: &ColumnMap,
        bcrypt_cost: u32,
    ) -> Result<User, DatabaseError> {
        let items = with_hashed_password(items, bcrypt_cost).await?;
        let generated = sql_for_partial_update(USERS.name, &items, USERS.key, username)?;
        query::fetch_optional(pool, &generated)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", username)))
    }

    /// Check a username/password pair.
    ///
    /// `Ok(None)` means the user exists but the password did not match;
    /// an unknown username is `DatabaseError::NotFound`.
    pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> Result<Option<User>, DatabaseError> {
        let user = Self::get(pool, username).await?;

        if verify_password(password, &user.password).await? {
            Ok(Some(user))
        } else {
            debug!("Password mismatch for user: {}", username);
            Ok(None)
        }
    }
}

async fn with_hashed_password(items: &ColumnMap, cost: u32) -> Result<ColumnMap, DatabaseError> {
    let mut items = items.clone();
    if let Some(plain) = items.get("password").and_then(SqlValue::as_str).map(str::to_owned) {
        let hashed = hash_password(&plain, cost).await?;
        items.insert("password", hashed);
    }
    Ok(items)
}
