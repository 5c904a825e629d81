use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::database::columns::COMPANIES;
use crate::database::manager::DatabaseError;
use crate::database::query;
use crate::database::sql_builder::{sql_for_insert, sql_for_partial_update, ColumnMap, WhereClauses};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub num_employees: Option<i32>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

/// Row shape returned by the company listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanySummary {
    pub handle: String,
    pub name: String,
}

/// Query-string filters for GET /companies
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyFilter {
    pub search: Option<String>,
    pub min_employees: Option<i64>,
    pub max_employees: Option<i64>,
}

impl Company {
    /// Handle and name of every company matching the filter
    pub async fn all(pool: &PgPool, filter: &CompanyFilter) -> Result<Vec<CompanySummary>, DatabaseError> {
        if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
            if min > max {
                return Err(DatabaseError::InvalidInput(
                    "min_employees cannot be greater than max_employees".to_string(),
                ));
            }
        }

        let mut clauses = WhereClauses::new();
        clauses
            .push_opt("num_employees >= ", filter.min_employees)
            .push_opt("num_employees <= ", filter.max_employees)
            .push_opt("name ILIKE ", filter.search.as_ref().map(|s| format!("%{}%", s)));

        let mut generated = clauses.finish("SELECT handle, name FROM companies");
        generated.query.push_str(" ORDER BY handle");

        query::fetch_all(pool, &generated).await
    }

    pub async fn create(pool: &PgPool, items: &ColumnMap) -> Result<Company, DatabaseError> {
        let generated = sql_for_insert(COMPANIES.name, items)?;
        query::fetch_optional(pool, &generated)
            .await?
            .ok_or_else(|| DatabaseError::InvalidInput("Invalid parameters".to_string()))
    }

    pub async fn get(pool: &PgPool, handle: &str) -> Result<Company, DatabaseError> {
        sqlx::query_as::<_, Company>(
            "SELECT handle, name, num_employees, description, logo_url
             FROM companies
             WHERE handle = $1",
        )
        .bind(handle)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", handle)))
    }

    pub async fn delete(pool: &PgPool, handle: &str) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, String>("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", handle)))
    }

    /// Update only the supplied columns of one company
    pub async fn edit(pool: &PgPool, handle: &str, items: &ColumnMap) -> Result<Company, DatabaseError> {
        let generated = sql_for_partial_update(COMPANIES.name, items, COMPANIES.key, handle)?;
        query::fetch_optional(pool, &generated)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", handle)))
    }
}
