use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::database::columns::JOBS;
use crate::database::manager::DatabaseError;
use crate::database::models::company::Company;
use crate::database::query;
use crate::database::sql_builder::{sql_for_insert, sql_for_partial_update, ColumnMap, WhereClauses};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: f64,
    pub equity: f64,
    pub company_handle: String,
    pub date_posted: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSummary {
    pub title: String,
    pub company_handle: String,
}

/// A job together with the company that posted it
#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub company: Vec<Company>,
}

/// Query-string filters for GET /jobs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub search: Option<String>,
    pub min_salary: Option<f64>,
    pub min_equity: Option<f64>,
}

impl Job {
    pub async fn all(pool: &PgPool, filter: &JobFilter) -> Result<Vec<JobSummary>, DatabaseError> {
        let mut clauses = WhereClauses::new();
        clauses
            .push_opt("equity >= ", filter.min_equity)
            .push_opt("salary >= ", filter.min_salary)
            .push_opt("title ILIKE ", filter.search.as_ref().map(|s| format!("%{}%", s)));

        let mut generated = clauses.finish("SELECT title, company_handle FROM jobs");
        generated.query.push_str(" ORDER BY date_posted DESC, id DESC");

        query::fetch_all(pool, &generated).await
    }

    pub async fn create(pool: &PgPool, items: &ColumnMap) -> Result<Job, DatabaseError> {
        let generated = sql_for_insert(JOBS.name, items)?;
        query::fetch_optional(pool, &generated)
            .await?
            .ok_or_else(|| DatabaseError::InvalidInput("Invalid parameters".to_string()))
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<JobDetail, DatabaseError> {
        let job = sqlx::query_as::<_, Job>(
            "SELECT id, title, salary, equity, company_handle, date_posted
             FROM jobs
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", id)))?;

        let company = sqlx::query_as::<_, Company>(
            "SELECT handle, name, num_employees, description, logo_url
             FROM companies
             WHERE handle = $1",
        )
        .bind(&job.company_handle)
        .fetch_all(pool)
        .await?;

        Ok(JobDetail { job, company })
    }

    pub async fn delete(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", id)))
    }

    pub async fn edit(pool: &PgPool, id: i32, items: &ColumnMap) -> Result<Job, DatabaseError> {
        let generated = sql_for_partial_update(JOBS.name, items, JOBS.key, id)?;
        query::fetch_optional(pool, &generated)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", id)))
    }
}
