use sqlx::{self, postgres::{PgArguments, PgRow}, FromRow, PgPool, Postgres};
use sqlx::query::QueryAs;

use crate::database::manager::DatabaseError;
use crate::database::sql_builder::GeneratedQuery;
use crate::database::value::SqlValue;

/// Run a generated statement and map every returned row
pub async fn fetch_all<T>(pool: &PgPool, generated: &GeneratedQuery) -> Result<Vec<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    tracing::debug!("Executing: {} ({} params)", generated.query, generated.params.len());
    let rows = bind_all(sqlx::query_as::<_, T>(&generated.query), &generated.params)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Run a generated statement expecting at most one row (e.g. `RETURNING *`)
pub async fn fetch_optional<T>(pool: &PgPool, generated: &GeneratedQuery) -> Result<Option<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    tracing::debug!("Executing: {} ({} params)", generated.query, generated.params.len());
    let row = bind_all(sqlx::query_as::<_, T>(&generated.query), &generated.params)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

fn bind_all<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    params: &'q [SqlValue],
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for p in params {
        q = bind_param(q, p);
    }
    q
}

// Option binds keep the column type even for NULL
fn bind_param<'q, O>(
    q: QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q SqlValue,
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlValue::Text(s) => q.bind(s.as_deref()),
        SqlValue::Integer(i) => q.bind(*i),
        SqlValue::Float(f) => q.bind(*f),
        SqlValue::Boolean(b) => q.bind(*b),
    }
}
