use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::{Job, JobDetail, JobFilter, JobSummary};
use crate::database::{ColumnMap, WriteMode, JOBS};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::extract::{JsonBody, ValidQuery};

fn parse_id(id: &str) -> Result<i32, ApiError> {
    id.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid job id: {}", id)))
}

/// GET /jobs
pub async fn list(State(state): State<AppState>, ValidQuery(filter): ValidQuery<JobFilter>) -> ApiResult<Vec<JobSummary>> {
    let jobs = Job::all(state.db.pool(), &filter).await?;
    Ok(ApiResponse::ok("jobs", jobs))
}

/// POST /jobs
pub async fn create(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<Job> {
    let items = ColumnMap::from_body(&JOBS, &body, WriteMode::Create)?;
    let job = Job::create(state.db.pool(), &items).await?;
    tracing::info!("Created job {} for {}", job.id, job.company_handle);
    Ok(ApiResponse::created("job", job))
}

/// GET /jobs/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<JobDetail> {
    let job = Job::get(state.db.pool(), parse_id(&id)?).await?;
    Ok(ApiResponse::ok("job", job))
}

/// PATCH /jobs/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<Job> {
    let id = parse_id(&id)?;
    let items = ColumnMap::from_body(&JOBS, &body, WriteMode::Update)?;
    let job = Job::edit(state.db.pool(), id, &items).await?;
    Ok(ApiResponse::ok("job", job))
}

/// DELETE /jobs/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<String> {
    let id = parse_id(&id)?;
    Job::delete(state.db.pool(), id).await?;
    tracing::info!("Deleted job: {}", id);
    Ok(ApiResponse::message("Job deleted"))
}
