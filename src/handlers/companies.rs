use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::{Company, CompanyFilter, CompanySummary};
use crate::database::{ColumnMap, WriteMode, COMPANIES};
use crate::middleware::{ApiResponse, ApiResult};

use super::extract::{JsonBody, ValidQuery};

/// GET /companies
pub async fn list(
    State(state): State<AppState>,
    ValidQuery(filter): ValidQuery<CompanyFilter>,
) -> ApiResult<Vec<CompanySummary>> {
    let companies = Company::all(state.db.pool(), &filter).await?;
    Ok(ApiResponse::ok("companies", companies))
}

/// POST /companies
pub async fn create(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<Company> {
    let items = ColumnMap::from_body(&COMPANIES, &body, WriteMode::Create)?;
    let company = Company::create(state.db.pool(), &items).await?;
    tracing::info!("Created company: {}", company.handle);
    Ok(ApiResponse::created("company", company))
}

/// GET /companies/:handle
pub async fn get(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Company> {
    let company = Company::get(state.db.pool(), &handle).await?;
    Ok(ApiResponse::ok("company", company))
}

/// PATCH /companies/:handle
pub async fn update(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<Company> {
    let items = ColumnMap::from_body(&COMPANIES, &body, WriteMode::Update)?;
    let company = Company::edit(state.db.pool(), &handle, &items).await?;
    Ok(ApiResponse::ok("company", company))
}

/// DELETE /companies/:handle
pub async fn delete(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<String> {
    Company::delete(state.db.pool(), &handle).await?;
    tracing::info!("Deleted company: {}", handle);
    Ok(ApiResponse::message("Company deleted"))
}
