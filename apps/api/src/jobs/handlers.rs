use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::identity::{CurrentUser, MaybeUser};
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::jobs::service::{self, JobRequest};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    #[serde(default)]
    pub my_jobs: bool,
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    ApiQuery(params): ApiQuery<JobListQuery>,
) -> Result<Json<Value>, AppError> {
    let jobs = service::list_jobs(state.store.as_ref(), principal.as_ref(), params.my_jobs).await?;
    Ok(Json(json!({
        "success": true,
        "count": jobs.len(),
        "jobs": jobs,
    })))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let job = service::get_job(state.store.as_ref(), principal.as_ref(), id).await?;
    Ok(Json(json!({ "success": true, "job": job })))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiJson(req): ApiJson<JobRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let job = service::create_job(state.store.as_ref(), &principal, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Job created successfully",
            "job": job,
        })),
    ))
}

/// PUT /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<JobRequest>,
) -> Result<Json<Value>, AppError> {
    let job = service::update_job(state.store.as_ref(), &principal, id, req).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Job updated successfully",
        "job": job,
    })))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    service::delete_job(state.store.as_ref(), &principal, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Job deleted successfully",
    })))
}
