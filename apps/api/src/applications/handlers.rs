use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::applications::service::{self, ApplyRequest, StatusRequest};
use crate::auth::identity::CurrentUser;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub job_id: Option<Uuid>,
}

/// POST /api/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiJson(req): ApiJson<ApplyRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let application = service::apply(state.store.as_ref(), &principal, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Application submitted successfully",
            "application": application,
        })),
    ))
}

/// GET /api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiQuery(params): ApiQuery<ApplicationListQuery>,
) -> Result<Json<Value>, AppError> {
    let applications =
        service::list_applications(state.store.as_ref(), &principal, params.job_id).await?;
    Ok(Json(json!({
        "success": true,
        "count": applications.len(),
        "applications": applications,
    })))
}

/// GET /api/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let application = service::get_application(state.store.as_ref(), &principal, id).await?;
    Ok(Json(json!({ "success": true, "application": application })))
}

/// PUT /api/applications/:id
pub async fn handle_update_status(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> Result<Json<Value>, AppError> {
    let application = service::update_status(state.store.as_ref(), &principal, id, req).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Application status updated",
        "application": application,
    })))
}

/// DELETE /api/applications/:id
pub async fn handle_withdraw(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    service::withdraw(state.store.as_ref(), &principal, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Application withdrawn successfully",
    })))
}
