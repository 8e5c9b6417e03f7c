use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::identity::CurrentUser;
use crate::errors::AppError;
use crate::extract::ApiPath;
use crate::resumes::service::{self, ResumeUpload, MAX_RESUME_BYTES};
use crate::state::AppState;

/// Request body ceiling for the upload route. Large enough that an
/// oversized file still reaches validation and gets a 400.
pub const UPLOAD_BODY_LIMIT: usize = 2 * MAX_RESUME_BYTES;

const RESUME_FIELD: &str = "resume";

async fn read_upload(mut multipart: Multipart) -> Result<ResumeUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;
        return Ok(ResumeUpload {
            file_name,
            content_type,
            data,
        });
    }
    Err(AppError::Validation("No file provided".to_string()))
}

/// POST /api/resume/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let upload = read_upload(multipart?).await?;
    let resume = service::upload_resume(state.store.as_ref(), &principal, upload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Resume uploaded successfully",
            "resume": {
                "id": resume.id,
                "file_name": resume.file_name,
                "file_size": resume.file_size,
                "uploaded_at": resume.uploaded_at,
            }
        })),
    ))
}

/// GET /api/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Value>, AppError> {
    let resume = service::current_resume(state.store.as_ref(), &principal).await?;
    Ok(Json(json!({ "success": true, "resume": resume })))
}

/// DELETE /api/resume
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Value>, AppError> {
    service::delete_resume(state.store.as_ref(), &principal).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Resume deleted successfully",
    })))
}

/// GET /api/resume/download/:id
pub async fn handle_download(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resume = service::download_resume(state.store.as_ref(), &principal, id).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        service::sanitize_file_name(&resume.file_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, resume.file_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, resume.data.len().to_string()),
        ],
        resume.data,
    ))
}
