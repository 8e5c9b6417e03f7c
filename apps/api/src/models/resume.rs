use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub data: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
}

/// Resume without its bytes, for listings and upload acknowledgements.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeMeta {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&Resume> for ResumeMeta {
    fn from(resume: &Resume) -> Self {
        ResumeMeta {
            id: resume.id,
            user_id: resume.user_id,
            file_name: resume.file_name.clone(),
            file_type: resume.file_type.clone(),
            file_size: resume.file_size,
            uploaded_at: resume.uploaded_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewResume {
    pub user_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub data: Vec<u8>,
}
