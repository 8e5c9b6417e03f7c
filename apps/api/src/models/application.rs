use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// Any status may follow any other; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewed" => Ok(ApplicationStatus::Reviewed),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(AppError::Validation("Invalid status".to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub seeker_id: Uuid,
    pub cover_letter: String,
    pub status: ApplicationStatus,
    pub resume_id: Option<Uuid>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An application together with the employer that owns its job.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRecord {
    #[sqlx(flatten)]
    pub application: Application,
    pub job_employer_id: Uuid,
}

/// Listing row: the application plus enough of the job and seeker to render a dashboard.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    pub job_company: String,
    pub job_location: String,
    pub seeker_name: String,
    pub seeker_email: String,
}

/// Single-application view for the reviewing employer or the applicant:
/// the listing row plus the seeker's skills and the attached resume's metadata.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub summary: ApplicationSummary,
    pub seeker_skills: Vec<String>,
    pub resume_file_name: Option<String>,
    pub resume_file_type: Option<String>,
    pub resume_file_size: Option<i64>,
    pub resume_uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub seeker_id: Uuid,
    pub cover_letter: String,
}
