use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Closed,
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(JobStatus::Active),
            "closed" => Ok(JobStatus::Closed),
            _ => Err(AppError::Validation(format!("Invalid job status '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_type")]
pub enum JobType {
    #[default]
    #[sqlx(rename = "Full-time")]
    #[serde(rename = "Full-time")]
    FullTime,
    #[sqlx(rename = "Part-time")]
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Internship,
}

impl FromStr for JobType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full-time" => Ok(JobType::FullTime),
            "Part-time" => Ok(JobType::PartTime),
            "Contract" => Ok(JobType::Contract),
            "Internship" => Ok(JobType::Internship),
            _ => Err(AppError::Validation(format!("Invalid job type '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Salary {
    #[sqlx(rename = "salary_min")]
    pub min: Option<i64>,
    #[sqlx(rename = "salary_max")]
    pub max: Option<i64>,
    #[sqlx(rename = "salary_currency")]
    pub currency: String,
}

impl Default for Salary {
    fn default() -> Self {
        Salary {
            min: None,
            max: None,
            currency: "USD".to_string(),
        }
    }
}

/// Everything an employer writes when posting or editing a job.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct JobContent {
    pub title: String,
    pub company: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub job_type: JobType,
    #[sqlx(flatten)]
    pub salary: Salary,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub content: JobContent,
    pub status: JobStatus,
    pub application_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub employer_id: Uuid,
    pub content: JobContent,
}
