//! Job postings: public browsing, employer-owned mutation.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{ensure, Action, JobFacts, Target};
use crate::auth::principal::Principal;
use crate::errors::AppError;
use crate::models::job::{Job, JobContent, JobStatus, JobType, NewJob, Salary};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct SalaryRequest {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub currency: Option<String>,
}

/// Body of `POST /api/jobs` and `PUT /api/jobs/:id`. On update every field
/// is optional and only the ones present are changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary: Option<SalaryRequest>,
    pub skills: Option<Vec<String>>,
    pub status: Option<String>,
}

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

fn replace(field: &str, current: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) => required(field, Some(v)),
        None => Ok(current.to_string()),
    }
}

fn merge_salary(current: &Salary, request: Option<SalaryRequest>) -> Result<Salary, AppError> {
    let salary = match request {
        Some(req) => Salary {
            min: req.min,
            max: req.max,
            currency: req
                .currency
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| current.currency.clone()),
        },
        None => current.clone(),
    };
    if salary.min.is_some_and(|v| v < 0) || salary.max.is_some_and(|v| v < 0) {
        return Err(AppError::Validation(
            "Salary cannot be negative".to_string(),
        ));
    }
    if let (Some(min), Some(max)) = (salary.min, salary.max) {
        if min > max {
            return Err(AppError::Validation(
                "Salary minimum cannot exceed maximum".to_string(),
            ));
        }
    }
    Ok(salary)
}

fn clean_skills(skills: Vec<String>) -> Vec<String> {
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn validate_new_job(req: JobRequest) -> Result<JobContent, AppError> {
    Ok(JobContent {
        title: required("title", req.title)?,
        company: required("company", req.company)?,
        description: required("description", req.description)?,
        requirements: required("requirements", req.requirements)?,
        location: required("location", req.location)?,
        job_type: req
            .job_type
            .as_deref()
            .map(str::parse::<JobType>)
            .transpose()?
            .unwrap_or_default(),
        salary: merge_salary(&Salary::default(), req.salary)?,
        skills: clean_skills(req.skills.unwrap_or_default()),
    })
}

/// Applies a partial update. Returns the merged content and status.
pub fn apply_update(job: &Job, req: JobRequest) -> Result<(JobContent, JobStatus), AppError> {
    let current = &job.content;
    let content = JobContent {
        title: replace("title", &current.title, req.title)?,
        company: replace("company", &current.company, req.company)?,
        description: replace("description", &current.description, req.description)?,
        requirements: replace("requirements", &current.requirements, req.requirements)?,
        location: replace("location", &current.location, req.location)?,
        job_type: match req.job_type.as_deref() {
            Some(raw) => raw.parse::<JobType>()?,
            None => current.job_type,
        },
        salary: merge_salary(&current.salary, req.salary)?,
        skills: match req.skills {
            Some(skills) => clean_skills(skills),
            None => current.skills.clone(),
        },
    };
    let status = match req.status.as_deref() {
        Some(raw) => raw.parse::<JobStatus>()?,
        None => job.status,
    };
    Ok((content, status))
}

async fn load(store: &dyn Store, id: Uuid) -> Result<Job, AppError> {
    store
        .find_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

/// Active jobs for everyone; with `mine`, an employer sees all of their own.
pub async fn list_jobs(
    store: &dyn Store,
    principal: Option<&Principal>,
    mine: bool,
) -> Result<Vec<Job>, AppError> {
    match principal {
        Some(p) if mine && p.is_employer() => store.list_jobs_by_employer(p.id).await,
        _ => store.list_active_jobs().await,
    }
}

pub async fn get_job(
    store: &dyn Store,
    principal: Option<&Principal>,
    id: Uuid,
) -> Result<Job, AppError> {
    let job = load(store, id).await?;
    ensure(principal, Action::Read, &Target::Job(JobFacts::from(&job)))?;
    Ok(job)
}

pub async fn create_job(
    store: &dyn Store,
    principal: &Principal,
    req: JobRequest,
) -> Result<Job, AppError> {
    ensure(Some(principal), Action::Create, &Target::NewJob)?;
    let content = validate_new_job(req)?;

    let job = store
        .create_job(NewJob {
            employer_id: principal.id,
            content,
        })
        .await?;
    info!("Employer {} posted job {}", principal.id, job.id);
    Ok(job)
}

pub async fn update_job(
    store: &dyn Store,
    principal: &Principal,
    id: Uuid,
    req: JobRequest,
) -> Result<Job, AppError> {
    let job = load(store, id).await?;
    let action = if req.status.is_some() {
        Action::UpdateStatus
    } else {
        Action::UpdateContent
    };
    ensure(Some(principal), action, &Target::Job(JobFacts::from(&job)))?;

    let (content, status) = apply_update(&job, req)?;
    let updated = store
        .update_job(id, &content, status)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    info!("Employer {} updated job {}", principal.id, id);
    Ok(updated)
}

/// Deletes a job with all of its applications. Returns how many applications were removed.
pub async fn delete_job(
    store: &dyn Store,
    principal: &Principal,
    id: Uuid,
) -> Result<u64, AppError> {
    let job = load(store, id).await?;
    ensure(Some(principal), Action::Delete, &Target::Job(JobFacts::from(&job)))?;

    let removed = store
        .delete_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    info!(
        "Employer {} deleted job {} ({} application(s) removed)",
        principal.id, id, removed
    );
    Ok(removed)
}
