//! Applications: submitted by seekers, reviewed by the employer owning the job.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{ensure, Action, ApplicationFacts, JobFacts, Target};
use crate::auth::principal::Principal;
use crate::errors::AppError;
use crate::models::application::{
    Application, ApplicationDetail, ApplicationRecord, ApplicationStatus, ApplicationSummary,
    NewApplication,
};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyRequest {
    pub job_id: Option<Uuid>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

async fn load(store: &dyn Store, id: Uuid) -> Result<ApplicationRecord, AppError> {
    store
        .find_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
}

pub async fn apply(
    store: &dyn Store,
    principal: &Principal,
    req: ApplyRequest,
) -> Result<Application, AppError> {
    let cover_letter = req.cover_letter.map(|c| c.trim().to_string());
    let (job_id, cover_letter) = match (req.job_id, cover_letter) {
        (Some(job_id), Some(cover)) if !cover.is_empty() => (job_id, cover),
        _ => {
            return Err(AppError::Validation(
                "Job ID and cover letter are required".to_string(),
            ))
        }
    };

    let job = store
        .find_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    let already_applied = principal.is_seeker() && store.has_applied(job_id, principal.id).await?;
    ensure(
        Some(principal),
        Action::Create,
        &Target::Opening {
            job: JobFacts::from(&job),
            already_applied,
        },
    )?;

    let application = store
        .create_application(NewApplication {
            job_id,
            seeker_id: principal.id,
            cover_letter,
        })
        .await?;
    info!(
        "Seeker {} applied to job {} (application {})",
        principal.id, job_id, application.id
    );
    Ok(application)
}

/// Seekers see their own applications. Employers see those sent to their
/// jobs, optionally narrowed to one job they own.
pub async fn list_applications(
    store: &dyn Store,
    principal: &Principal,
    job_id: Option<Uuid>,
) -> Result<Vec<ApplicationSummary>, AppError> {
    if principal.is_seeker() {
        return store.list_applications_for_seeker(principal.id).await;
    }

    if let Some(job_id) = job_id {
        let job = store
            .find_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        ensure(Some(principal), Action::Review, &Target::Job(JobFacts::from(&job)))?;
    }
    store
        .list_applications_for_employer(principal.id, job_id)
        .await
}

/// The full view of one application: job, applicant contact and skills, and
/// the attached resume's metadata.
pub async fn get_application(
    store: &dyn Store,
    principal: &Principal,
    id: Uuid,
) -> Result<ApplicationDetail, AppError> {
    let record = load(store, id).await?;
    ensure(
        Some(principal),
        Action::Read,
        &Target::Application(ApplicationFacts::from(&record)),
    )?;
    store
        .find_application_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
}

/// Any status may replace any other; only the job's employer may change it.
pub async fn update_status(
    store: &dyn Store,
    principal: &Principal,
    id: Uuid,
    req: StatusRequest,
) -> Result<Application, AppError> {
    let status = req
        .status
        .as_deref()
        .ok_or_else(|| AppError::Validation("Invalid status".to_string()))?
        .parse::<ApplicationStatus>()?;

    let record = load(store, id).await?;
    ensure(
        Some(principal),
        Action::UpdateStatus,
        &Target::Application(ApplicationFacts::from(&record)),
    )?;

    let updated = store
        .update_application_status(id, status)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
    info!(
        "Employer {} set application {} to {:?}",
        principal.id, id, status
    );
    Ok(updated)
}

pub async fn withdraw(store: &dyn Store, principal: &Principal, id: Uuid) -> Result<(), AppError> {
    let record = load(store, id).await?;
    ensure(
        Some(principal),
        Action::Delete,
        &Target::Application(ApplicationFacts::from(&record)),
    )?;

    if !store.delete_application(id).await? {
        return Err(AppError::NotFound("Application not found".to_string()));
    }
    info!("Seeker {} withdrew application {}", principal.id, id);
    Ok(())
}
