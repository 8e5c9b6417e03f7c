//! Persistence boundary for users, jobs, applications and resumes.
//!
//! Every method that touches more than one row is atomic: the application
//! counter moves in the same transaction as the application it counts, a job
//! takes its applications with it, and a resume replacement is one swap.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{
    Application, ApplicationDetail, ApplicationRecord, ApplicationStatus, ApplicationSummary,
    NewApplication,
};
use crate::models::job::{Job, JobContent, JobStatus, NewJob};
use crate::models::resume::{NewResume, Resume, ResumeMeta};
use crate::models::user::{NewUser, User};

pub const DUPLICATE_APPLICATION: &str = "You have already applied to this job";
pub const DUPLICATE_USER: &str = "User already exists";
pub const JOB_NOT_ACCEPTING: &str = "Job is no longer accepting applications";

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Active jobs, newest first.
    async fn list_active_jobs(&self) -> Result<Vec<Job>, AppError>;
    /// All of an employer's jobs regardless of status, newest first.
    async fn list_jobs_by_employer(&self, employer_id: Uuid) -> Result<Vec<Job>, AppError>;
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError>;
    async fn create_job(&self, job: NewJob) -> Result<Job, AppError>;
    /// Overwrites content and status, leaving the application counter alone.
    async fn update_job(
        &self,
        id: Uuid,
        content: &JobContent,
        status: JobStatus,
    ) -> Result<Option<Job>, AppError>;
    /// Deletes the job and every application to it. Returns how many
    /// applications went with it, or `None` if the job was already gone.
    async fn delete_job(&self, id: Uuid) -> Result<Option<u64>, AppError>;

    async fn has_applied(&self, job_id: Uuid, seeker_id: Uuid) -> Result<bool, AppError>;
    /// Inserts the application with the seeker's current resume attached and
    /// bumps the job's counter. A second application for the same
    /// (job, seeker) fails with `Conflict`; a job that closed or vanished in
    /// the meantime fails with `Validation`.
    async fn create_application(&self, new: NewApplication) -> Result<Application, AppError>;
    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationRecord>, AppError>;
    async fn find_application_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<ApplicationDetail>, AppError>;
    async fn list_applications_for_seeker(
        &self,
        seeker_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, AppError>;
    async fn list_applications_for_employer(
        &self,
        employer_id: Uuid,
        job_id: Option<Uuid>,
    ) -> Result<Vec<ApplicationSummary>, AppError>;
    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError>;
    /// Deletes the application and decrements its job's counter.
    async fn delete_application(&self, id: Uuid) -> Result<bool, AppError>;

    /// Swaps whatever resume the user has for this one.
    async fn replace_resume(&self, new: NewResume) -> Result<ResumeMeta, AppError>;
    async fn find_resume(&self, id: Uuid) -> Result<Option<Resume>, AppError>;
    async fn resume_for_user(&self, user_id: Uuid) -> Result<Option<ResumeMeta>, AppError>;
    async fn delete_resume_for_user(&self, user_id: Uuid) -> Result<u64, AppError>;
    /// True when some job owned by `employer_id` has an application from
    /// `seeker_id` carrying `resume_id`.
    async fn has_application_link(
        &self,
        employer_id: Uuid,
        seeker_id: Uuid,
        resume_id: Uuid,
    ) -> Result<bool, AppError>;
}
