//! In-process store used by the test suites. One lock guards all tables, so
//! every method is trivially atomic; the constraints mirror the SQL schema.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{
    Application, ApplicationDetail, ApplicationRecord, ApplicationStatus, ApplicationSummary,
    NewApplication,
};
use crate::models::job::{Job, JobContent, JobStatus, NewJob};
use crate::models::resume::{NewResume, Resume, ResumeMeta};
use crate::models::user::{NewUser, User};
use crate::store::{Store, DUPLICATE_APPLICATION, DUPLICATE_USER, JOB_NOT_ACCEPTING};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    jobs: HashMap<Uuid, Job>,
    applications: HashMap<Uuid, Application>,
    resumes: HashMap<Uuid, Resume>,
}

impl Tables {
    fn summarize(&self, application: &Application) -> Option<ApplicationSummary> {
        let job = self.jobs.get(&application.job_id)?;
        let seeker = self.users.get(&application.seeker_id)?;
        Some(ApplicationSummary {
            application: application.clone(),
            job_title: job.content.title.clone(),
            job_company: job.content.company.clone(),
            job_location: job.content.location.clone(),
            seeker_name: seeker.name.clone(),
            seeker_email: seeker.email.clone(),
        })
    }

    fn summaries<F>(&self, keep: F) -> Vec<ApplicationSummary>
    where
        F: Fn(&Application) -> bool,
    {
        let mut rows: Vec<_> = self
            .applications
            .values()
            .filter(|a| keep(a))
            .filter_map(|a| self.summarize(a))
            .collect();
        rows.sort_by(|a, b| b.application.applied_at.cmp(&a.application.applied_at));
        rows
    }
}

fn newest_first(mut jobs: Vec<Job>) -> Vec<Job> {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    jobs
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn application_count_for_job(&self, job_id: Uuid) -> usize {
        let tables = self.tables.lock().await;
        tables
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .count()
    }

    pub async fn resume_count_for_user(&self, user_id: Uuid) -> usize {
        let tables = self.tables.lock().await;
        tables
            .resumes
            .values()
            .filter(|r| r.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(DUPLICATE_USER.to_string()));
        }
        let row = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            phone: user.phone,
            company: user.company,
            skills: user.skills,
            created_at: Utc::now(),
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_active_jobs(&self) -> Result<Vec<Job>, AppError> {
        let tables = self.tables.lock().await;
        Ok(newest_first(
            tables
                .jobs
                .values()
                .filter(|j| j.status == JobStatus::Active)
                .cloned()
                .collect(),
        ))
    }

    async fn list_jobs_by_employer(&self, employer_id: Uuid) -> Result<Vec<Job>, AppError> {
        let tables = self.tables.lock().await;
        Ok(newest_first(
            tables
                .jobs
                .values()
                .filter(|j| j.employer_id == employer_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(self.tables.lock().await.jobs.get(&id).cloned())
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, AppError> {
        let mut tables = self.tables.lock().await;
        let row = Job {
            id: Uuid::new_v4(),
            employer_id: job.employer_id,
            content: job.content,
            status: JobStatus::Active,
            application_count: 0,
            created_at: Utc::now(),
        };
        tables.jobs.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_job(
        &self,
        id: Uuid,
        content: &JobContent,
        status: JobStatus,
    ) -> Result<Option<Job>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.jobs.get_mut(&id).map(|job| {
            job.content = content.clone();
            job.status = status;
            job.clone()
        }))
    }

    async fn delete_job(&self, id: Uuid) -> Result<Option<u64>, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.jobs.remove(&id).is_none() {
            return Ok(None);
        }
        let before = tables.applications.len();
        tables.applications.retain(|_, a| a.job_id != id);
        Ok(Some((before - tables.applications.len()) as u64))
    }

    async fn has_applied(&self, job_id: Uuid, seeker_id: Uuid) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .applications
            .values()
            .any(|a| a.job_id == job_id && a.seeker_id == seeker_id))
    }

    async fn create_application(&self, new: NewApplication) -> Result<Application, AppError> {
        let mut tables = self.tables.lock().await;
        if tables
            .applications
            .values()
            .any(|a| a.job_id == new.job_id && a.seeker_id == new.seeker_id)
        {
            return Err(AppError::Conflict(DUPLICATE_APPLICATION.to_string()));
        }
        match tables.jobs.get(&new.job_id) {
            Some(job) if job.status == JobStatus::Active => {}
            _ => return Err(AppError::Validation(JOB_NOT_ACCEPTING.to_string())),
        }

        let resume_id = tables
            .resumes
            .values()
            .find(|r| r.user_id == new.seeker_id)
            .map(|r| r.id);
        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            job_id: new.job_id,
            seeker_id: new.seeker_id,
            cover_letter: new.cover_letter,
            status: ApplicationStatus::Pending,
            resume_id,
            applied_at: now,
            updated_at: now,
        };
        tables.applications.insert(application.id, application.clone());
        if let Some(job) = tables.jobs.get_mut(&new.job_id) {
            job.application_count += 1;
        }
        Ok(application)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationRecord>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.applications.get(&id).and_then(|application| {
            tables.jobs.get(&application.job_id).map(|job| ApplicationRecord {
                application: application.clone(),
                job_employer_id: job.employer_id,
            })
        }))
    }

    async fn find_application_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<ApplicationDetail>, AppError> {
        let tables = self.tables.lock().await;
        let Some(summary) = tables
            .applications
            .get(&id)
            .and_then(|application| tables.summarize(application))
        else {
            return Ok(None);
        };
        let seeker_skills = tables
            .users
            .get(&summary.application.seeker_id)
            .map(|u| u.skills.clone())
            .unwrap_or_default();
        let resume = summary
            .application
            .resume_id
            .and_then(|resume_id| tables.resumes.get(&resume_id));
        Ok(Some(ApplicationDetail {
            seeker_skills,
            resume_file_name: resume.map(|r| r.file_name.clone()),
            resume_file_type: resume.map(|r| r.file_type.clone()),
            resume_file_size: resume.map(|r| r.file_size),
            resume_uploaded_at: resume.map(|r| r.uploaded_at),
            summary,
        }))
    }

    async fn list_applications_for_seeker(
        &self,
        seeker_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.summaries(|a| a.seeker_id == seeker_id))
    }

    async fn list_applications_for_employer(
        &self,
        employer_id: Uuid,
        job_id: Option<Uuid>,
    ) -> Result<Vec<ApplicationSummary>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.summaries(|a| {
            let owned = tables
                .jobs
                .get(&a.job_id)
                .is_some_and(|j| j.employer_id == employer_id);
            owned && job_id.map_or(true, |id| a.job_id == id)
        }))
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.applications.get_mut(&id).map(|application| {
            application.status = status;
            application.updated_at = Utc::now();
            application.clone()
        }))
    }

    async fn delete_application(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(application) = tables.applications.remove(&id) else {
            return Ok(false);
        };
        if let Some(job) = tables.jobs.get_mut(&application.job_id) {
            job.application_count -= 1;
        }
        Ok(true)
    }

    async fn replace_resume(&self, new: NewResume) -> Result<ResumeMeta, AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&new.user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        let stale: Vec<Uuid> = tables
            .resumes
            .values()
            .filter(|r| r.user_id == new.user_id)
            .map(|r| r.id)
            .collect();
        for id in &stale {
            tables.resumes.remove(id);
        }
        for application in tables.applications.values_mut() {
            if application.resume_id.is_some_and(|id| stale.contains(&id)) {
                application.resume_id = None;
            }
        }

        let resume = Resume {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            file_name: new.file_name,
            file_type: new.file_type,
            file_size: new.data.len() as i64,
            data: new.data,
            uploaded_at: Utc::now(),
        };
        let meta = ResumeMeta::from(&resume);
        tables.resumes.insert(resume.id, resume);
        Ok(meta)
    }

    async fn find_resume(&self, id: Uuid) -> Result<Option<Resume>, AppError> {
        Ok(self.tables.lock().await.resumes.get(&id).cloned())
    }

    async fn resume_for_user(&self, user_id: Uuid) -> Result<Option<ResumeMeta>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .resumes
            .values()
            .find(|r| r.user_id == user_id)
            .map(ResumeMeta::from))
    }

    async fn delete_resume_for_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().await;
        let before = tables.resumes.len();
        tables.resumes.retain(|_, r| r.user_id != user_id);
        let removed = before - tables.resumes.len();
        for application in tables.applications.values_mut() {
            if application.seeker_id == user_id {
                application.resume_id = None;
            }
        }
        Ok(removed as u64)
    }

    async fn has_application_link(
        &self,
        employer_id: Uuid,
        seeker_id: Uuid,
        resume_id: Uuid,
    ) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.applications.values().any(|a| {
            a.seeker_id == seeker_id
                && a.resume_id == Some(resume_id)
                && tables
                    .jobs
                    .get(&a.job_id)
                    .is_some_and(|j| j.employer_id == employer_id)
        }))
    }
}
