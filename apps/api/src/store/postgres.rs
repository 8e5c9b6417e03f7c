use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
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

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const APPLICATION_JOB_FK: &str = "applications_job_id_fkey";

const SUMMARY_SELECT: &str = r#"
    SELECT a.*,
           j.title    AS job_title,
           j.company  AS job_company,
           j.location AS job_location,
           u.name     AS seeker_name,
           u.email    AS seeker_email
    FROM applications a
    JOIN jobs j  ON j.id = a.job_id
    JOIN users u ON u.id = a.seeker_id
"#;

const RESUME_META_COLUMNS: &str = "id, user_id, file_name, file_type, file_size, uploaded_at";

const DETAIL_SELECT: &str = r#"
    SELECT a.*,
           j.title       AS job_title,
           j.company     AS job_company,
           j.location    AS job_location,
           u.name        AS seeker_name,
           u.email       AS seeker_email,
           u.skills      AS seeker_skills,
           r.file_name   AS resume_file_name,
           r.file_type   AS resume_file_type,
           r.file_size   AS resume_file_size,
           r.uploaded_at AS resume_uploaded_at
    FROM applications a
    JOIN jobs j  ON j.id = a.job_id
    JOIN users u ON u.id = a.seeker_id
    LEFT JOIN resumes r ON r.id = a.resume_id
    WHERE a.id = $1
"#;

/// A foreign key whose violation means the referenced parent row is gone.
#[derive(Debug, Clone, Copy)]
struct MissingParent {
    constraint: &'static str,
    message: &'static str,
}

/// The caller-facing error for a constraint violation, if it is one we translate.
fn constraint_error(
    code: Option<&str>,
    constraint: Option<&str>,
    unique: &'static str,
    missing_parent: Option<MissingParent>,
) -> Option<AppError> {
    match code {
        Some(UNIQUE_VIOLATION) => Some(AppError::Conflict(unique.to_string())),
        Some(FOREIGN_KEY_VIOLATION) => missing_parent
            .filter(|parent| constraint == Some(parent.constraint))
            .map(|parent| AppError::Validation(parent.message.to_string())),
        _ => None,
    }
}

/// Maps constraint violations per `constraint_error`; everything else stays a database error.
fn on_constraint(
    unique: &'static str,
    missing_parent: Option<MissingParent>,
) -> impl Fn(sqlx::Error) -> AppError {
    move |err| {
        let translated = match &err {
            sqlx::Error::Database(db) => constraint_error(
                db.code().as_deref(),
                db.constraint(),
                unique,
                missing_parent,
            ),
            _ => None,
        };
        translated.unwrap_or(AppError::Database(err))
    }
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, phone, company, skills)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.phone)
        .bind(&user.company)
        .bind(&user.skills)
        .fetch_one(&self.pool)
        .await
        .map_err(on_constraint(DUPLICATE_USER, None))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_active_jobs(&self) -> Result<Vec<Job>, AppError> {
        Ok(sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE status = 'active' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_jobs_by_employer(&self, employer_id: Uuid) -> Result<Vec<Job>, AppError> {
        Ok(sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC",
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, AppError> {
        let NewJob {
            employer_id,
            content,
        } = job;
        Ok(sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
                (id, employer_id, title, company, description, requirements, location,
                 job_type, salary_min, salary_max, salary_currency, skills)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(employer_id)
        .bind(&content.title)
        .bind(&content.company)
        .bind(&content.description)
        .bind(&content.requirements)
        .bind(&content.location)
        .bind(content.job_type)
        .bind(content.salary.min)
        .bind(content.salary.max)
        .bind(&content.salary.currency)
        .bind(&content.skills)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_job(
        &self,
        id: Uuid,
        content: &JobContent,
        status: JobStatus,
    ) -> Result<Option<Job>, AppError> {
        Ok(sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET title = $2, company = $3, description = $4, requirements = $5,
                location = $6, job_type = $7, salary_min = $8, salary_max = $9,
                salary_currency = $10, skills = $11, status = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&content.title)
        .bind(&content.company)
        .bind(&content.description)
        .bind(&content.requirements)
        .bind(&content.location)
        .bind(content.job_type)
        .bind(content.salary.min)
        .bind(content.salary.max)
        .bind(&content.salary.currency)
        .bind(&content.skills)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_job(&self, id: Uuid) -> Result<Option<u64>, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM applications WHERE job_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        info!("Deleted job {id} and {removed} application(s)");
        Ok(Some(removed))
    }

    async fn has_applied(&self, job_id: Uuid, seeker_id: Uuid) -> Result<bool, AppError> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE job_id = $1 AND seeker_id = $2)",
        )
        .bind(job_id)
        .bind(seeker_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn create_application(&self, new: NewApplication) -> Result<Application, AppError> {
        let mut tx = self.pool.begin().await?;

        let resume_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM resumes WHERE user_id = $1")
                .bind(new.seeker_id)
                .fetch_optional(&mut *tx)
                .await?;

        // The (job_id, seeker_id) unique constraint settles concurrent duplicates;
        // the job FK catches a job deleted since the caller looked it up.
        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (id, job_id, seeker_id, cover_letter, resume_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.job_id)
        .bind(new.seeker_id)
        .bind(&new.cover_letter)
        .bind(resume_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(on_constraint(
            DUPLICATE_APPLICATION,
            Some(MissingParent {
                constraint: APPLICATION_JOB_FK,
                message: JOB_NOT_ACCEPTING,
            }),
        ))?;

        let bumped = sqlx::query(
            r#"
            UPDATE jobs SET application_count = application_count + 1
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(new.job_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if bumped == 0 {
            tx.rollback().await?;
            return Err(AppError::Validation(JOB_NOT_ACCEPTING.to_string()));
        }

        tx.commit().await?;
        Ok(application)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationRecord>, AppError> {
        Ok(sqlx::query_as::<_, ApplicationRecord>(
            r#"
            SELECT a.*, j.employer_id AS job_employer_id
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_application_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<ApplicationDetail>, AppError> {
        Ok(sqlx::query_as::<_, ApplicationDetail>(DETAIL_SELECT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_applications_for_seeker(
        &self,
        seeker_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, AppError> {
        let sql = format!("{SUMMARY_SELECT} WHERE a.seeker_id = $1 ORDER BY a.applied_at DESC");
        Ok(sqlx::query_as::<_, ApplicationSummary>(&sql)
            .bind(seeker_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_applications_for_employer(
        &self,
        employer_id: Uuid,
        job_id: Option<Uuid>,
    ) -> Result<Vec<ApplicationSummary>, AppError> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE j.employer_id = $1 AND ($2::uuid IS NULL OR a.job_id = $2) \
             ORDER BY a.applied_at DESC"
        );
        Ok(sqlx::query_as::<_, ApplicationSummary>(&sql)
            .bind(employer_id)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, AppError> {
        Ok(sqlx::query_as::<_, Application>(
            "UPDATE applications SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_application(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let job_id: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM applications WHERE id = $1 RETURNING job_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(job_id) = job_id else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query("UPDATE jobs SET application_count = application_count - 1 WHERE id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn replace_resume(&self, new: NewResume) -> Result<ResumeMeta, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the owner serializes concurrent uploads by the same seeker.
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(new.user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owner.is_none() {
            tx.rollback().await?;
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let replaced = sqlx::query("DELETE FROM resumes WHERE user_id = $1")
            .bind(new.user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let file_size = i64::try_from(new.data.len())
            .map_err(|_| AppError::Validation("File is too large".to_string()))?;
        let sql = format!(
            r#"
            INSERT INTO resumes (id, user_id, file_name, file_type, file_size, data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RESUME_META_COLUMNS}
            "#
        );
        let meta = sqlx::query_as::<_, ResumeMeta>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.user_id)
            .bind(&new.file_name)
            .bind(&new.file_type)
            .bind(file_size)
            .bind(&new.data)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        if replaced > 0 {
            info!("Replaced resume for user {}", new.user_id);
        }
        Ok(meta)
    }

    async fn find_resume(&self, id: Uuid) -> Result<Option<Resume>, AppError> {
        Ok(sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn resume_for_user(&self, user_id: Uuid) -> Result<Option<ResumeMeta>, AppError> {
        let sql = format!("SELECT {RESUME_META_COLUMNS} FROM resumes WHERE user_id = $1");
        Ok(sqlx::query_as::<_, ResumeMeta>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_resume_for_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        Ok(sqlx::query("DELETE FROM resumes WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected())
    }

    async fn has_application_link(
        &self,
        employer_id: Uuid,
        seeker_id: Uuid,
        resume_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM applications a
                JOIN jobs j ON j.id = a.job_id
                WHERE j.employer_id = $1 AND a.seeker_id = $2 AND a.resume_id = $3
            )
            "#,
        )
        .bind(employer_id)
        .bind(seeker_id)
        .bind(resume_id)
        .fetch_one(&self.pool)
        .await?)
    }
}
