//! Resume storage: one per seeker, downloadable by the owner and by employers
//! the seeker applied to with it.

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::access::{ensure, Action, ResumeFacts, Target};
use crate::auth::principal::Principal;
use crate::errors::AppError;
use crate::models::resume::{NewResume, Resume, ResumeMeta};
use crate::store::Store;

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// A file as handed over by the multipart reader.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

pub fn validate_upload(upload: &ResumeUpload) -> Result<(), AppError> {
    if upload.data.is_empty() {
        return Err(AppError::Validation("No file provided".to_string()));
    }
    if upload.data.len() > MAX_RESUME_BYTES {
        return Err(AppError::Validation(
            "File size must be less than 5MB".to_string(),
        ));
    }
    let mime = upload
        .content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ALLOWED_TYPES.contains(&mime.as_str()) {
        return Err(AppError::Validation(
            "Only PDF and Word documents are allowed".to_string(),
        ));
    }
    Ok(())
}

/// Keeps the stored name safe to echo back inside a quoted header parameter.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned.to_string()
    }
}

pub async fn upload_resume(
    store: &dyn Store,
    principal: &Principal,
    upload: ResumeUpload,
) -> Result<ResumeMeta, AppError> {
    ensure(
        Some(principal),
        Action::Upload,
        &Target::ResumeSlot {
            user_id: principal.id,
        },
    )?;
    validate_upload(&upload)?;

    let meta = store
        .replace_resume(NewResume {
            user_id: principal.id,
            file_name: sanitize_file_name(&upload.file_name),
            file_type: upload.content_type,
            data: upload.data.to_vec(),
        })
        .await?;
    info!(
        "Seeker {} uploaded resume {} ({} bytes)",
        principal.id, meta.id, meta.file_size
    );
    Ok(meta)
}

pub async fn current_resume(
    store: &dyn Store,
    principal: &Principal,
) -> Result<ResumeMeta, AppError> {
    ensure(
        Some(principal),
        Action::Read,
        &Target::ResumeSlot {
            user_id: principal.id,
        },
    )?;
    store
        .resume_for_user(principal.id)
        .await?
        .ok_or_else(|| AppError::NotFound("No resume found".to_string()))
}

pub async fn delete_resume(store: &dyn Store, principal: &Principal) -> Result<(), AppError> {
    ensure(
        Some(principal),
        Action::Delete,
        &Target::ResumeSlot {
            user_id: principal.id,
        },
    )?;

    if store.delete_resume_for_user(principal.id).await? == 0 {
        return Err(AppError::NotFound("No resume found".to_string()));
    }
    info!("Seeker {} deleted their resume", principal.id);
    Ok(())
}

/// Loads a resume for download. The owner always may; an employer may when
/// the seeker applied to one of their jobs with this exact resume.
pub async fn download_resume(
    store: &dyn Store,
    principal: &Principal,
    id: Uuid,
) -> Result<Resume, AppError> {
    let resume = store
        .find_resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    let linked = principal.is_employer()
        && store
            .has_application_link(principal.id, resume.user_id, resume.id)
            .await?;
    ensure(
        Some(principal),
        Action::Download,
        &Target::Resume(ResumeFacts::new(&resume, linked)),
    )?;
    Ok(resume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::applications::service::{apply, ApplyRequest};
    use crate::jobs::service::create_job;
    use crate::models::user::Role;
    use crate::store::memory::MemoryStore;
    use crate::test_support::{job_request, seed_user};

    fn pdf(name: &str, size: usize) -> ResumeUpload {
        ResumeUpload {
            file_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from(vec![b'%'; size]),
        }
    }

    #[test]
    fn test_validate_size_boundary() {
        assert!(validate_upload(&pdf("cv.pdf", MAX_RESUME_BYTES)).is_ok());
        let err = validate_upload(&pdf("cv.pdf", MAX_RESUME_BYTES + 1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(validate_upload(&pdf("cv.pdf", 0)).is_err());
    }

    #[test]
    fn test_validate_mime_types() {
        let mut upload = pdf("cv.docx", 10);
        upload.content_type = ALLOWED_TYPES[2].to_string();
        assert!(validate_upload(&upload).is_ok());
        upload.content_type = "Application/MSWord; charset=binary".to_string();
        assert!(validate_upload(&upload).is_ok());
        upload.content_type = "image/png".to_string();
        assert!(validate_upload(&upload).is_err());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("C:\\docs\\my \"cv\".pdf"), "my cv.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("line\r\nbreak.pdf"), "linebreak.pdf");
        assert_eq!(sanitize_file_name(""), "resume");
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_before_any_write() {
        let store = MemoryStore::new();
        let seeker = seed_user(&store, Role::Seeker).await;
        let err = upload_resume(&store, &seeker, pdf("big.pdf", 6 * 1024 * 1024))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.resume_count_for_user(seeker.id).await, 0);
    }

    #[tokio::test]
    async fn test_employers_cannot_upload() {
        let store = MemoryStore::new();
        let employer = seed_user(&store, Role::Employer).await;
        let err = upload_resume(&store, &employer, pdf("cv.pdf", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_second_upload_replaces_first() {
        let store = MemoryStore::new();
        let seeker = seed_user(&store, Role::Seeker).await;
        let first = upload_resume(&store, &seeker, pdf("one.pdf", 10)).await.unwrap();
        let second = upload_resume(&store, &seeker, pdf("two.pdf", 20)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.resume_count_for_user(seeker.id).await, 1);
        let current = current_resume(&store, &seeker).await.unwrap();
        assert_eq!(current.id, second.id);
        assert_eq!(current.file_size, 20);
    }

    #[tokio::test]
    async fn test_concurrent_uploads_leave_one_resume() {
        let store = Arc::new(MemoryStore::new());
        let seeker = seed_user(&*store, Role::Seeker).await;

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    upload_resume(&*store, &seeker, pdf(&format!("cv-{i}.pdf"), 10 + i)).await
                })
            })
            .collect();
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }

        assert_eq!(store.resume_count_for_user(seeker.id).await, 1);
        let survivor = current_resume(&*store, &seeker).await.unwrap();
        assert!(ids.contains(&survivor.id));
    }

    #[tokio::test]
    async fn test_delete_resume() {
        let store = MemoryStore::new();
        let seeker = seed_user(&store, Role::Seeker).await;
        let err = delete_resume(&store, &seeker).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        upload_resume(&store, &seeker, pdf("cv.pdf", 10)).await.unwrap();
        delete_resume(&store, &seeker).await.unwrap();
        assert!(current_resume(&store, &seeker).await.is_err());
    }

    #[tokio::test]
    async fn test_download_eligibility() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, Role::Seeker).await;
        let hiring = seed_user(&store, Role::Employer).await;
        let unrelated = seed_user(&store, Role::Employer).await;
        let other_seeker = seed_user(&store, Role::Seeker).await;

        let resume = upload_resume(&store, &owner, pdf("cv.pdf", 10)).await.unwrap();
        let job = create_job(&store, &hiring, job_request("Engineer")).await.unwrap();

        // Before applying, only the owner may download.
        assert_eq!(
            download_resume(&store, &owner, resume.id).await.unwrap().data.len(),
            10
        );
        let err = download_resume(&store, &hiring, resume.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let application = apply(
            &store,
            &owner,
            ApplyRequest {
                job_id: Some(job.id),
                cover_letter: Some("Hi".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(application.resume_id, Some(resume.id));

        assert!(download_resume(&store, &hiring, resume.id).await.is_ok());
        let err = download_resume(&store, &unrelated, resume.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = download_resume(&store, &other_seeker, resume.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = download_resume(&store, &owner, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_replacing_resume_drops_old_link() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, Role::Seeker).await;
        let hiring = seed_user(&store, Role::Employer).await;
        upload_resume(&store, &owner, pdf("old.pdf", 10)).await.unwrap();
        let job = create_job(&store, &hiring, job_request("Engineer")).await.unwrap();
        apply(
            &store,
            &owner,
            ApplyRequest {
                job_id: Some(job.id),
                cover_letter: Some("Hi".to_string()),
            },
        )
        .await
        .unwrap();

        let fresh = upload_resume(&store, &owner, pdf("new.pdf", 10)).await.unwrap();
        let err = download_resume(&store, &hiring, fresh.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
