//! Ownership resolution: who may do what to which job, application or resume.

pub mod policy;

pub use policy::{authorize, Action, ApplicationFacts, Decision, Denial, JobFacts, ResumeFacts, Target};

use tracing::warn;

use crate::auth::principal::Principal;
use crate::errors::AppError;

/// Runs the policy and turns a denial into the error the caller should see.
pub fn ensure(
    principal: Option<&Principal>,
    action: Action,
    target: &Target,
) -> Result<(), AppError> {
    match authorize(principal, action, target) {
        Decision::Allow => Ok(()),
        Decision::Deny(denial) => {
            warn!(
                principal = ?principal.map(|p| p.id),
                ?action,
                target = %target,
                ?denial,
                "access denied"
            );
            Err(denial.into_error(action, target))
        }
    }
}

impl Denial {
    fn into_error(self, action: Action, target: &Target) -> AppError {
        match self {
            Denial::Unauthenticated => {
                AppError::Unauthorized("Authentication required".to_string())
            }
            Denial::JobClosed => {
                AppError::Validation("Job is no longer accepting applications".to_string())
            }
            Denial::AlreadyApplied => {
                AppError::Conflict("You have already applied to this job".to_string())
            }
            Denial::NotOwner => AppError::Forbidden(format!(
                "Not authorized to {} this {}",
                action.verb(),
                target.noun()
            )),
            Denial::NotPermitted => AppError::Forbidden("Insufficient permissions".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    use crate::models::job::JobStatus;
    use crate::models::user::Role;

    #[test]
    fn test_denials_map_to_distinct_statuses() {
        let owner = Uuid::new_v4();
        let job = JobFacts {
            id: Uuid::new_v4(),
            employer_id: owner,
            status: JobStatus::Active,
        };
        let stranger = Principal::new(Uuid::new_v4(), Role::Employer);
        let seeker = Principal::new(Uuid::new_v4(), Role::Seeker);

        let err = ensure(Some(&stranger), Action::Delete, &Target::Job(job)).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Forbidden: Not authorized to delete this job");

        let err = ensure(None, Action::Delete, &Target::Job(job)).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let opening = Target::Opening {
            job,
            already_applied: true,
        };
        let err = ensure(Some(&seeker), Action::Create, &opening).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
