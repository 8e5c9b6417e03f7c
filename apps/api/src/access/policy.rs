use std::fmt;

use uuid::Uuid;

use crate::auth::principal::Principal;
use crate::models::application::ApplicationRecord;
use crate::models::job::{Job, JobStatus};
use crate::models::resume::Resume;
use crate::models::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    UpdateContent,
    UpdateStatus,
    Delete,
    /// Listing the applications submitted to a job.
    Review,
    Upload,
    Download,
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Read => "view",
            Action::Create => "create",
            Action::UpdateContent | Action::UpdateStatus => "update",
            Action::Delete => "delete",
            Action::Review => "review applications for",
            Action::Upload => "upload",
            Action::Download => "download",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobFacts {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub status: JobStatus,
}

impl From<&Job> for JobFacts {
    fn from(job: &Job) -> Self {
        JobFacts {
            id: job.id,
            employer_id: job.employer_id,
            status: job.status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationFacts {
    pub id: Uuid,
    pub seeker_id: Uuid,
    pub job_employer_id: Uuid,
}

impl From<&ApplicationRecord> for ApplicationFacts {
    fn from(record: &ApplicationRecord) -> Self {
        ApplicationFacts {
            id: record.application.id,
            seeker_id: record.application.seeker_id,
            job_employer_id: record.job_employer_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeFacts {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Set when the acting employer owns a job that this seeker applied to
    /// with exactly this resume.
    pub linked_to_principal: bool,
}

impl ResumeFacts {
    pub fn new(resume: &Resume, linked_to_principal: bool) -> Self {
        ResumeFacts {
            id: resume.id,
            user_id: resume.user_id,
            linked_to_principal,
        }
    }
}

/// What an action is aimed at, with the relationship fields the rules need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Posting a job that does not exist yet.
    NewJob,
    Job(JobFacts),
    /// Applying to a job.
    Opening { job: JobFacts, already_applied: bool },
    Application(ApplicationFacts),
    /// A user's resume slot, whether or not a resume currently fills it.
    ResumeSlot { user_id: Uuid },
    Resume(ResumeFacts),
}

impl Target {
    pub fn noun(&self) -> &'static str {
        match self {
            Target::NewJob | Target::Job(_) | Target::Opening { .. } => "job",
            Target::Application(_) => "application",
            Target::ResumeSlot { .. } | Target::Resume(_) => "resume",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::NewJob => f.write_str("new job"),
            Target::Job(job) | Target::Opening { job, .. } => write!(f, "job {}", job.id),
            Target::Application(app) => write!(f, "application {}", app.id),
            Target::ResumeSlot { user_id } => write!(f, "resume slot of {user_id}"),
            Target::Resume(resume) => write!(f, "resume {}", resume.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No principal, and the rule needs one.
    Unauthenticated,
    /// Right role, wrong relationship to the entity.
    NotOwner,
    /// No rule grants this role the action.
    NotPermitted,
    JobClosed,
    AlreadyApplied,
}

fn owned_by(principal: &Principal, owner_id: Uuid) -> Decision {
    if principal.id == owner_id {
        Decision::Allow
    } else {
        Decision::Deny(Denial::NotOwner)
    }
}

/// Decides whether `principal` may perform `action` on `target`.
///
/// Pure: never touches the store, never fails. Any combination without a
/// matching rule is denied.
pub fn authorize(principal: Option<&Principal>, action: Action, target: &Target) -> Decision {
    use Action::*;

    if let (Read, Target::Job(job)) = (action, target) {
        if job.status == JobStatus::Active {
            return Decision::Allow;
        }
    }

    let Some(principal) = principal else {
        return Decision::Deny(Denial::Unauthenticated);
    };

    match (principal.role, action, target) {
        (Role::Employer, Create, Target::NewJob) => Decision::Allow,
        (Role::Employer, Read | UpdateContent | UpdateStatus | Delete | Review, Target::Job(job)) => {
            owned_by(principal, job.employer_id)
        }

        (Role::Seeker, Create, Target::Opening { job, already_applied }) => {
            if job.status != JobStatus::Active {
                Decision::Deny(Denial::JobClosed)
            } else if *already_applied {
                Decision::Deny(Denial::AlreadyApplied)
            } else {
                Decision::Allow
            }
        }
        (Role::Seeker, Read | Delete, Target::Application(app)) => {
            owned_by(principal, app.seeker_id)
        }
        (Role::Employer, Read | UpdateStatus, Target::Application(app)) => {
            owned_by(principal, app.job_employer_id)
        }

        (Role::Seeker, Upload | Read | Delete, Target::ResumeSlot { user_id }) => {
            owned_by(principal, *user_id)
        }
        (Role::Seeker, Read | Delete, Target::Resume(resume)) => {
            owned_by(principal, resume.user_id)
        }
        (_, Download, Target::Resume(resume)) => {
            if principal.id == resume.user_id
                || (principal.role == Role::Employer && resume.linked_to_principal)
            {
                Decision::Allow
            } else {
                Decision::Deny(Denial::NotOwner)
            }
        }

        _ => Decision::Deny(Denial::NotPermitted),
    }
}
