//! The hosted backend-as-a-service seam.
//!
//! Everything the presentation layer reads or writes goes through [`Backend`]:
//! table access for `jobs`, `companies`, `profiles`, `applications`,
//! `job_applications` and `saved_jobs`, plus the hosted auth endpoints.
//! Implementations surface failures as a structured [`BackendError`] so callers
//! branch on [`BackendErrorKind`] instead of message text.

pub mod memory;
pub mod query;
pub mod supabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    application::{Application, ApplicationStatus, ApplicationTable, NewApplication},
    company::Company,
    job::{Job, JobStatus, NewJob},
    profile::{NewProfile, ProfileChanges, ProfileRow},
    saved_job::{NewSavedJob, SavedJob},
};

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Who a request is made on behalf of. Signed-in callers forward their own
/// access token so row-level security applies to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User { user_id: Uuid, access_token: String },
}

impl Caller {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Caller::Anonymous => None,
            Caller::User { user_id, .. } => Some(*user_id),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::User { access_token, .. } => Some(access_token),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// A single-row lookup matched nothing.
    NotFound,
    /// An insert hit a uniqueness constraint.
    UniqueViolation,
    /// Missing, expired or insufficient credentials, including row-level security denials.
    Unauthorized,
    /// The backend could not be reached.
    Transport,
    /// The backend answered with a body we could not decode.
    Decode,
    /// Any other refusal.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub code: Option<String>,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_unique_violation(&self) -> bool {
        self.kind == BackendErrorKind::UniqueViolation
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == BackendErrorKind::NotFound
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub offset: i64,
    pub limit: i64,
}

/// Equality filters over `jobs`; every `Some` field narrows the selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub ids: Option<Vec<Uuid>>,
    pub company: Option<String>,
    pub posted_by: Option<Uuid>,
    pub status: Option<JobStatus>,
    pub job_type: Option<String>,
    pub is_remote: Option<bool>,
}

impl JobFilter {
    pub fn active() -> Self {
        Self {
            status: Some(JobStatus::Active),
            ..Self::default()
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.ids.as_ref().map_or(true, |ids| ids.contains(&job.id))
            && self.company.as_ref().map_or(true, |c| *c == job.company)
            && self.posted_by.map_or(true, |p| job.posted_by == Some(p))
            && self.status.map_or(true, |s| job.status == s)
            && self.job_type.as_ref().map_or(true, |t| *t == job.job_type)
            && self.is_remote.map_or(true, |r| job.is_remote() == r)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationFilter {
    pub user_id: Option<Uuid>,
    pub job_ids: Option<Vec<Uuid>>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        self.user_id.map_or(true, |u| application.user_id == u)
            && self
                .job_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&application.job_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: AuthUser,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    /// Absent when the project requires email confirmation first.
    pub session: Option<AuthSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignUpMetadata {
    pub account_type: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub data: SignUpMetadata,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession>;
    async fn sign_up(&self, request: &SignUpRequest) -> BackendResult<SignUpOutcome>;
    /// Ends the caller's session. Hosted auth revokes the refresh token only;
    /// an issued access token still verifies until it expires.
    async fn sign_out(&self, caller: &Caller) -> BackendResult<()>;
    async fn request_password_reset(
        &self,
        email: &str,
        redirect_to: Option<String>,
    ) -> BackendResult<()>;
    async fn update_password(&self, caller: &Caller, new_password: &str) -> BackendResult<()>;

    async fn list_jobs(
        &self,
        caller: &Caller,
        filter: &JobFilter,
        range: Option<PageRange>,
    ) -> BackendResult<Vec<Job>>;
    async fn count_jobs(&self, caller: &Caller, filter: &JobFilter) -> BackendResult<i64>;
    async fn get_job(&self, caller: &Caller, id: Uuid) -> BackendResult<Option<Job>>;
    async fn insert_job(&self, caller: &Caller, job: &NewJob) -> BackendResult<Job>;
    async fn update_job_status(
        &self,
        caller: &Caller,
        id: Uuid,
        status: JobStatus,
    ) -> BackendResult<Job>;

    async fn list_companies(&self, caller: &Caller) -> BackendResult<Vec<Company>>;
    async fn get_company(&self, caller: &Caller, id: Uuid) -> BackendResult<Option<Company>>;
    async fn find_company_by_name(
        &self,
        caller: &Caller,
        name: &str,
    ) -> BackendResult<Option<Company>>;

    async fn get_profile(&self, caller: &Caller, user_id: Uuid)
        -> BackendResult<Option<ProfileRow>>;
    async fn insert_profile(&self, caller: &Caller, profile: &NewProfile)
        -> BackendResult<ProfileRow>;
    async fn update_profile(
        &self,
        caller: &Caller,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> BackendResult<ProfileRow>;

    async fn list_applications(
        &self,
        caller: &Caller,
        table: ApplicationTable,
        filter: &ApplicationFilter,
    ) -> BackendResult<Vec<Application>>;
    async fn insert_application(
        &self,
        caller: &Caller,
        application: &NewApplication,
    ) -> BackendResult<Application>;
    async fn update_application_status(
        &self,
        caller: &Caller,
        table: ApplicationTable,
        id: Uuid,
        status: ApplicationStatus,
    ) -> BackendResult<Application>;
    /// Deletes the row and returns it as it was.
    async fn delete_application(
        &self,
        caller: &Caller,
        table: ApplicationTable,
        id: Uuid,
    ) -> BackendResult<Application>;

    async fn is_job_saved(&self, caller: &Caller, user_id: Uuid, job_id: Uuid)
        -> BackendResult<bool>;
    async fn list_saved_jobs(&self, caller: &Caller, user_id: Uuid) -> BackendResult<Vec<SavedJob>>;
    async fn insert_saved_job(&self, caller: &Caller, saved: &NewSavedJob)
        -> BackendResult<SavedJob>;
    async fn delete_saved_job(&self, caller: &Caller, user_id: Uuid, job_id: Uuid)
        -> BackendResult<()>;
}
