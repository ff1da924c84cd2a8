//! A process-local backend with the same row semantics as the hosted one.
//!
//! Selected with `BACKEND_PROVIDER=memory` for local runs and used by the
//! integration tests. Uniqueness guards and single-row lookups behave like
//! their PostgREST counterparts so services cannot tell the two apart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ApplicationFilter, AuthSession, AuthUser, Backend, BackendError, BackendErrorKind,
    BackendResult, Caller, JobFilter, PageRange, SignUpOutcome, SignUpRequest,
};
use crate::middleware::auth::issue_access_token;
use crate::models::{
    application::{Application, ApplicationStatus, ApplicationTable, NewApplication},
    company::Company,
    job::{Job, JobStatus, NewJob},
    profile::{NewProfile, ProfileChanges, ProfileRow},
    saved_job::{NewSavedJob, SavedJob},
};

const SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct StoredUser {
    id: Uuid,
    email: String,
    password: String,
}

#[derive(Debug, Default)]
struct Store {
    users: HashMap<String, StoredUser>,
    revoked_tokens: Vec<String>,
    password_resets: Vec<(String, Option<String>)>,
    jobs: Vec<Job>,
    companies: Vec<Company>,
    profiles: Vec<ProfileRow>,
    applications: Vec<Application>,
    saved_jobs: Vec<SavedJob>,
}

pub struct InMemoryBackend {
    jwt_secret: String,
    jwt_audience: String,
    store: RwLock<Store>,
}

fn unique_violation(what: &str) -> BackendError {
    BackendError::new(
        BackendErrorKind::UniqueViolation,
        format!("duplicate key value violates unique constraint on {}", what),
    )
    .with_code("23505")
}

fn not_found(what: &str) -> BackendError {
    BackendError::new(BackendErrorKind::NotFound, format!("{} not found", what))
        .with_code("PGRST116")
}

fn signed_in(caller: &Caller) -> BackendResult<Uuid> {
    caller.user_id().ok_or_else(|| {
        BackendError::new(
            BackendErrorKind::Unauthorized,
            "new row violates row-level security policy",
        )
        .with_code("42501")
    })
}

fn window<T>(rows: Vec<T>, range: Option<PageRange>) -> Vec<T> {
    match range {
        Some(range) => rows
            .into_iter()
            .skip(range.offset.max(0) as usize)
            .take(range.limit.max(0) as usize)
            .collect(),
        None => rows,
    }
}

impl InMemoryBackend {
    pub fn new(jwt_secret: impl Into<String>, jwt_audience: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            jwt_audience: jwt_audience.into(),
            store: RwLock::new(Store::default()),
        }
    }

    pub async fn seed_job(&self, job: Job) {
        self.store.write().await.jobs.push(job);
    }

    pub async fn seed_company(&self, company: Company) {
        self.store.write().await.companies.push(company);
    }

    pub async fn seed_profile(&self, profile: ProfileRow) {
        self.store.write().await.profiles.push(profile);
    }

    pub async fn applications(&self) -> Vec<Application> {
        self.store.read().await.applications.clone()
    }

    pub async fn saved_jobs(&self) -> Vec<SavedJob> {
        self.store.read().await.saved_jobs.clone()
    }

    /// Password reset requests recorded so far, as `(email, redirect_to)`.
    pub async fn password_resets(&self) -> Vec<(String, Option<String>)> {
        self.store.read().await.password_resets.clone()
    }

    fn open_session(&self, user: &StoredUser) -> BackendResult<AuthSession> {
        let access_token = issue_access_token(
            &self.jwt_secret,
            &self.jwt_audience,
            user.id,
            Some(&user.email),
            SESSION_TTL_SECS,
        )
        .map_err(|e| BackendError::new(BackendErrorKind::Rejected, e.to_string()))?;

        Ok(AuthSession {
            access_token,
            refresh_token: Uuid::new_v4().to_string(),
            expires_in: SESSION_TTL_SECS,
            user: AuthUser {
                id: user.id,
                email: Some(user.email.clone()),
            },
        })
    }

    async fn check_token(&self, caller: &Caller) -> BackendResult<Uuid> {
        let user_id = signed_in(caller)?;
        let store = self.store.read().await;
        if let Some(token) = caller.access_token() {
            if store.revoked_tokens.iter().any(|t| t == token) {
                return Err(BackendError::new(
                    BackendErrorKind::Unauthorized,
                    "session has been revoked",
                )
                .with_code("session_not_found"));
            }
        }
        Ok(user_id)
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let user = {
            let store = self.store.read().await;
            store
                .users
                .get(&email.trim().to_lowercase())
                .filter(|u| u.password == password)
                .cloned()
        };
        match user {
            Some(user) => self.open_session(&user),
            None => Err(BackendError::new(
                BackendErrorKind::Unauthorized,
                "Invalid login credentials",
            )
            .with_code("invalid_credentials")),
        }
    }

    async fn sign_up(&self, request: &SignUpRequest) -> BackendResult<SignUpOutcome> {
        let key = request.email.trim().to_lowercase();
        let user = {
            let mut store = self.store.write().await;
            if store.users.contains_key(&key) {
                return Err(BackendError::new(
                    BackendErrorKind::UniqueViolation,
                    "User already registered",
                )
                .with_code("user_already_exists"));
            }
            let user = StoredUser {
                id: Uuid::new_v4(),
                email: key.clone(),
                password: request.password.clone(),
            };
            store.users.insert(key, user.clone());
            user
        };

        let session = self.open_session(&user)?;
        Ok(SignUpOutcome {
            user: session.user.clone(),
            session: Some(session),
        })
    }

    async fn sign_out(&self, caller: &Caller) -> BackendResult<()> {
        if let Some(token) = caller.access_token() {
            self.store
                .write()
                .await
                .revoked_tokens
                .push(token.to_string());
        }
        Ok(())
    }

    async fn request_password_reset(
        &self,
        email: &str,
        redirect_to: Option<String>,
    ) -> BackendResult<()> {
        self.store
            .write()
            .await
            .password_resets
            .push((email.trim().to_lowercase(), redirect_to));
        Ok(())
    }

    async fn update_password(&self, caller: &Caller, new_password: &str) -> BackendResult<()> {
        let user_id = self.check_token(caller).await?;
        let mut store = self.store.write().await;
        let user = store
            .users
            .values_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| not_found("user"))?;
        user.password = new_password.to_string();
        Ok(())
    }

    async fn list_jobs(
        &self,
        _caller: &Caller,
        filter: &JobFilter,
        range: Option<PageRange>,
    ) -> BackendResult<Vec<Job>> {
        let store = self.store.read().await;
        let mut jobs: Vec<Job> = store
            .jobs
            .iter()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(window(jobs, range))
    }

    async fn count_jobs(&self, _caller: &Caller, filter: &JobFilter) -> BackendResult<i64> {
        let store = self.store.read().await;
        Ok(store.jobs.iter().filter(|job| filter.matches(job)).count() as i64)
    }

    async fn get_job(&self, _caller: &Caller, id: Uuid) -> BackendResult<Option<Job>> {
        let store = self.store.read().await;
        Ok(store.jobs.iter().find(|job| job.id == id).cloned())
    }

    async fn insert_job(&self, caller: &Caller, job: &NewJob) -> BackendResult<Job> {
        self.check_token(caller).await?;
        let now = Utc::now();
        let row = Job {
            id: Uuid::new_v4(),
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            job_type: job.job_type.clone(),
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            description: job.description.clone(),
            requirements: job.requirements.clone(),
            tags: Some(job.tags.clone()),
            is_remote: Some(job.is_remote),
            is_featured: Some(job.is_featured),
            status: job.status,
            posted_by: Some(job.posted_by),
            created_at: now,
            updated_at: now,
        };
        self.store.write().await.jobs.push(row.clone());
        Ok(row)
    }

    async fn update_job_status(
        &self,
        caller: &Caller,
        id: Uuid,
        status: JobStatus,
    ) -> BackendResult<Job> {
        self.check_token(caller).await?;
        let mut store = self.store.write().await;
        let job = store
            .jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or_else(|| not_found("job"))?;
        job.status = status;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    async fn list_companies(&self, _caller: &Caller) -> BackendResult<Vec<Company>> {
        let store = self.store.read().await;
        let mut companies = store.companies.clone();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    async fn get_company(&self, _caller: &Caller, id: Uuid) -> BackendResult<Option<Company>> {
        let store = self.store.read().await;
        Ok(store.companies.iter().find(|c| c.id == id).cloned())
    }

    async fn find_company_by_name(
        &self,
        _caller: &Caller,
        name: &str,
    ) -> BackendResult<Option<Company>> {
        let store = self.store.read().await;
        Ok(store.companies.iter().find(|c| c.name == name).cloned())
    }

    async fn get_profile(
        &self,
        _caller: &Caller,
        user_id: Uuid,
    ) -> BackendResult<Option<ProfileRow>> {
        let store = self.store.read().await;
        Ok(store.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn insert_profile(
        &self,
        caller: &Caller,
        profile: &NewProfile,
    ) -> BackendResult<ProfileRow> {
        self.check_token(caller).await?;
        let mut store = self.store.write().await;
        if store.profiles.iter().any(|p| p.user_id == profile.user_id) {
            return Err(unique_violation("profiles (user_id)"));
        }
        let now = Utc::now();
        let row = ProfileRow {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            account_type: Some(profile.account_type.clone()),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: None,
            bio: None,
            experience_years: None,
            education: None,
            skills: None,
            resume_url: None,
            linkedin_url: None,
            website_url: None,
            company_name: None,
            company_description: None,
            company_website: None,
            created_at: now,
            updated_at: now,
        };
        store.profiles.push(row.clone());
        Ok(row)
    }

    async fn update_profile(
        &self,
        caller: &Caller,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> BackendResult<ProfileRow> {
        self.check_token(caller).await?;
        let mut store = self.store.write().await;
        let row = store
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| not_found("profile"))?;

        let changes = changes.clone();
        if changes.first_name.is_some() {
            row.first_name = changes.first_name;
        }
        if changes.last_name.is_some() {
            row.last_name = changes.last_name;
        }
        if changes.phone.is_some() {
            row.phone = changes.phone;
        }
        if changes.bio.is_some() {
            row.bio = changes.bio;
        }
        if changes.experience_years.is_some() {
            row.experience_years = changes.experience_years;
        }
        if changes.education.is_some() {
            row.education = changes.education;
        }
        if changes.skills.is_some() {
            row.skills = changes.skills;
        }
        if changes.resume_url.is_some() {
            row.resume_url = changes.resume_url;
        }
        if changes.linkedin_url.is_some() {
            row.linkedin_url = changes.linkedin_url;
        }
        if changes.website_url.is_some() {
            row.website_url = changes.website_url;
        }
        if changes.company_name.is_some() {
            row.company_name = changes.company_name;
        }
        if changes.company_description.is_some() {
            row.company_description = changes.company_description;
        }
        if changes.company_website.is_some() {
            row.company_website = changes.company_website;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn list_applications(
        &self,
        _caller: &Caller,
        table: ApplicationTable,
        filter: &ApplicationFilter,
    ) -> BackendResult<Vec<Application>> {
        let store = self.store.read().await;
        let mut rows: Vec<Application> = store
            .applications
            .iter()
            .filter(|a| a.table == table && filter.matches(a))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(rows)
    }

    async fn insert_application(
        &self,
        caller: &Caller,
        application: &NewApplication,
    ) -> BackendResult<Application> {
        self.check_token(caller).await?;
        let mut store = self.store.write().await;
        let duplicate = store.applications.iter().any(|a| {
            a.table == application.table
                && a.job_id == application.job_id
                && a.user_id == application.user_id
        });
        if duplicate {
            return Err(unique_violation(application.table.table_name()));
        }
        let now = Utc::now();
        let row = Application {
            id: Uuid::new_v4(),
            table: application.table,
            job_id: application.job_id,
            user_id: application.user_id,
            status: ApplicationStatus::Pending,
            cover_letter: application.cover_letter.clone(),
            resume_url: application.resume_url.clone(),
            applied_at: now,
            updated_at: now,
        };
        store.applications.push(row.clone());
        Ok(row)
    }

    async fn update_application_status(
        &self,
        caller: &Caller,
        table: ApplicationTable,
        id: Uuid,
        status: ApplicationStatus,
    ) -> BackendResult<Application> {
        self.check_token(caller).await?;
        let mut store = self.store.write().await;
        let row = store
            .applications
            .iter_mut()
            .find(|a| a.table == table && a.id == id)
            .ok_or_else(|| not_found(table.table_name()))?;
        row.status = status;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_application(
        &self,
        caller: &Caller,
        table: ApplicationTable,
        id: Uuid,
    ) -> BackendResult<Application> {
        self.check_token(caller).await?;
        let mut store = self.store.write().await;
        let index = store
            .applications
            .iter()
            .position(|a| a.table == table && a.id == id)
            .ok_or_else(|| not_found(table.table_name()))?;
        Ok(store.applications.remove(index))
    }

    async fn is_job_saved(
        &self,
        _caller: &Caller,
        user_id: Uuid,
        job_id: Uuid,
    ) -> BackendResult<bool> {
        let store = self.store.read().await;
        Ok(store
            .saved_jobs
            .iter()
            .any(|s| s.user_id == user_id && s.job_id == job_id))
    }

    async fn list_saved_jobs(&self, _caller: &Caller, user_id: Uuid) -> BackendResult<Vec<SavedJob>> {
        let store = self.store.read().await;
        let mut rows: Vec<SavedJob> = store
            .saved_jobs
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(rows)
    }

    async fn insert_saved_job(
        &self,
        caller: &Caller,
        saved: &NewSavedJob,
    ) -> BackendResult<SavedJob> {
        self.check_token(caller).await?;
        let mut store = self.store.write().await;
        if store
            .saved_jobs
            .iter()
            .any(|s| s.user_id == saved.user_id && s.job_id == saved.job_id)
        {
            return Err(unique_violation("saved_jobs"));
        }
        let row = SavedJob {
            id: Uuid::new_v4(),
            job_id: saved.job_id,
            user_id: saved.user_id,
            saved_at: Utc::now(),
        };
        store.saved_jobs.push(row.clone());
        Ok(row)
    }

    async fn delete_saved_job(
        &self,
        caller: &Caller,
        user_id: Uuid,
        job_id: Uuid,
    ) -> BackendResult<()> {
        self.check_token(caller).await?;
        self.store
            .write()
            .await
            .saved_jobs
            .retain(|s| !(s.user_id == user_id && s.job_id == job_id));
        Ok(())
    }
}
