use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::{ApplicationFilter, Backend, Caller, JobFilter};
use crate::dto::application_dto::{
    ApplicationFormPayload, ApplyResponse, ReceivedApplication, SaveToggleResponse,
    SeekerApplication, WithdrawResponse,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Identity;
use crate::models::application::{
    Application, ApplicationStatus, ApplicationTable, NewApplication,
};
use crate::models::job::Job;
use crate::models::saved_job::NewSavedJob;
use crate::utils::time::{now, posted_age};
use crate::utils::validation::require_text;

/// Cached viewer state older than this is dropped on the next write.
pub const VIEWER_CACHE_TTL: Duration = Duration::from_secs(300);

/// What one user has applied to and saved, as far as this process knows.
#[derive(Debug, Clone)]
struct ViewerJobs {
    touched_at: Instant,
    applied: HashSet<Uuid>,
    saved: HashMap<Uuid, bool>,
}

impl ViewerJobs {
    fn new() -> Self {
        Self {
            touched_at: Instant::now(),
            applied: HashSet::new(),
            saved: HashMap::new(),
        }
    }
}

/// Apply and save toggles with per-user caches in front of the backend.
///
/// Reads that drive a page always go to the backend. The cache only
/// short-circuits repeat apply clicks within its TTL; the backend stays the
/// source of truth.
#[derive(Clone)]
pub struct ApplicationTracker {
    backend: Arc<dyn Backend>,
    viewers: Arc<RwLock<HashMap<Uuid, ViewerJobs>>>,
    ttl: Duration,
}

impl ApplicationTracker {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            viewers: Arc::new(RwLock::new(HashMap::new())),
            ttl: VIEWER_CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    async fn has_cached_application(&self, user_id: Uuid, job_id: Uuid) -> bool {
        self.viewers
            .read()
            .await
            .get(&user_id)
            .filter(|v| v.touched_at.elapsed() < self.ttl)
            .map_or(false, |v| v.applied.contains(&job_id))
    }

    /// Evicts expired entries, then applies `update` to the user's entry.
    async fn touch(&self, user_id: Uuid, update: impl FnOnce(&mut ViewerJobs)) {
        let ttl = self.ttl;
        let mut viewers = self.viewers.write().await;
        viewers.retain(|_, v| v.touched_at.elapsed() < ttl);
        let entry = viewers.entry(user_id).or_insert_with(ViewerJobs::new);
        entry.touched_at = Instant::now();
        update(entry);
    }

    async fn mark_applied(&self, user_id: Uuid, job_id: Uuid) {
        self.touch(user_id, |v| {
            v.applied.insert(job_id);
        })
        .await;
    }

    async fn set_saved(&self, user_id: Uuid, job_id: Uuid, saved: bool) {
        self.touch(user_id, |v| {
            v.saved.insert(job_id, saved);
        })
        .await;
    }

    /// Reloads the jobs a user has applied to, across both application tables.
    pub async fn applied_jobs(&self, identity: &Identity) -> Result<HashSet<Uuid>> {
        let caller = identity.caller();
        let filter = ApplicationFilter {
            user_id: Some(identity.user_id),
            job_ids: None,
        };
        let mut applied = HashSet::new();
        for table in ApplicationTable::ALL {
            for application in self
                .backend
                .list_applications(&caller, table, &filter)
                .await?
            {
                applied.insert(application.job_id);
            }
        }
        let cached = applied.clone();
        self.touch(identity.user_id, |v| v.applied = cached).await;
        Ok(applied)
    }

    pub async fn forget(&self, user_id: Uuid) {
        if self.viewers.write().await.remove(&user_id).is_some() {
            tracing::debug!(%user_id, "Dropped cached applications for user");
        }
    }

    pub async fn has_applied(&self, identity: &Identity, job_id: Uuid) -> Result<bool> {
        Ok(self.applied_jobs(identity).await?.contains(&job_id))
    }

    /// Saved state of a job, by single-row lookup.
    pub async fn is_saved(&self, identity: &Identity, job_id: Uuid) -> Result<bool> {
        let saved = self
            .backend
            .is_job_saved(&identity.caller(), identity.user_id, job_id)
            .await?;
        self.set_saved(identity.user_id, job_id, saved).await;
        Ok(saved)
    }

    /// Quick apply into `applications`.
    pub async fn apply(&self, identity: &Identity, job_id: Uuid) -> Result<ApplyResponse> {
        self.submit(identity, NewApplication::quick(job_id, identity.user_id))
            .await
    }

    /// Application form into `job_applications`; the cover letter is required.
    pub async fn submit_application(
        &self,
        identity: &Identity,
        job_id: Uuid,
        payload: &ApplicationFormPayload,
    ) -> Result<ApplyResponse> {
        require_text("Cover letter", &payload.cover_letter)?;
        let application = NewApplication {
            table: ApplicationTable::JobApplications,
            job_id,
            user_id: identity.user_id,
            cover_letter: Some(payload.cover_letter.trim().to_string()),
            resume_url: payload
                .resume_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        };
        self.submit(identity, application).await
    }

    /// One application per (user, job) across both tables. The backend's
    /// unique constraint only covers a single table, so both are checked first.
    async fn submit(
        &self,
        identity: &Identity,
        application: NewApplication,
    ) -> Result<ApplyResponse> {
        let job_id = application.job_id;
        if self.has_cached_application(identity.user_id, job_id).await
            || self.has_applied(identity, job_id).await?
        {
            return Err(Error::Conflict(
                "You have already applied for this job".to_string(),
            ));
        }

        match self
            .backend
            .insert_application(&identity.caller(), &application)
            .await
        {
            Ok(row) => {
                self.mark_applied(identity.user_id, job_id).await;
                tracing::info!(user_id = %identity.user_id, %job_id, table = row.table.table_name(), "Application submitted");
                Ok(ApplyResponse {
                    application_id: row.id,
                    table: row.table,
                    job_id,
                    status: row.status,
                    message: "Application submitted successfully".to_string(),
                })
            }
            Err(e) if e.is_unique_violation() => {
                self.mark_applied(identity.user_id, job_id).await;
                Err(Error::Conflict(
                    "You have already applied for this job".to_string(),
                ))
            }
            Err(e) => {
                tracing::error!(user_id = %identity.user_id, %job_id, error = %e, "Failed to submit application");
                Err(e.into())
            }
        }
    }

    /// Deletes one of the user's applications and forgets the job in the cache.
    pub async fn withdraw(
        &self,
        identity: &Identity,
        table: ApplicationTable,
        application_id: Uuid,
    ) -> Result<WithdrawResponse> {
        let removed = self
            .backend
            .delete_application(&identity.caller(), table, application_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    Error::NotFound("Application not found".to_string())
                } else {
                    Error::Backend(e)
                }
            })?;
        if let Some(jobs) = self.viewers.write().await.get_mut(&identity.user_id) {
            jobs.applied.remove(&removed.job_id);
        }
        Ok(WithdrawResponse {
            application_id: removed.id,
            job_id: removed.job_id,
            withdrawn: true,
        })
    }

    /// Inserts the bookmark when unsaved, deletes it when saved.
    pub async fn toggle_save(&self, identity: &Identity, job_id: Uuid) -> Result<SaveToggleResponse> {
        let caller = identity.caller();
        if self.is_saved(identity, job_id).await? {
            self.backend
                .delete_saved_job(&caller, identity.user_id, job_id)
                .await?;
            self.set_saved(identity.user_id, job_id, false).await;
            return Ok(SaveToggleResponse {
                job_id,
                saved: false,
            });
        }

        let saved = NewSavedJob {
            job_id,
            user_id: identity.user_id,
        };
        match self.backend.insert_saved_job(&caller, &saved).await {
            Ok(_) => {
                self.set_saved(identity.user_id, job_id, true).await;
                Ok(SaveToggleResponse { job_id, saved: true })
            }
            Err(e) if e.is_unique_violation() => {
                self.set_saved(identity.user_id, job_id, true).await;
                Err(Error::Conflict("This job is already saved".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Applications from both tables for the signed-in applicant, newest first.
    pub async fn seeker_applications(
        &self,
        identity: &Identity,
    ) -> Result<Vec<SeekerApplication>> {
        let caller = identity.caller();
        let filter = ApplicationFilter {
            user_id: Some(identity.user_id),
            job_ids: None,
        };
        let mut applications = Vec::new();
        for table in ApplicationTable::ALL {
            applications.extend(self.backend.list_applications(&caller, table, &filter).await?);
        }
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));

        let jobs = self
            .jobs_by_id(&caller, applications.iter().map(|a| a.job_id).collect())
            .await?;
        let now = now();
        Ok(applications
            .into_iter()
            .map(|a| {
                let job = jobs.get(&a.job_id);
                SeekerApplication {
                    id: a.id,
                    table: a.table,
                    job_id: a.job_id,
                    job_title: job.map_or_else(|| "Job no longer listed".to_string(), |j| j.title.clone()),
                    company: job.map(|j| j.company.clone()).unwrap_or_default(),
                    status: a.status,
                    status_label: a.status.label().to_string(),
                    status_tone: a.status.tone(),
                    applied_at: posted_age(a.applied_at, now),
                }
            })
            .collect())
    }

    async fn jobs_by_id(
        &self,
        caller: &Caller,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Job>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let filter = JobFilter {
            ids: Some(ids),
            ..JobFilter::default()
        };
        let jobs = self.backend.list_jobs(caller, &filter, None).await?;
        Ok(jobs.into_iter().map(|j| (j.id, j)).collect())
    }

    /// Applications received on the jobs the employer posted.
    pub async fn received_applications(
        &self,
        identity: &Identity,
        jobs: &[Job],
    ) -> Result<Vec<ReceivedApplication>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }
        let caller = identity.caller();
        let filter = ApplicationFilter {
            user_id: None,
            job_ids: Some(jobs.iter().map(|j| j.id).collect()),
        };
        let mut applications: Vec<Application> = Vec::new();
        for table in ApplicationTable::ALL {
            applications.extend(self.backend.list_applications(&caller, table, &filter).await?);
        }
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));

        let titles: HashMap<Uuid, &str> = jobs.iter().map(|j| (j.id, j.title.as_str())).collect();
        let now = now();
        Ok(applications
            .into_iter()
            .map(|a| received(a, &titles, now))
            .collect())
    }

    /// Flat status update; there is no transition guard.
    pub async fn set_status(
        &self,
        identity: &Identity,
        table: ApplicationTable,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ReceivedApplication> {
        let caller = identity.caller();
        let updated = self
            .backend
            .update_application_status(&caller, table, application_id, status)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    Error::NotFound("Application not found".to_string())
                } else {
                    Error::Backend(e)
                }
            })?;
        tracing::info!(%application_id, status = status.as_str(), "Application status updated");

        let job = self.backend.get_job(&caller, updated.job_id).await?;
        let titles: HashMap<Uuid, &str> = job
            .as_ref()
            .map(|j| (j.id, j.title.as_str()))
            .into_iter()
            .collect();
        Ok(received(updated, &titles, now()))
    }
}

fn received(
    application: Application,
    titles: &HashMap<Uuid, &str>,
    now: chrono::DateTime<chrono::Utc>,
) -> ReceivedApplication {
    ReceivedApplication {
        id: application.id,
        table: application.table,
        job_id: application.job_id,
        job_title: titles
            .get(&application.job_id)
            .map(|t| t.to_string())
            .unwrap_or_default(),
        applicant_id: application.user_id,
        cover_letter: application.cover_letter,
        resume_url: application.resume_url,
        status: application.status,
        status_label: application.status.label().to_string(),
        status_tone: application.status.tone(),
        applied_at: posted_age(application.applied_at, now),
        can_review: application.status != ApplicationStatus::Reviewed,
        can_reject: application.status != ApplicationStatus::Rejected,
    }
}
