use std::sync::Arc;

use uuid::Uuid;

use crate::backend::{Backend, Caller};
use crate::dto::job_dto::{
    CompanyLinkResponse, JobDetailsResponse, JobStatusResponse, PostJobPayload, PostingQuote,
};
use crate::error::{Error, Result};
use crate::middleware::auth::{Identity, Viewer};
use crate::models::job::{Job, JobStatus, NewJob};
use crate::routes::navigation::Route;
use crate::services::application_service::ApplicationTracker;
use crate::utils::salary::{format_salary_detail, parse_salary};
use crate::utils::time::{now, posted_age};
use crate::utils::validation::{dedup_trimmed, require_text};

pub const BASE_POSTING_PRICE: i64 = 99;
pub const FEATURED_ADDON_PRICE: i64 = 50;

pub fn posting_quote(featured: bool) -> PostingQuote {
    let featured_addon = if featured { FEATURED_ADDON_PRICE } else { 0 };
    PostingQuote {
        base: BASE_POSTING_PRICE,
        featured_addon,
        total: BASE_POSTING_PRICE + featured_addon,
    }
}

#[derive(Clone)]
pub struct JobService {
    backend: Arc<dyn Backend>,
    tracker: ApplicationTracker,
}

impl JobService {
    pub fn new(backend: Arc<dyn Backend>, tracker: ApplicationTracker) -> Self {
        Self { backend, tracker }
    }

    async fn find(&self, caller: &Caller, id: Uuid) -> Result<Job> {
        self.backend
            .get_job(caller, id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }

    pub async fn details(&self, viewer: &Viewer, id: Uuid) -> Result<JobDetailsResponse> {
        let job = self.find(&viewer.caller(), id).await?;

        let (is_saved, has_applied) = match viewer.identity() {
            Some(identity) => (
                self.tracker.is_saved(identity, id).await?,
                self.tracker.has_applied(identity, id).await?,
            ),
            None => (false, false),
        };

        Ok(JobDetailsResponse {
            salary: format_salary_detail(job.salary_min, job.salary_max),
            posted_at: posted_age(job.created_at, now()),
            apply_path: Route::JobApply(job.id).path(),
            is_saved,
            has_applied,
            job,
        })
    }

    /// Company profile route for a job, matched on the company name.
    pub async fn company_link(&self, viewer: &Viewer, id: Uuid) -> Result<CompanyLinkResponse> {
        let caller = viewer.caller();
        let job = self.find(&caller, id).await?;
        match self.backend.find_company_by_name(&caller, &job.company).await {
            Ok(Some(company)) => Ok(CompanyLinkResponse {
                path: Route::CompanyDetails(company.id).path(),
                company_id: Some(company.id),
            }),
            Ok(None) => Ok(CompanyLinkResponse {
                path: Route::Companies.path(),
                company_id: None,
            }),
            Err(e) => {
                tracing::warn!(company = %job.company, error = %e, "Company lookup failed");
                Ok(CompanyLinkResponse {
                    path: Route::Companies.path(),
                    company_id: None,
                })
            }
        }
    }

    pub async fn post(&self, identity: &Identity, payload: &PostJobPayload) -> Result<Job> {
        for (field, value) in [
            ("Title", &payload.title),
            ("Company", &payload.company),
            ("Location", &payload.location),
            ("Job type", &payload.job_type),
            ("Salary", &payload.salary),
            ("Description", &payload.description),
        ] {
            require_text(field, value)?;
        }

        let salary = parse_salary(&payload.salary);
        let job = NewJob {
            title: payload.title.trim().to_string(),
            company: payload.company.trim().to_string(),
            location: payload.location.trim().to_string(),
            job_type: payload.job_type.trim().to_string(),
            salary_min: salary.min,
            salary_max: salary.max,
            description: payload.description.trim().to_string(),
            requirements: payload
                .requirements
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            tags: dedup_trimmed(&payload.skills),
            is_remote: payload.is_remote,
            is_featured: payload.is_featured,
            posted_by: identity.user_id,
            status: JobStatus::Active,
        };

        let created = self.backend.insert_job(&identity.caller(), &job).await?;
        let quote = posting_quote(job.is_featured);
        tracing::info!(job_id = %created.id, user_id = %identity.user_id, total = quote.total, "Job posted");
        Ok(created)
    }

    /// Flips a posting between active and inactive.
    pub async fn toggle_status(&self, identity: &Identity, id: Uuid) -> Result<JobStatusResponse> {
        let caller = identity.caller();
        let job = self.find(&caller, id).await?;
        if job.posted_by != Some(identity.user_id) {
            return Err(Error::NotFound("Job not found".to_string()));
        }
        let updated = self
            .backend
            .update_job_status(&caller, id, job.status.toggled())
            .await?;
        Ok(JobStatusResponse {
            id: updated.id,
            status: updated.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::InMemoryBackend;
    use crate::backend::MockBackend;
    use crate::models::application::ApplicationTable;
    use crate::models::company::Company;
    use chrono::Utc;

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: None,
            access_token: "token".into(),
        }
    }

    fn stored(job: &NewJob) -> Job {
        Job {
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
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(backend: MockBackend) -> JobService {
        let backend: Arc<dyn Backend> = Arc::new(backend);
        JobService::new(backend.clone(), ApplicationTracker::new(backend))
    }

    fn payload() -> PostJobPayload {
        PostJobPayload {
            title: "Backend Engineer".into(),
            company: "TechCorp Inc.".into(),
            location: "Remote".into(),
            job_type: "full-time".into(),
            salary: "$80k - $120k".into(),
            description: "Build services".into(),
            requirements: Some("  ".into()),
            skills: vec![" Rust".into(), "SQL".into(), "Rust ".into()],
            is_remote: true,
            is_featured: false,
        }
    }

    #[test]
    fn featured_posting_costs_extra() {
        assert_eq!(posting_quote(false).total, 99);
        assert_eq!(posting_quote(true).total, 149);
    }

    #[tokio::test]
    async fn posting_parses_salary_and_dedups_skills() {
        let poster = identity();
        let user_id = poster.user_id;
        let mut backend = MockBackend::new();
        backend
            .expect_insert_job()
            .withf(move |_, job| {
                job.salary_min == Some(80_000)
                    && job.salary_max == Some(120_000)
                    && job.tags == vec!["Rust".to_string(), "SQL".to_string()]
                    && job.requirements.is_none()
                    && job.status == JobStatus::Active
                    && job.posted_by == user_id
            })
            .times(1)
            .returning(|_, job| Ok(stored(job)));

        let job = service(backend).post(&poster, &payload()).await.unwrap();
        assert_eq!(job.posted_by, Some(user_id));
    }

    #[tokio::test]
    async fn blank_required_field_is_rejected() {
        let mut backend = MockBackend::new();
        backend.expect_insert_job().times(0);

        let err = service(backend)
            .post(
                &identity(),
                &PostJobPayload {
                    salary: " ".into(),
                    ..payload()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let mut backend = MockBackend::new();
        backend.expect_get_job().returning(|_, _| Ok(None));

        let err = service(backend)
            .details(&Viewer::Anonymous, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn company_link_falls_back_to_directory() {
        let job = stored(&NewJob {
            title: "X".into(),
            company: "Nowhere Ltd".into(),
            location: "Remote".into(),
            job_type: "contract".into(),
            salary_min: None,
            salary_max: None,
            description: "d".into(),
            requirements: None,
            tags: Vec::new(),
            is_remote: true,
            is_featured: false,
            posted_by: Uuid::new_v4(),
            status: JobStatus::Active,
        });
        let job_id = job.id;

        let mut backend = MockBackend::new();
        backend
            .expect_get_job()
            .returning(move |_, _| Ok(Some(job.clone())));
        backend
            .expect_find_company_by_name()
            .withf(|_, name| name == "Nowhere Ltd")
            .returning(|_, _| Ok(None));

        let link = service(backend)
            .company_link(&Viewer::Anonymous, job_id)
            .await
            .unwrap();
        assert_eq!(link.path, "/companies");
    }

    #[tokio::test]
    async fn company_link_targets_matching_company() {
        let company_id = Uuid::new_v4();
        let mut backend = MockBackend::new();
        backend.expect_get_job().returning(|_, id| {
            let mut job = stored(&NewJob {
                title: "X".into(),
                company: "TechCorp Inc.".into(),
                location: "Remote".into(),
                job_type: "contract".into(),
                salary_min: None,
                salary_max: None,
                description: "d".into(),
                requirements: None,
                tags: Vec::new(),
                is_remote: true,
                is_featured: false,
                posted_by: Uuid::new_v4(),
                status: JobStatus::Active,
            });
            job.id = id;
            Ok(Some(job))
        });
        backend.expect_find_company_by_name().returning(move |_, name| {
            Ok(Some(Company {
                id: company_id,
                name: name.to_string(),
                description: None,
                industry: None,
                location: None,
                size: None,
                founded_year: None,
                website: None,
                logo_url: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let link = service(backend)
            .company_link(&Viewer::Anonymous, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(link.path, format!("/companies/{}", company_id));
    }

    #[tokio::test]
    async fn details_reflect_changes_made_behind_the_cache() {
        let memory = Arc::new(InMemoryBackend::new("secret", "authenticated"));
        let backend: Arc<dyn Backend> = memory.clone();
        let tracker = ApplicationTracker::new(backend.clone());
        let jobs = JobService::new(backend.clone(), tracker.clone());

        let viewer = identity();
        let posting = stored(&NewJob {
            title: "Site Reliability Engineer".into(),
            company: "TechCorp Inc.".into(),
            location: "Remote".into(),
            job_type: "full-time".into(),
            salary_min: None,
            salary_max: None,
            description: "Keep it up".into(),
            requirements: None,
            tags: Vec::new(),
            is_remote: true,
            is_featured: false,
            posted_by: Uuid::new_v4(),
            status: JobStatus::Active,
        });
        let job_id = posting.id;
        memory.seed_job(posting).await;

        let applied = tracker.apply(&viewer, job_id).await.unwrap();
        assert!(tracker.toggle_save(&viewer, job_id).await.unwrap().saved);

        // Another client withdraws and unsaves.
        let caller = viewer.caller();
        backend
            .delete_application(&caller, ApplicationTable::Applications, applied.application_id)
            .await
            .unwrap();
        backend
            .delete_saved_job(&caller, viewer.user_id, job_id)
            .await
            .unwrap();

        let details = jobs
            .details(&Viewer::SignedIn(viewer.clone()), job_id)
            .await
            .unwrap();
        assert!(!details.has_applied);
        assert!(!details.is_saved);
    }
}
