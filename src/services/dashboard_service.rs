use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{Backend, JobFilter};
use crate::dto::dashboard_dto::{
    Dashboard, EmployerDashboard, EmployerStats, PostedJob, ProfileUpdatePayload,
    ProfileUpdateResponse, SeekerDashboard, SeekerStats,
};
use crate::dto::job_dto::JobCard;
use crate::error::{Error, Result};
use crate::middleware::auth::Identity;
use crate::models::application::ApplicationStatus;
use crate::models::job::JobStatus;
use crate::models::profile::{AccountProfile, ProfileChanges};
use crate::services::application_service::ApplicationTracker;
use crate::services::session_service::SessionProvider;
use crate::utils::time::now;

/// Builds the seeker or employer dashboard from the viewer's profile variant.
#[derive(Clone)]
pub struct DashboardService {
    backend: Arc<dyn Backend>,
    session: SessionProvider,
    tracker: ApplicationTracker,
}

impl DashboardService {
    pub fn new(
        backend: Arc<dyn Backend>,
        session: SessionProvider,
        tracker: ApplicationTracker,
    ) -> Self {
        Self {
            backend,
            session,
            tracker,
        }
    }

    pub async fn dashboard(&self, identity: &Identity) -> Result<Dashboard> {
        let profile = self
            .session
            .profile(identity)
            .await?
            .ok_or_else(|| Error::NotFound("Profile not found".to_string()))?;

        match profile {
            AccountProfile::JobSeeker(_) => self
                .seeker(identity, profile)
                .await
                .map(Dashboard::JobSeeker),
            AccountProfile::Employer(_) => self
                .employer(identity, profile)
                .await
                .map(Dashboard::Employer),
        }
    }

    async fn seeker(
        &self,
        identity: &Identity,
        profile: AccountProfile,
    ) -> Result<SeekerDashboard> {
        let caller = identity.caller();
        let applications = self.tracker.seeker_applications(identity).await?;

        let saved = self
            .backend
            .list_saved_jobs(&caller, identity.user_id)
            .await?;
        let saved_jobs = if saved.is_empty() {
            Vec::new()
        } else {
            let filter = JobFilter {
                ids: Some(saved.iter().map(|s| s.job_id).collect()),
                ..JobFilter::default()
            };
            let jobs = self.backend.list_jobs(&caller, &filter, None).await?;
            let now = now();
            let by_id: HashMap<_, _> = jobs.iter().map(|j| (j.id, j)).collect();
            // Keep the bookmark order, newest saved first.
            saved
                .iter()
                .filter_map(|s| by_id.get(&s.job_id))
                .map(|job| JobCard::from_job(job, now))
                .collect()
        };

        let stats = SeekerStats {
            applications: applications.len(),
            saved_jobs: saved_jobs.len(),
            interviews: applications
                .iter()
                .filter(|a| a.status == ApplicationStatus::InterviewScheduled)
                .count(),
        };

        Ok(SeekerDashboard {
            completeness: profile.completeness(),
            profile,
            stats,
            applications,
            saved_jobs,
        })
    }

    async fn employer(
        &self,
        identity: &Identity,
        profile: AccountProfile,
    ) -> Result<EmployerDashboard> {
        let caller = identity.caller();
        let filter = JobFilter {
            posted_by: Some(identity.user_id),
            ..JobFilter::default()
        };
        let jobs = self.backend.list_jobs(&caller, &filter, None).await?;
        let applications = self.tracker.received_applications(identity, &jobs).await?;

        let mut per_job: HashMap<_, usize> = HashMap::new();
        for application in &applications {
            *per_job.entry(application.job_id).or_default() += 1;
        }
        let now = now();
        let posted: Vec<PostedJob> = jobs
            .iter()
            .map(|job| PostedJob {
                card: JobCard::from_job(job, now),
                status: job.status,
                applications: per_job.get(&job.id).copied().unwrap_or(0),
            })
            .collect();

        let stats = EmployerStats {
            active_jobs: jobs.iter().filter(|j| j.status == JobStatus::Active).count(),
            applications: applications.len(),
            pending_review: applications
                .iter()
                .filter(|a| a.status == ApplicationStatus::Pending)
                .count(),
        };

        Ok(EmployerDashboard {
            completeness: profile.completeness(),
            profile,
            stats,
            jobs: posted,
            applications,
        })
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        payload: ProfileUpdatePayload,
    ) -> Result<ProfileUpdateResponse> {
        let changes = ProfileChanges::from(payload);
        if changes == ProfileChanges::default() {
            return Err(Error::BadRequest("No profile changes supplied".to_string()));
        }
        let profile = self.session.update_profile(identity, &changes).await?;
        tracing::info!(user_id = %identity.user_id, "Profile updated");
        Ok(ProfileUpdateResponse {
            user_id: identity.user_id,
            completeness: profile.completeness(),
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::models::application::{Application, ApplicationTable};
    use crate::models::job::Job;
    use crate::models::profile::sample_row;
    use chrono::Utc;
    use uuid::Uuid;

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: None,
            access_token: "token".into(),
        }
    }

    fn build(backend: MockBackend) -> DashboardService {
        let backend: Arc<dyn Backend> = Arc::new(backend);
        DashboardService::new(
            backend.clone(),
            SessionProvider::new(backend.clone(), None),
            ApplicationTracker::new(backend),
        )
    }

    fn job(posted_by: Uuid) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: "Platform Engineer".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            job_type: "full-time".into(),
            salary_min: None,
            salary_max: None,
            description: "Keep it running".into(),
            requirements: None,
            tags: None,
            is_remote: Some(true),
            is_featured: None,
            status: JobStatus::Active,
            posted_by: Some(posted_by),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn employer_dashboard_lists_received_applications() {
        let viewer = identity();
        let posting = job(viewer.user_id);
        let job_id = posting.id;

        let mut backend = MockBackend::new();
        backend
            .expect_get_profile()
            .returning(|_, id| Ok(Some(sample_row(id, Some("employer")))));
        backend
            .expect_list_jobs()
            .returning(move |_, _, _| Ok(vec![posting.clone()]));
        backend
            .expect_list_applications()
            .withf(move |_, _, f| f.job_ids == Some(vec![job_id]) && f.user_id.is_none())
            .times(2)
            .returning(move |_, table, _| {
                if table != ApplicationTable::JobApplications {
                    return Ok(Vec::new());
                }
                Ok(vec![Application {
                    id: Uuid::new_v4(),
                    table,
                    job_id,
                    user_id: Uuid::new_v4(),
                    status: ApplicationStatus::Pending,
                    cover_letter: Some("Hire me".into()),
                    resume_url: None,
                    applied_at: Utc::now(),
                    updated_at: Utc::now(),
                }])
            });

        let dashboard = build(backend).dashboard(&viewer).await.unwrap();
        let Dashboard::Employer(employer) = dashboard else {
            panic!("expected employer dashboard");
        };
        assert_eq!(employer.stats.active_jobs, 1);
        assert_eq!(employer.stats.pending_review, 1);
        assert_eq!(employer.jobs[0].applications, 1);
        assert_eq!(employer.applications[0].job_title, "Platform Engineer");
        assert!(employer.applications[0].can_review);
    }

    #[tokio::test]
    async fn seeker_dashboard_reports_completeness() {
        let viewer = identity();
        let mut backend = MockBackend::new();
        backend.expect_get_profile().returning(|_, id| {
            let mut row = sample_row(id, Some("job_seeker"));
            row.first_name = Some("Ada".into());
            row.last_name = Some("Lovelace".into());
            row.bio = Some("Engineer".into());
            Ok(Some(row))
        });
        backend
            .expect_list_applications()
            .times(2)
            .returning(|_, _, _| Ok(Vec::new()));
        backend.expect_list_saved_jobs().returning(|_, _| Ok(Vec::new()));

        let dashboard = build(backend).dashboard(&viewer).await.unwrap();
        let Dashboard::JobSeeker(seeker) = dashboard else {
            panic!("expected job seeker dashboard");
        };
        assert_eq!(seeker.completeness, 57);
        assert!(seeker.applications.is_empty());
    }

    #[tokio::test]
    async fn empty_profile_update_is_rejected() {
        let mut backend = MockBackend::new();
        backend.expect_update_profile().times(0);

        let err = build(backend)
            .update_profile(&identity(), ProfileUpdatePayload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }
}
