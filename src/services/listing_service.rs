use std::sync::Arc;

use crate::backend::{Backend, Caller, JobFilter, PageRange};
use crate::dto::job_dto::{JobCard, JobListQuery, JobPage, PageSource};
use crate::error::Result;
use crate::services::samples::sample_jobs;
use crate::utils::time::now;

pub const JOBS_PAGE_SIZE: i64 = 6;

/// Offset-paged job listing, newest first.
#[derive(Clone)]
pub struct ListingService {
    backend: Arc<dyn Backend>,
    page_size: i64,
}

impl ListingService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            page_size: JOBS_PAGE_SIZE,
        }
    }

    /// Fetches the window starting at `query.offset`.
    ///
    /// `has_more` is false exactly when the window came back short. A failed
    /// first page degrades to the fixed samples; a failed later page is an error
    /// so the client keeps what it already shows.
    pub async fn page(&self, caller: &Caller, query: &JobListQuery) -> Result<JobPage> {
        let offset = query.offset.max(0);
        let filter = JobFilter {
            job_type: query
                .job_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("all"))
                .map(str::to_string),
            is_remote: query.remote.filter(|remote| *remote),
            ..JobFilter::active()
        };
        let range = PageRange {
            offset,
            limit: self.page_size,
        };

        match self.backend.list_jobs(caller, &filter, Some(range)).await {
            Ok(jobs) => {
                let now = now();
                let items: Vec<JobCard> =
                    jobs.iter().map(|job| JobCard::from_job(job, now)).collect();
                let fetched = items.len() as i64;
                Ok(JobPage {
                    has_more: fetched == self.page_size,
                    next_offset: offset + fetched,
                    offset,
                    items,
                    source: PageSource::Live,
                })
            }
            Err(e) if offset == 0 => {
                tracing::warn!(error = %e, "Job listing unavailable, showing sample jobs");
                let items = sample_jobs();
                Ok(JobPage {
                    next_offset: items.len() as i64,
                    offset,
                    items,
                    has_more: false,
                    source: PageSource::Sample,
                })
            }
            Err(e) => {
                tracing::warn!(offset, error = %e, "Failed to load more jobs");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, BackendErrorKind, MockBackend};
    use crate::error::Error;
    use crate::models::job::{Job, JobStatus};
    use chrono::{Duration, Utc};
    use mockall::predicate::*;
    use uuid::Uuid;

    fn job(i: i64) -> Job {
        let created = Utc::now() - Duration::days(i);
        Job {
            id: Uuid::new_v4(),
            title: format!("Job {}", i),
            company: "TechCorp Inc.".into(),
            location: "Remote".into(),
            job_type: "full-time".into(),
            salary_min: Some(80_000),
            salary_max: Some(120_000),
            description: "Build things".into(),
            requirements: None,
            tags: Some(vec!["Rust".into()]),
            is_remote: Some(true),
            is_featured: None,
            status: JobStatus::Active,
            posted_by: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[tokio::test]
    async fn full_page_then_short_page() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_jobs()
            .with(always(), always(), eq(Some(PageRange { offset: 0, limit: 6 })))
            .times(1)
            .returning(|_, _, _| Ok((0..6).map(job).collect()));
        backend
            .expect_list_jobs()
            .with(always(), always(), eq(Some(PageRange { offset: 6, limit: 6 })))
            .times(1)
            .returning(|_, _, _| Ok((6..10).map(job).collect()));

        let service = ListingService::new(Arc::new(backend));
        let first = service
            .page(&Caller::Anonymous, &JobListQuery::default())
            .await
            .unwrap();
        assert_eq!(first.items.len(), 6);
        assert!(first.has_more);
        assert_eq!(first.next_offset, 6);
        assert_eq!(first.items[0].salary, "$80k - $120k");
        assert_eq!(first.items[0].posted_at, "Today");

        let second = service
            .page(
                &Caller::Anonymous,
                &JobListQuery {
                    offset: first.next_offset,
                    ..JobListQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(second.items.len(), 4);
        assert!(!second.has_more);
        assert_eq!(second.next_offset, 10);
    }

    #[tokio::test]
    async fn first_page_failure_falls_back_to_samples() {
        let mut backend = MockBackend::new();
        backend.expect_list_jobs().returning(|_, _, _| {
            Err(BackendError::new(BackendErrorKind::Transport, "connection refused"))
        });

        let page = ListingService::new(Arc::new(backend))
            .page(&Caller::Anonymous, &JobListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.source, PageSource::Sample);
        assert_eq!(page.items.len(), 6);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn later_page_failure_is_surfaced() {
        let mut backend = MockBackend::new();
        backend.expect_list_jobs().returning(|_, _, _| {
            Err(BackendError::new(BackendErrorKind::Transport, "connection refused"))
        });

        let err = ListingService::new(Arc::new(backend))
            .page(
                &Caller::Anonymous,
                &JobListQuery {
                    offset: 6,
                    ..JobListQuery::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }

    #[tokio::test]
    async fn filters_only_active_and_requested_type() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_jobs()
            .withf(|_, filter, _| {
                filter.status == Some(JobStatus::Active)
                    && filter.job_type.as_deref() == Some("contract")
                    && filter.is_remote == Some(true)
            })
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));

        let page = ListingService::new(Arc::new(backend))
            .page(
                &Caller::Anonymous,
                &JobListQuery {
                    offset: 0,
                    job_type: Some(" contract ".into()),
                    remote: Some(true),
                },
            )
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }
}
