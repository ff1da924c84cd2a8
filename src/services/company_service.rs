use std::sync::Arc;

use uuid::Uuid;

use crate::backend::{Backend, Caller, JobFilter};
use crate::dto::company_dto::{
    CompanyCard, CompanyDetailsResponse, CompanyDirectory, CompanyListQuery,
};
use crate::dto::job_dto::{JobCard, PageSource};
use crate::error::{Error, Result};
use crate::services::samples::{sample_companies, COMPANY_SIZES, INDUSTRIES};
use crate::utils::time::now;

#[derive(Clone)]
pub struct CompanyService {
    backend: Arc<dyn Backend>,
}

fn selected(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl CompanyService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    async fn load_cards(&self, caller: &Caller) -> Result<Vec<CompanyCard>> {
        let companies = self.backend.list_companies(caller).await?;
        let mut cards = Vec::with_capacity(companies.len());
        for company in companies {
            let filter = JobFilter {
                company: Some(company.name.clone()),
                ..JobFilter::active()
            };
            // A failed count shows as zero; only the company list itself is fatal.
            let open_jobs = match self.backend.count_jobs(caller, &filter).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(company = %company.name, error = %e, "Failed to count open jobs");
                    0
                }
            };
            cards.push(CompanyCard::new(company, open_jobs));
        }
        Ok(cards)
    }

    /// Company directory with open-job counts, narrowed by the query filters.
    pub async fn directory(
        &self,
        caller: &Caller,
        query: &CompanyListQuery,
    ) -> Result<CompanyDirectory> {
        let (cards, source) = match self.load_cards(caller).await {
            Ok(cards) => (cards, PageSource::Live),
            Err(e) => {
                tracing::warn!(error = %e, "Company directory unavailable, showing sample companies");
                (sample_companies(), PageSource::Sample)
            }
        };

        let search = selected(&query.search).map(str::to_lowercase);
        let industry = selected(&query.industry);
        let size = selected(&query.size);

        let companies = cards
            .into_iter()
            .filter(|c| {
                search.as_deref().map_or(true, |term| {
                    c.name.to_lowercase().contains(term)
                        || c
                            .description
                            .as_deref()
                            .map_or(false, |d| d.to_lowercase().contains(term))
                })
            })
            .filter(|c| industry.map_or(true, |i| c.industry.as_deref() == Some(i)))
            .filter(|c| size.map_or(true, |s| c.size.as_deref() == Some(s)))
            .collect();

        Ok(CompanyDirectory {
            companies,
            industries: INDUSTRIES.iter().map(|s| s.to_string()).collect(),
            sizes: COMPANY_SIZES.iter().map(|s| s.to_string()).collect(),
            source,
        })
    }

    /// A company and the jobs posted under its name, newest first.
    pub async fn details(&self, caller: &Caller, id: Uuid) -> Result<CompanyDetailsResponse> {
        let company = self
            .backend
            .get_company(caller, id)
            .await?
            .ok_or_else(|| Error::NotFound("Company not found".to_string()))?;

        let filter = JobFilter {
            company: Some(company.name.clone()),
            ..JobFilter::default()
        };
        let jobs = match self.backend.list_jobs(caller, &filter, None).await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(company = %company.name, error = %e, "Failed to load company jobs");
                Vec::new()
            }
        };
        let now = now();
        Ok(CompanyDetailsResponse {
            jobs: jobs.iter().map(|job| JobCard::from_job(job, now)).collect(),
            company,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, BackendErrorKind, MockBackend};
    use crate::models::company::Company;
    use chrono::Utc;

    fn company(name: &str, industry: &str, size: &str, description: &str) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: name.into(),
            description: Some(description.into()),
            industry: Some(industry.into()),
            location: None,
            size: Some(size.into()),
            founded_year: Some(2010),
            website: None,
            logo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn counts_open_jobs_per_company() {
        let mut backend = MockBackend::new();
        backend.expect_list_companies().returning(|_| {
            Ok(vec![
                company("Acme", "Technology", "50-200", "Rockets"),
                company("Globex", "Analytics", "10-50", "Data for everyone"),
            ])
        });
        backend
            .expect_count_jobs()
            .withf(|_, f| f.status.is_some())
            .returning(|_, f| Ok(if f.company.as_deref() == Some("Acme") { 3 } else { 0 }));

        let directory = CompanyService::new(Arc::new(backend))
            .directory(&Caller::Anonymous, &CompanyListQuery::default())
            .await
            .unwrap();
        assert_eq!(directory.source, PageSource::Live);
        assert_eq!(directory.companies[0].open_jobs, 3);
        assert_eq!(directory.companies[1].open_jobs, 0);
    }

    #[tokio::test]
    async fn search_matches_name_or_description_case_insensitively() {
        let mut backend = MockBackend::new();
        backend.expect_list_companies().returning(|_| {
            Ok(vec![
                company("Acme", "Technology", "50-200", "Rockets"),
                company("Globex", "Analytics", "10-50", "Data for everyone"),
            ])
        });
        backend.expect_count_jobs().returning(|_, _| Ok(1));

        let service = CompanyService::new(Arc::new(backend));
        let by_description = service
            .directory(
                &Caller::Anonymous,
                &CompanyListQuery {
                    search: Some("DATA".into()),
                    ..CompanyListQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_description.companies.len(), 1);
        assert_eq!(by_description.companies[0].name, "Globex");

        let by_size = service
            .directory(
                &Caller::Anonymous,
                &CompanyListQuery {
                    industry: Some("all".into()),
                    size: Some("50-200".into()),
                    ..CompanyListQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_size.companies.len(), 1);
        assert_eq!(by_size.companies[0].name, "Acme");
    }

    #[tokio::test]
    async fn failure_falls_back_to_sample_companies() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_companies()
            .returning(|_| Err(BackendError::new(BackendErrorKind::Transport, "offline")));

        let directory = CompanyService::new(Arc::new(backend))
            .directory(
                &Caller::Anonymous,
                &CompanyListQuery {
                    industry: Some("Design".into()),
                    ..CompanyListQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(directory.source, PageSource::Sample);
        assert_eq!(directory.companies.len(), 1);
        assert_eq!(directory.companies[0].name, "DesignStudio");
    }

    #[tokio::test]
    async fn failed_count_keeps_live_directory() {
        let mut backend = MockBackend::new();
        backend.expect_list_companies().returning(|_| {
            Ok(vec![
                company("Acme", "Technology", "50-200", "Rockets"),
                company("Globex", "Analytics", "10-50", "Data for everyone"),
            ])
        });
        backend.expect_count_jobs().returning(|_, f| {
            if f.company.as_deref() == Some("Globex") {
                Err(BackendError::new(BackendErrorKind::Transport, "timeout"))
            } else {
                Ok(2)
            }
        });

        let directory = CompanyService::new(Arc::new(backend))
            .directory(&Caller::Anonymous, &CompanyListQuery::default())
            .await
            .unwrap();
        assert_eq!(directory.source, PageSource::Live);
        let names: Vec<&str> = directory.companies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Acme", "Globex"]);
        assert_eq!(directory.companies[0].open_jobs, 2);
        assert_eq!(directory.companies[1].open_jobs, 0);
    }

    #[tokio::test]
    async fn unknown_company_is_not_found() {
        let mut backend = MockBackend::new();
        backend.expect_get_company().returning(|_, _| Ok(None));

        let err = CompanyService::new(Arc::new(backend))
            .details(&Caller::Anonymous, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
