use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::job::{Job, JobStatus};
use crate::utils::{
    salary::{format_salary_detail, format_salary_range},
    time::posted_age,
};

/// Listing card shown on the jobs page and dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCard {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub salary: String,
    pub description: String,
    pub posted_at: String,
    pub is_remote: bool,
    pub is_featured: bool,
    pub tags: Vec<String>,
}

impl JobCard {
    pub fn from_job(job: &Job, now: DateTime<Utc>) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            job_type: job.job_type.clone(),
            salary: format_salary_range(job.salary_min, job.salary_max),
            description: job.description.clone(),
            posted_at: posted_age(job.created_at, now),
            is_remote: job.is_remote(),
            is_featured: job.is_featured(),
            tags: job.tags().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSource {
    Live,
    /// The first page could not be fetched and fixed samples are shown instead.
    Sample,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPage {
    pub items: Vec<JobCard>,
    pub offset: i64,
    pub next_offset: i64,
    pub has_more: bool,
    pub source: PageSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub remote: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDetailsResponse {
    pub job: Job,
    pub salary: String,
    pub posted_at: String,
    pub is_saved: bool,
    pub has_applied: bool,
    pub apply_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyLinkResponse {
    pub path: String,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostJobPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub location: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub job_type: String,
    /// Free text such as `"$80k - $120k"`.
    #[validate(length(min = 1))]
    pub salary: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub requirements: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteQuery {
    #[serde(default)]
    pub featured: bool,
}

/// Posting price in whole dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingQuote {
    pub base: i64,
    pub featured_addon: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub id: Uuid,
    pub status: JobStatus,
}
