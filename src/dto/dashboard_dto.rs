use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::application_dto::{ReceivedApplication, SeekerApplication};
use crate::dto::job_dto::JobCard;
use crate::models::job::JobStatus;
use crate::models::profile::{AccountProfile, ProfileChanges};

#[derive(Debug, Clone, Serialize)]
pub struct SeekerStats {
    pub applications: usize,
    pub saved_jobs: usize,
    pub interviews: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeekerDashboard {
    pub profile: AccountProfile,
    pub completeness: u8,
    pub stats: SeekerStats,
    pub applications: Vec<SeekerApplication>,
    pub saved_jobs: Vec<JobCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostedJob {
    pub card: JobCard,
    pub status: JobStatus,
    pub applications: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerStats {
    pub active_jobs: usize,
    pub applications: usize,
    pub pending_review: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerDashboard {
    pub profile: AccountProfile,
    pub completeness: u8,
    pub stats: EmployerStats,
    pub jobs: Vec<PostedJob>,
    pub applications: Vec<ReceivedApplication>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Dashboard {
    JobSeeker(SeekerDashboard),
    Employer(EmployerDashboard),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdatePayload {
    #[validate(length(min = 1))]
    pub first_name: Option<String>,
    #[validate(length(min = 1))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    #[validate(range(min = 0, max = 80))]
    pub experience_years: Option<i32>,
    pub education: Option<String>,
    pub skills: Option<Vec<String>>,
    #[validate(url)]
    pub resume_url: Option<String>,
    #[validate(url)]
    pub linkedin_url: Option<String>,
    #[validate(url)]
    pub website_url: Option<String>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    #[validate(url)]
    pub company_website: Option<String>,
}

impl From<ProfileUpdatePayload> for ProfileChanges {
    fn from(payload: ProfileUpdatePayload) -> Self {
        Self {
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            bio: payload.bio,
            experience_years: payload.experience_years,
            education: payload.education,
            skills: payload
                .skills
                .map(crate::utils::validation::dedup_trimmed),
            resume_url: payload.resume_url,
            linkedin_url: payload.linkedin_url,
            website_url: payload.website_url,
            company_name: payload.company_name,
            company_description: payload.company_description,
            company_website: payload.company_website,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdateResponse {
    pub user_id: Uuid,
    pub profile: AccountProfile,
    pub completeness: u8,
}
