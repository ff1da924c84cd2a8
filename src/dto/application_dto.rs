use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{ApplicationStatus, ApplicationTable, StatusTone};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplicationFormPayload {
    #[validate(length(min = 1))]
    pub cover_letter: String,
    #[validate(url)]
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub application_id: Uuid,
    pub table: ApplicationTable,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveToggleResponse {
    pub job_id: Uuid,
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawResponse {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub withdrawn: bool,
}

/// An application as the applicant sees it on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeekerApplication {
    pub id: Uuid,
    pub table: ApplicationTable,
    pub job_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub status: ApplicationStatus,
    pub status_label: String,
    pub status_tone: StatusTone,
    pub applied_at: String,
}

/// An application against one of the employer's postings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedApplication {
    pub id: Uuid,
    pub table: ApplicationTable,
    pub job_id: Uuid,
    pub job_title: String,
    pub applicant_id: Uuid,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub status_label: String,
    pub status_tone: StatusTone,
    pub applied_at: String,
    pub can_review: bool,
    pub can_reject: bool,
}
