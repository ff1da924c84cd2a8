use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flat application status; there is no transition guard between values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    #[serde(alias = "under_review")]
    Reviewed,
    InterviewScheduled,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Neutral,
    Warning,
    Success,
    Destructive,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Reviewed => "Under Review",
            ApplicationStatus::InterviewScheduled => "Interview Scheduled",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            ApplicationStatus::Pending => StatusTone::Neutral,
            ApplicationStatus::Reviewed => StatusTone::Warning,
            ApplicationStatus::InterviewScheduled | ApplicationStatus::Accepted => {
                StatusTone::Success
            }
            ApplicationStatus::Rejected => StatusTone::Destructive,
        }
    }
}

/// The two overlapping application tables of the hosted schema.
///
/// `applications` carries quick applies; `job_applications` carries the
/// application form with its cover letter. Reads merge both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationTable {
    Applications,
    JobApplications,
}

impl ApplicationTable {
    pub const ALL: [ApplicationTable; 2] = [
        ApplicationTable::Applications,
        ApplicationTable::JobApplications,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            ApplicationTable::Applications => "applications",
            ApplicationTable::JobApplications => "job_applications",
        }
    }

    pub fn user_column(&self) -> &'static str {
        match self {
            ApplicationTable::Applications => "user_id",
            ApplicationTable::JobApplications => "applicant_id",
        }
    }
}

/// An application row from either table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub table: ApplicationTable,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: row.id,
            table: ApplicationTable::Applications,
            job_id: row.job_id,
            user_id: row.user_id,
            status: row.status,
            cover_letter: None,
            resume_url: None,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<JobApplicationRow> for Application {
    fn from(row: JobApplicationRow) -> Self {
        Self {
            id: row.id,
            table: ApplicationTable::JobApplications,
            job_id: row.job_id,
            user_id: row.applicant_id,
            status: row.status,
            cover_letter: row.cover_letter,
            resume_url: row.resume_url,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub table: ApplicationTable,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
}

impl NewApplication {
    pub fn quick(job_id: Uuid, user_id: Uuid) -> Self {
        Self {
            table: ApplicationTable::Applications,
            job_id,
            user_id,
            cover_letter: None,
            resume_url: None,
        }
    }

    /// Insert body in the column layout of the target table.
    pub fn to_row(&self) -> serde_json::Value {
        match self.table {
            ApplicationTable::Applications => serde_json::json!({
                "job_id": self.job_id,
                "user_id": self.user_id,
                "status": ApplicationStatus::Pending,
            }),
            ApplicationTable::JobApplications => serde_json::json!({
                "job_id": self.job_id,
                "applicant_id": self.user_id,
                "status": ApplicationStatus::Pending,
                "cover_letter": self.cover_letter,
                "resume_url": self.resume_url,
            }),
        }
    }
}
