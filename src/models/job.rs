use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Inactive,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Inactive => "inactive",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            JobStatus::Active => JobStatus::Inactive,
            JobStatus::Inactive => JobStatus::Active,
        }
    }
}

/// A row of the `jobs` table.
///
/// `company` is the denormalized company name; it links to `companies.name`
/// by string equality only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub description: String,
    pub requirements: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_remote: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    pub status: JobStatus,
    pub posted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn is_remote(&self) -> bool {
        self.is_remote.unwrap_or(false)
    }

    pub fn is_featured(&self) -> bool {
        self.is_featured.unwrap_or(false)
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub description: String,
    pub requirements: Option<String>,
    pub tags: Vec<String>,
    pub is_remote: bool,
    pub is_featured: bool,
    pub posted_by: Uuid,
    pub status: JobStatus,
}
