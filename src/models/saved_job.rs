use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedJob {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSavedJob {
    pub job_id: Uuid,
    pub user_id: Uuid,
}
