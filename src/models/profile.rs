use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    JobSeeker,
    Employer,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::JobSeeker => "job_seeker",
            AccountType::Employer => "employer",
        }
    }

    /// Unknown or missing values fall back to a job seeker account.
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("employer") => AccountType::Employer,
            _ => AccountType::JobSeeker,
        }
    }
}

/// A raw row of the `profiles` table, one per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_type: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub education: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub website_url: Option<String>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub company_website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSeekerProfile {
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub education: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub website_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerProfile {
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub company_website: Option<String>,
}

/// A profile resolved once at load time by its `account_type` discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "account_type", rename_all = "snake_case")]
pub enum AccountProfile {
    JobSeeker(JobSeekerProfile),
    Employer(EmployerProfile),
}

impl From<ProfileRow> for AccountProfile {
    fn from(row: ProfileRow) -> Self {
        match AccountType::from_column(row.account_type.as_deref()) {
            AccountType::JobSeeker => AccountProfile::JobSeeker(JobSeekerProfile {
                user_id: row.user_id,
                first_name: row.first_name,
                last_name: row.last_name,
                phone: row.phone,
                bio: row.bio,
                experience_years: row.experience_years,
                education: row.education,
                skills: row.skills.unwrap_or_default(),
                resume_url: row.resume_url,
                linkedin_url: row.linkedin_url,
                website_url: row.website_url,
            }),
            AccountType::Employer => AccountProfile::Employer(EmployerProfile {
                user_id: row.user_id,
                first_name: row.first_name,
                last_name: row.last_name,
                phone: row.phone,
                company_name: row.company_name,
                company_description: row.company_description,
                company_website: row.company_website,
            }),
        }
    }
}

impl AccountProfile {
    pub fn account_type(&self) -> AccountType {
        match self {
            AccountProfile::JobSeeker(_) => AccountType::JobSeeker,
            AccountProfile::Employer(_) => AccountType::Employer,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            AccountProfile::JobSeeker(p) => p.user_id,
            AccountProfile::Employer(p) => p.user_id,
        }
    }

    pub fn display_name(&self) -> Option<String> {
        let (first, last) = match self {
            AccountProfile::JobSeeker(p) => (p.first_name.as_deref(), p.last_name.as_deref()),
            AccountProfile::Employer(p) => (p.first_name.as_deref(), p.last_name.as_deref()),
        };
        let name = [first, last]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!name.is_empty()).then_some(name)
    }

    /// Percentage of filled profile fields out of seven, rounded.
    ///
    /// The account email is counted as always present.
    pub fn completeness(&self) -> u8 {
        let filled = match self {
            AccountProfile::JobSeeker(p) => [
                is_filled(&p.first_name),
                is_filled(&p.last_name),
                true,
                is_filled(&p.phone),
                is_filled(&p.bio),
                p.experience_years.is_some(),
                !p.skills.is_empty(),
            ],
            AccountProfile::Employer(p) => [
                is_filled(&p.first_name),
                is_filled(&p.last_name),
                true,
                is_filled(&p.phone),
                is_filled(&p.company_name),
                is_filled(&p.company_description),
                is_filled(&p.company_website),
            ],
        };
        let count = filled.iter().filter(|f| **f).count() as f64;
        ((count / filled.len() as f64) * 100.0).round() as u8
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub account_type: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial update of a profile row; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
}

#[cfg(test)]
pub(crate) fn sample_row(user_id: Uuid, account_type: Option<&str>) -> ProfileRow {
    ProfileRow {
        id: Uuid::new_v4(),
        user_id,
        account_type: account_type.map(str::to_string),
        first_name: None,
        last_name: None,
        phone: None,
        bio: None,
        experience_years: None,
        education: None,
        skills: None,
        resume_url: None,
        linkedin_url: None,
        website_url: None,
        company_name: None,
        company_description: None,
        company_website: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
