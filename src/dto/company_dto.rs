use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::job_dto::{JobCard, PageSource};
use crate::models::company::Company;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyListQuery {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyCard {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub size: Option<String>,
    pub founded_year: Option<i32>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub open_jobs: i64,
}

impl CompanyCard {
    pub fn new(company: Company, open_jobs: i64) -> Self {
        Self {
            id: company.id,
            name: company.name,
            description: company.description,
            industry: company.industry,
            location: company.location,
            size: company.size,
            founded_year: company.founded_year,
            website: company.website,
            logo_url: company.logo_url,
            open_jobs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDirectory {
    pub companies: Vec<CompanyCard>,
    pub industries: Vec<String>,
    pub sizes: Vec<String>,
    pub source: PageSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetailsResponse {
    pub company: Company,
    pub jobs: Vec<JobCard>,
}
