//! Fixed listings shown when the backend cannot be reached on first load.

use uuid::Uuid;

use crate::dto::company_dto::CompanyCard;
use crate::dto::job_dto::JobCard;

struct SampleJob {
    title: &'static str,
    company: &'static str,
    location: &'static str,
    salary: &'static str,
    description: &'static str,
    posted_at: &'static str,
    is_remote: bool,
    is_featured: bool,
    tags: &'static [&'static str],
}

const SAMPLE_JOBS: [SampleJob; 6] = [
    SampleJob {
        title: "Senior Frontend Developer",
        company: "TechCorp Inc.",
        location: "San Francisco, CA",
        salary: "$120k - $160k",
        description: "Join our innovative team to build cutting-edge web applications using React, TypeScript, and modern development practices.",
        posted_at: "2 days ago",
        is_remote: true,
        is_featured: true,
        tags: &["React", "TypeScript", "JavaScript", "CSS"],
    },
    SampleJob {
        title: "UX/UI Designer",
        company: "Design Studio",
        location: "New York, NY",
        salary: "$90k - $120k",
        description: "Create beautiful and intuitive user experiences for web and mobile applications.",
        posted_at: "1 week ago",
        is_remote: false,
        is_featured: false,
        tags: &["Figma", "Adobe XD", "User Research", "Prototyping"],
    },
    SampleJob {
        title: "Full Stack Engineer",
        company: "StartupCo",
        location: "Austin, TX",
        salary: "$100k - $140k",
        description: "Build scalable web applications from front to back using modern technologies.",
        posted_at: "3 days ago",
        is_remote: true,
        is_featured: true,
        tags: &["Node.js", "React", "PostgreSQL", "AWS"],
    },
    SampleJob {
        title: "Data Scientist",
        company: "DataTech",
        location: "Seattle, WA",
        salary: "$130k - $170k",
        description: "Analyze complex data sets to drive business decisions and build machine learning models.",
        posted_at: "5 days ago",
        is_remote: true,
        is_featured: false,
        tags: &["Python", "Machine Learning", "SQL", "R"],
    },
    SampleJob {
        title: "Product Manager",
        company: "ProductCorp",
        location: "Boston, MA",
        salary: "$110k - $150k",
        description: "Lead product development and strategy for our growing SaaS platform.",
        posted_at: "1 week ago",
        is_remote: false,
        is_featured: false,
        tags: &["Product Strategy", "Agile", "Analytics", "User Research"],
    },
    SampleJob {
        title: "DevOps Engineer",
        company: "CloudTech",
        location: "Remote",
        salary: "$115k - $145k",
        description: "Manage cloud infrastructure and deployment pipelines for high-scale applications.",
        posted_at: "4 days ago",
        is_remote: true,
        is_featured: true,
        tags: &["AWS", "Kubernetes", "Docker", "Terraform"],
    },
];

struct SampleCompany {
    name: &'static str,
    description: &'static str,
    industry: &'static str,
    location: &'static str,
    size: &'static str,
    open_jobs: i64,
}

const SAMPLE_COMPANIES: [SampleCompany; 6] = [
    SampleCompany {
        name: "TechCorp Inc.",
        description: "Leading technology company specializing in innovative software solutions and cutting-edge web development.",
        industry: "Technology",
        location: "San Francisco, CA",
        size: "1000-5000",
        open_jobs: 15,
    },
    SampleCompany {
        name: "StartupXYZ",
        description: "Fast-growing startup revolutionizing the e-commerce space with AI-powered solutions.",
        industry: "E-commerce",
        location: "New York, NY",
        size: "50-200",
        open_jobs: 8,
    },
    SampleCompany {
        name: "DesignStudio",
        description: "Creative agency focused on brand identity, UX/UI design, and digital marketing solutions.",
        industry: "Design",
        location: "Los Angeles, CA",
        size: "10-50",
        open_jobs: 5,
    },
    SampleCompany {
        name: "DataCorp",
        description: "Data analytics company helping businesses make informed decisions through advanced analytics.",
        industry: "Analytics",
        location: "Seattle, WA",
        size: "500-1000",
        open_jobs: 12,
    },
    SampleCompany {
        name: "CloudTech",
        description: "Cloud infrastructure provider offering scalable solutions for modern businesses.",
        industry: "Cloud Services",
        location: "Austin, TX",
        size: "200-500",
        open_jobs: 20,
    },
    SampleCompany {
        name: "AppStudio",
        description: "Mobile app development company creating innovative solutions for iOS and Android platforms.",
        industry: "Mobile Development",
        location: "Boston, MA",
        size: "50-200",
        open_jobs: 7,
    },
];

/// Industry filter options of the company directory.
pub const INDUSTRIES: [&str; 6] = [
    "Technology",
    "E-commerce",
    "Design",
    "Analytics",
    "Cloud Services",
    "Mobile Development",
];

/// Head-count buckets of the company directory.
pub const COMPANY_SIZES: [&str; 7] = [
    "1-10", "10-50", "50-200", "200-500", "500-1000", "1000-5000", "5000+",
];

// Stable ids so a sample card links to the same detail path on every load.
fn sample_id(namespace: u128, index: usize) -> Uuid {
    Uuid::from_u128(namespace << 64 | (index as u128 + 1))
}

pub fn sample_jobs() -> Vec<JobCard> {
    SAMPLE_JOBS
        .iter()
        .enumerate()
        .map(|(i, job)| JobCard {
            id: sample_id(1, i),
            title: job.title.to_string(),
            company: job.company.to_string(),
            location: job.location.to_string(),
            job_type: "Full Time".to_string(),
            salary: job.salary.to_string(),
            description: job.description.to_string(),
            posted_at: job.posted_at.to_string(),
            is_remote: job.is_remote,
            is_featured: job.is_featured,
            tags: job.tags.iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}

pub fn sample_companies() -> Vec<CompanyCard> {
    SAMPLE_COMPANIES
        .iter()
        .enumerate()
        .map(|(i, company)| CompanyCard {
            id: sample_id(2, i),
            name: company.name.to_string(),
            description: Some(company.description.to_string()),
            industry: Some(company.industry.to_string()),
            location: Some(company.location.to_string()),
            size: Some(company.size.to_string()),
            founded_year: None,
            website: None,
            logo_url: None,
            open_jobs: company.open_jobs,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_ids_are_distinct_and_stable() {
        let first = sample_jobs();
        let second = sample_jobs();
        assert_eq!(first.len(), 6);
        assert_eq!(first[0].id, second[0].id);
        assert_ne!(first[0].id, sample_companies()[0].id);
    }
}
