pub mod application_service;
pub mod company_service;
pub mod dashboard_service;
pub mod job_service;
pub mod listing_service;
pub mod samples;
pub mod session_service;
