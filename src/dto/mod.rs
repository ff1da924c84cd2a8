pub mod application_dto;
pub mod company_dto;
pub mod dashboard_dto;
pub mod job_dto;
pub mod session_dto;
