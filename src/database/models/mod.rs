pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyFilter, CompanySummary};
pub use job::{Job, JobDetail, JobFilter, JobSummary};
pub use user::{User, UserSummary};
