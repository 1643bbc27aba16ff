pub mod analytics;
pub mod dashboard;
pub mod filter;
pub mod projection;
