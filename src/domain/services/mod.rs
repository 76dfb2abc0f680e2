pub mod analytics;
pub mod availability;
pub mod cancellation;
