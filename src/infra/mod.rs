pub mod factory;
pub mod notify;
pub mod payments;
pub mod repositories;
