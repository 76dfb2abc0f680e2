pub mod analytics;
pub mod appointment;
pub mod availability;
pub mod health;
pub mod schedule;
pub mod service;
