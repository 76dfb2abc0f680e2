pub mod appointment;
pub mod schedule;
pub mod service;
