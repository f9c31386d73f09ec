pub mod analytics;
pub mod employee;
