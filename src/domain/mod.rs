pub mod dashboard;
pub mod models;
pub mod quiz;
pub mod submission;
