pub mod analyze;
pub mod health;
pub mod image;
pub mod patient;
pub mod report;
pub mod sessions;
