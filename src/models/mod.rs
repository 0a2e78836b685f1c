//! Value types for the analysis pipeline: patient records, image assets,
//! question sets, and analysis results.

pub mod analysis;
pub mod enums;
pub mod imaging;
pub mod patient;
pub mod questions;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnum { field: String, value: String },

    #[error("{field} out of range: {detail}")]
    OutOfRange { field: &'static str, detail: String },
}

/// Sentinel rendered for any unprovided optional field.
pub const NOT_PROVIDED: &str = "Not provided";

/// Display an optional free-text field, substituting the sentinel.
pub fn text_or_sentinel(value: Option<&str>) -> &str {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => NOT_PROVIDED,
    }
}
