//! Errors raised by the rule engine and boundary parsing

use thiserror::Error;

/// Failures that can occur before anything is persisted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Invalid date format for {field}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDateFormat { field: &'static str, value: String },

    #[error("Sowing date is required")]
    MissingSowingDate,

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Harvest date for {field} is outside the supported calendar range")]
    DateOutOfRange { field: &'static str },
}

impl LifecycleError {
    /// Name of the input field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            LifecycleError::InvalidDateFormat { field, .. } => field,
            LifecycleError::MissingSowingDate => "sown_on",
            LifecycleError::MissingField { field } => field,
            LifecycleError::DateOutOfRange { field } => field,
        }
    }
}
