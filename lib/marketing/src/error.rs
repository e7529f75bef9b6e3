//! Error types for marketing event handling.

use std::fmt;

/// Input validation failures for marketing events and listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or blank.
    MissingField { field: &'static str },
    /// A field was present but unusable.
    InvalidField { field: &'static str, reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "{field} is required"),
            Self::InvalidField { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ValidationError {}
