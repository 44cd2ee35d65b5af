use thiserror::Error;

/// Validation failures reported synchronously by the tracker.
///
/// None of these mutate tracker state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("A custom hourly rate must be set before starting a meeting with the custom cost method")]
    MissingCustomRate,
    #[error("Unknown meeting config field: {0}")]
    InvalidField(String),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl TrackerError {
    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
