use thiserror::Error;

/// Errors raised while building a rental schedule or its summary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RentalError {
    /// A config field is outside the range the calculation accepts
    #[error("Invalid config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The loan period sequence is empty or not numbered 1, 2, 3, ...
    #[error("Invalid schedule input: {0}")]
    InvalidScheduleInput(String),

    /// Report format other than plain text or html
    #[error("Unsupported report format '{0}', use txt or html")]
    UnsupportedFormat(String),

    #[error("Division by zero computing {0}")]
    DivisionByZero(&'static str),
}

impl RentalError {
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}

pub type RentalResult<T> = Result<T, RentalError>;
