use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("Invalid assumption: {field} — {reason}")]
    InvalidAssumption { field: String, reason: String },

    #[error("Market data unavailable: {0}. Check the ticker symbol or try again later.")]
    DataUnavailable(String),
}

impl ValuationError {
    /// Shorthand for the common invalid-assumption case.
    pub fn invalid(field: &str, reason: &str) -> Self {
        ValuationError::InvalidAssumption {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
