pub mod error;
pub mod provider;
pub mod types;
pub mod valuation;

pub use error::ValuationError;
pub use provider::{CompanyFinancials, FinancialDataProvider, ReportedCashFlow};
pub use types::*;

/// Standard result type for all valuation operations
pub type ValuationResult<T> = Result<T, ValuationError>;
