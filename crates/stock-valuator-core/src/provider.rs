//! Contract with the external market-data layer.
//!
//! The core never fetches anything itself: implementations of
//! [`FinancialDataProvider`] (HTTP clients, caches, snapshot files) live in
//! the calling layer and hand the engine a validated [`CompanyFinancials`].
//! Any caching or retrying belongs to those implementations.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValuationError;
use crate::types::{FiscalYearCashFlow, Money};
use crate::ValuationResult;

/// Free cash flow as reported for one statement period.
///
/// Providers key statements by period-end date; the engine works in fiscal
/// years derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportedCashFlow {
    pub period_end: NaiveDate,
    pub free_cash_flow: Money,
}

/// Everything the valuation models need about one listed company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyFinancials {
    /// Short display name
    pub company_name: String,
    /// ISO-ish currency code as reported by the provider
    pub currency: String,
    /// Diluted shares outstanding
    pub shares_outstanding: Decimal,
    /// Previous close price per share
    pub previous_close: Money,
    /// Trailing dividend rate per share, absent for non-payers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_rate: Option<Decimal>,
    /// Free cash flow history, in the order the provider reports it
    /// (most-recent-first for most feeds)
    pub free_cash_flow_history: Vec<ReportedCashFlow>,
}

impl CompanyFinancials {
    /// Check that all fields required by the valuation models are present.
    ///
    /// A record that fails here must never reach the engine — the caller
    /// reports the failure and produces no partial result.
    pub fn validate(&self) -> ValuationResult<()> {
        if self.company_name.trim().is_empty() {
            return Err(ValuationError::DataUnavailable(
                "provider returned a record without a company name".into(),
            ));
        }
        if self.free_cash_flow_history.is_empty() {
            return Err(ValuationError::DataUnavailable(
                "provider returned no free cash flow history".into(),
            ));
        }
        Ok(())
    }

    /// Map reported period-end dates to (fiscal year, amount) pairs,
    /// preserving the provider's ordering.
    pub fn fiscal_year_cash_flows(&self) -> Vec<FiscalYearCashFlow> {
        self.free_cash_flow_history
            .iter()
            .map(|r| FiscalYearCashFlow {
                fiscal_year: r.period_end.year(),
                free_cash_flow: r.free_cash_flow,
            })
            .collect()
    }
}

/// Source of company financials, looked up by ticker symbol.
///
/// Implementations fail with [`ValuationError::DataUnavailable`] when the
/// symbol is unknown, required fields are missing, or the upstream source is
/// unreachable.
pub trait FinancialDataProvider {
    fn fetch_financials(&self, symbol: &str) -> ValuationResult<CompanyFinancials>;
}
