//! Discounted Cash Flow valuation.
//!
//! Projects the most recent reported free cash flow forward at a flat growth
//! rate, discounts the explicit forecast and a growing-perpetuity terminal
//! value back to present, and compares the resulting fair value per share to
//! the market price.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ValuationError;
use crate::types::{with_metadata, ComputationOutput, FiscalYearCashFlow, Money, Rate};
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// User-supplied model assumptions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DcfAssumptions {
    /// Minimum return the investor expects (discount rate)
    pub expected_return: Rate,
    /// Risk-free rate of return
    pub risk_free_rate: Rate,
    /// Flat free cash flow growth rate over the forecast period
    pub fcf_growth_rate: Rate,
    /// Explicit forecast horizon in years (>= 1)
    pub forecast_years: u32,
}

/// Input for a DCF valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfInput {
    /// Free cash flow history in the order the provider reported it.
    /// The entry with the greatest fiscal year is the projection base.
    pub historical_fcf: Vec<FiscalYearCashFlow>,
    /// Diluted shares outstanding
    pub shares_outstanding: Decimal,
    /// Current market price per share
    pub market_price: Money,
    pub assumptions: DcfAssumptions,
}

/// One row of the combined historical + forecast table.
///
/// Historical rows carry zero discount columns and `is_estimate = false`;
/// projected rows have `discount_factor >= 1` and `is_estimate = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub year: i32,
    pub free_cash_flow: Money,
    pub discount_factor: Rate,
    pub discounted_fcf: Money,
    pub is_estimate: bool,
}

/// Value of all cash flows beyond the explicit forecast horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalValue {
    /// Growing-perpetuity value at the horizon
    pub undiscounted: Money,
    /// The horizon year's discounted FCF, repeated for display continuity
    pub discounted_fcf_at_horizon: Money,
    /// Present value of the perpetuity
    pub discounted: Money,
}

/// Verdict against the current market price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceLevel {
    Overvalued,
    Undervalued,
}

impl std::fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceLevel::Overvalued => write!(f, "overvalued"),
            PriceLevel::Undervalued => write!(f, "undervalued"),
        }
    }
}

/// Output of the DCF valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfOutput {
    /// Historical rows followed by projected rows
    pub forecast_table: Vec<ForecastRow>,
    pub terminal_value: TerminalValue,
    /// Intrinsic value per share, rounded to cents
    pub fair_value_per_share: Money,
    /// Market price the valuation was run against
    pub market_price: Money,
    /// |market - fair| / |fair|
    pub deviation_fraction: Decimal,
    pub price_level: PriceLevel,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the full DCF valuation pipeline.
pub fn calculate_dcf(input: &DcfInput) -> ValuationResult<ComputationOutput<DcfOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (forecast_table, terminal_value) =
        build_forecast_table(&input.historical_fcf, &input.assumptions)?;

    let base = most_recent(&input.historical_fcf).unwrap(); // non-empty: checked above
    if base.free_cash_flow <= Decimal::ZERO {
        warnings.push(format!(
            "Most recent free cash flow ({}) is non-positive; projections inherit its sign",
            base.free_cash_flow
        ));
    }
    if input.assumptions.expected_return < input.assumptions.risk_free_rate {
        warnings.push(
            "Expected return is below the risk-free rate; the terminal value is negative".into(),
        );
    }

    let discounted_forecast: Vec<Money> = forecast_table
        .iter()
        .filter(|row| row.is_estimate)
        .map(|row| row.discounted_fcf)
        .collect();

    let fair_value_per_share = compute_fair_value(
        &discounted_forecast,
        terminal_value.discounted,
        input.shares_outstanding,
    )?;

    let (deviation_fraction, price_level) = classify(input.market_price, fair_value_per_share)?;

    let output = DcfOutput {
        forecast_table,
        terminal_value,
        fair_value_per_share,
        market_price: input.market_price,
        deviation_fraction,
        price_level,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Single-Stage FCF DCF (Perpetuity Terminal Value)",
        &input.assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Project `base_fcf` forward at a flat growth rate.
///
/// Entry `i` (1-based) is `base_fcf * (1 + growth_rate)^i` at year
/// `base_year + i`. Powers are accumulated by iterative multiplication so
/// results are bit-exact.
pub fn project_cash_flows(
    base_fcf: Money,
    base_year: i32,
    growth_rate: Rate,
    years: u32,
) -> Vec<(i32, Money)> {
    let factor = Decimal::ONE + growth_rate;
    let mut projected = Vec::with_capacity(years as usize);
    let mut fcf = base_fcf;
    for offset in 1..=years {
        fcf *= factor;
        projected.push((base_year + offset as i32, fcf));
    }
    projected
}

/// Discount a series of future values back to present.
///
/// Element `i` (1-based) is divided by `(1 + rate)^i`.
pub fn discount(values: &[Money], rate: Rate) -> ValuationResult<Vec<Money>> {
    if rate <= dec!(-1) {
        return Err(ValuationError::invalid(
            "expected_return",
            "discount rate must be greater than -100%",
        ));
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    let mut discounted = Vec::with_capacity(values.len());
    for value in values {
        factor *= one_plus_r;
        discounted.push(value / factor);
    }
    Ok(discounted)
}

/// Terminal value as a growing perpetuity on `base_fcf`, discounted back
/// over `horizon_years`.
pub fn compute_terminal_value(
    base_fcf: Money,
    risk_free_rate: Rate,
    expected_return: Rate,
    horizon_years: u32,
) -> ValuationResult<TerminalValue> {
    if expected_return == risk_free_rate {
        return Err(ValuationError::invalid(
            "expected_return",
            "must differ from the risk-free rate (terminal value divides by their difference)",
        ));
    }
    if expected_return <= dec!(-1) {
        return Err(ValuationError::invalid(
            "expected_return",
            "discount rate must be greater than -100%",
        ));
    }

    let undiscounted =
        base_fcf * (Decimal::ONE + risk_free_rate) / (expected_return - risk_free_rate);

    let horizon_factor = (Decimal::ONE + expected_return).powd(Decimal::from(horizon_years));

    Ok(TerminalValue {
        undiscounted,
        discounted_fcf_at_horizon: base_fcf / horizon_factor,
        discounted: undiscounted / horizon_factor,
    })
}

/// Build the combined historical + forecast table and its terminal value.
///
/// Historical rows come first, in the order received, and are never
/// overwritten by projections: the forecast starts the year after the most
/// recent reported one. The terminal value grows the final projected FCF.
pub fn build_forecast_table(
    historical: &[FiscalYearCashFlow],
    assumptions: &DcfAssumptions,
) -> ValuationResult<(Vec<ForecastRow>, TerminalValue)> {
    if historical.is_empty() {
        return Err(ValuationError::DataUnavailable(
            "no free cash flow history to project from".into(),
        ));
    }
    if assumptions.forecast_years < 1 {
        return Err(ValuationError::invalid(
            "forecast_years",
            "forecast horizon must be at least 1 year",
        ));
    }

    let base = most_recent(historical).unwrap(); // non-empty: checked above

    let projected = project_cash_flows(
        base.free_cash_flow,
        base.fiscal_year,
        assumptions.fcf_growth_rate,
        assumptions.forecast_years,
    );
    let values: Vec<Money> = projected.iter().map(|(_, fcf)| *fcf).collect();
    let discounted = discount(&values, assumptions.expected_return)?;

    let mut table = Vec::with_capacity(historical.len() + projected.len());
    for entry in historical {
        table.push(ForecastRow {
            year: entry.fiscal_year,
            free_cash_flow: entry.free_cash_flow,
            discount_factor: Decimal::ZERO,
            discounted_fcf: Decimal::ZERO,
            is_estimate: false,
        });
    }

    let one_plus_r = Decimal::ONE + assumptions.expected_return;
    let mut factor = Decimal::ONE;
    for ((year, fcf), pv) in projected.iter().zip(&discounted) {
        factor *= one_plus_r;
        table.push(ForecastRow {
            year: *year,
            free_cash_flow: *fcf,
            discount_factor: factor,
            discounted_fcf: *pv,
            is_estimate: true,
        });
    }

    let (_, horizon_fcf) = *projected.last().unwrap(); // forecast_years >= 1
    let terminal_value = compute_terminal_value(
        horizon_fcf,
        assumptions.risk_free_rate,
        assumptions.expected_return,
        assumptions.forecast_years,
    )?;

    Ok((table, terminal_value))
}

/// Fair value per share: discounted forecast plus discounted terminal value,
/// spread over the share count and rounded to cents.
pub fn compute_fair_value(
    discounted_forecast: &[Money],
    discounted_terminal: Money,
    shares_outstanding: Decimal,
) -> ValuationResult<Money> {
    if shares_outstanding <= Decimal::ZERO {
        return Err(ValuationError::invalid(
            "shares_outstanding",
            "must be positive",
        ));
    }

    let total: Money = discounted_forecast.iter().copied().sum::<Decimal>() + discounted_terminal;
    Ok((total / shares_outstanding).round_dp(2))
}

/// Deviation of the market price from fair value, and the verdict.
///
/// Equality counts as undervalued: a security is overvalued only when the
/// market price is strictly above fair value.
pub fn classify(market_price: Money, fair_value: Money) -> ValuationResult<(Decimal, PriceLevel)> {
    if fair_value.is_zero() {
        return Err(ValuationError::invalid(
            "fair_value",
            "deviation is undefined for a zero fair value",
        ));
    }

    let deviation = (market_price - fair_value).abs() / fair_value.abs();
    let level = if market_price > fair_value {
        PriceLevel::Overvalued
    } else {
        PriceLevel::Undervalued
    };

    Ok((deviation, level))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// The projection base: the entry with the greatest fiscal year, wherever it
/// sits in the provider's ordering.
fn most_recent(historical: &[FiscalYearCashFlow]) -> Option<&FiscalYearCashFlow> {
    historical.iter().max_by_key(|f| f.fiscal_year)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
