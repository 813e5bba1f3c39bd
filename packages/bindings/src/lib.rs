use napi::Result as NapiResult;
use napi_derive::napi;

use rust_decimal::Decimal;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn dcf_valuation(input_json: String) -> NapiResult<String> {
    let input: stock_valuator_core::valuation::dcf::DcfInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        stock_valuator_core::valuation::dcf::calculate_dcf(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn classify_price(market_price: String, fair_value: String) -> NapiResult<String> {
    let market: Decimal = market_price.parse().map_err(to_napi_error)?;
    let fair: Decimal = fair_value.parse().map_err(to_napi_error)?;
    let (deviation, level) =
        stock_valuator_core::valuation::dcf::classify(market, fair).map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({
        "deviation_fraction": deviation.to_string(),
        "price_level": level,
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Provider data
// ---------------------------------------------------------------------------

#[napi]
pub fn validate_financials(financials_json: String) -> NapiResult<String> {
    let financials: stock_valuator_core::CompanyFinancials =
        serde_json::from_str(&financials_json).map_err(to_napi_error)?;
    financials.validate().map_err(to_napi_error)?;
    serde_json::to_string(&financials.fiscal_year_cash_flows()).map_err(to_napi_error)
}
