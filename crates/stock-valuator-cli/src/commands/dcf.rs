use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use stock_valuator_core::provider::FinancialDataProvider;
use stock_valuator_core::valuation::dcf::{self, DcfAssumptions, DcfInput};
use stock_valuator_core::{CompanyFinancials, Currency};

use crate::input;

/// Arguments for the DCF valuation
#[derive(Args)]
pub struct DcfArgs {
    /// Ticker symbol, looked up in the snapshot directory
    #[arg(long)]
    pub ticker: Option<String>,

    /// Directory holding provider snapshots (<TICKER>.json or .yaml)
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Path to a financials file (overrides --ticker)
    #[arg(long)]
    pub financials: Option<String>,

    /// Expected minimum return, the discount rate (e.g. 0.07 for 7%)
    #[arg(long, default_value = "0.07", allow_hyphen_values = true)]
    pub expected_return: Decimal,

    /// Risk-free rate of return
    #[arg(long, default_value = "0.03", allow_hyphen_values = true)]
    pub risk_free_rate: Decimal,

    /// Free cash flow growth rate over the forecast period
    #[arg(long, default_value = "0.03", allow_hyphen_values = true)]
    pub growth_rate: Decimal,

    /// Forecast horizon in years
    #[arg(long, default_value = "5")]
    pub years: u32,

    /// Override the provider's previous close price
    #[arg(long)]
    pub market_price: Option<Decimal>,
}

/// Arguments for the Discounted Dividend valuation
#[derive(Args)]
pub struct DdmArgs {
    /// Ticker symbol, looked up in the snapshot directory
    #[arg(long)]
    pub ticker: Option<String>,
}

pub fn run_dcf(args: DcfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let financials: CompanyFinancials = if let Some(ref path) = args.financials {
        input::file::read_financials(path)?
    } else if let Some(ref symbol) = args.ticker {
        let provider = input::provider::FileDataProvider::new(&args.data_dir);
        provider.fetch_financials(symbol)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err(
            "--ticker or --financials is required (or pipe financials JSON on stdin)".into(),
        );
    };

    financials.validate()?;

    let dcf_input = DcfInput {
        historical_fcf: financials.fiscal_year_cash_flows(),
        shares_outstanding: financials.shares_outstanding,
        market_price: args.market_price.unwrap_or(financials.previous_close),
        assumptions: DcfAssumptions {
            expected_return: args.expected_return,
            risk_free_rate: args.risk_free_rate,
            fcf_growth_rate: args.growth_rate,
            forecast_years: args.years,
        },
    };

    let result = dcf::calculate_dcf(&dcf_input)?;

    // Attach company context so formatters can render the summary line
    let mut value = serde_json::to_value(result)?;
    value["company"] = serde_json::json!({
        "name": financials.company_name,
        "currency": Currency::from_code(&financials.currency).code(),
    });
    Ok(value)
}

pub fn run_ddm(_args: DdmArgs) -> Result<Value, Box<dyn std::error::Error>> {
    Err("Discounted dividend model not yet available. \
         Use the dcf subcommand for a cash-flow based valuation."
        .into())
}
