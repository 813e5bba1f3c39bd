use std::path::PathBuf;

use stock_valuator_core::provider::{CompanyFinancials, FinancialDataProvider};
use stock_valuator_core::ValuationError;

/// Offline data provider backed by a directory of snapshot files.
///
/// A snapshot is the serialized `CompanyFinancials` for one symbol, stored
/// as `<DIR>/<SYMBOL>.json` (or `.yaml`/`.yml`). Anything missing or
/// malformed surfaces as `DataUnavailable`, the same contract a live fetch
/// layer would honour.
pub struct FileDataProvider {
    root: PathBuf,
}

impl FileDataProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FinancialDataProvider for FileDataProvider {
    fn fetch_financials(&self, symbol: &str) -> Result<CompanyFinancials, ValuationError> {
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(ValuationError::DataUnavailable(
                "empty ticker symbol".into(),
            ));
        }

        for ext in ["json", "yaml", "yml"] {
            let path = self.root.join(format!("{symbol}.{ext}"));
            if !path.is_file() {
                continue;
            }

            let contents = std::fs::read_to_string(&path).map_err(|e| {
                ValuationError::DataUnavailable(format!(
                    "could not read snapshot '{}': {e}",
                    path.display()
                ))
            })?;

            let financials: CompanyFinancials = if ext == "json" {
                serde_json::from_str(&contents).map_err(|e| {
                    ValuationError::DataUnavailable(format!(
                        "snapshot for '{symbol}' is malformed: {e}"
                    ))
                })?
            } else {
                serde_yaml::from_str(&contents).map_err(|e| {
                    ValuationError::DataUnavailable(format!(
                        "snapshot for '{symbol}' is malformed: {e}"
                    ))
                })?
            };

            financials.validate()?;
            return Ok(financials);
        }

        Err(ValuationError::DataUnavailable(format!(
            "no snapshot for '{}' in {}",
            symbol,
            self.root.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use stock_valuator_core::ReportedCashFlow;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stockval-test-{label}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_financials() -> CompanyFinancials {
        CompanyFinancials {
            company_name: "Fabrikam Plc".into(),
            currency: "GBP".into(),
            shares_outstanding: dec!(120000000),
            previous_close: dec!(18.42),
            dividend_rate: None,
            free_cash_flow_history: vec![ReportedCashFlow {
                period_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                free_cash_flow: dec!(310000000),
            }],
        }
    }

    #[test]
    fn test_fetch_json_snapshot() {
        let dir = scratch_dir("json");
        let json = serde_json::to_string(&sample_financials()).unwrap();
        std::fs::write(dir.join("FAB.json"), json).unwrap();

        let provider = FileDataProvider::new(&dir);
        let financials = provider.fetch_financials("fab").unwrap();
        assert_eq!(financials.company_name, "Fabrikam Plc");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_fetch_missing_symbol() {
        let dir = scratch_dir("missing");
        let provider = FileDataProvider::new(&dir);
        let err = provider.fetch_financials("NOPE").unwrap_err();
        assert!(matches!(err, ValuationError::DataUnavailable(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_fetch_malformed_snapshot() {
        let dir = scratch_dir("malformed");
        std::fs::write(dir.join("BAD.json"), "{not json").unwrap();

        let provider = FileDataProvider::new(&dir);
        let err = provider.fetch_financials("BAD").unwrap_err();
        assert!(matches!(err, ValuationError::DataUnavailable(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
