use colored::Colorize;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
///
/// Valuation payloads get the full forecast-table rendering; anything else
/// falls back to a generic field/value listing.
pub fn print_table(value: &Value) {
    if let Some(result) = value.get("result") {
        if result.get("forecast_table").is_some() {
            print_valuation(value, result);
        } else {
            print_fields(result);
            print_envelope_footer(value);
        }
        return;
    }
    print_fields(value);
}

fn print_valuation(envelope: &Value, result: &Value) {
    let mut builder = Builder::default();
    builder.push_record(["Year", "Free Cash Flow", "Discount Factor", "Discounted FCF"]);

    if let Some(Value::Array(rows)) = result.get("forecast_table") {
        for row in rows {
            let estimate = row
                .get("is_estimate")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let year = row
                .get("year")
                .and_then(Value::as_i64)
                .map(|y| {
                    // Projected years are labelled as estimates
                    if estimate {
                        format!("{y}e")
                    } else {
                        y.to_string()
                    }
                })
                .unwrap_or_default();

            builder.push_record([
                year,
                money_cell(row.get("free_cash_flow")),
                money_cell(row.get("discount_factor")),
                money_cell(row.get("discounted_fcf")),
            ]);
        }
    }

    if let Some(tv) = result.get("terminal_value") {
        builder.push_record([
            "Terminal".to_string(),
            money_cell(tv.get("undiscounted")),
            money_cell(tv.get("discounted_fcf_at_horizon")),
            money_cell(tv.get("discounted")),
        ]);
    }

    println!("{}", Table::from(builder));

    print_summary(envelope, result);
    print_envelope_footer(envelope);
}

fn print_summary(envelope: &Value, result: &Value) {
    let name = envelope
        .get("company")
        .and_then(|c| c.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("The company");
    let currency = envelope
        .get("company")
        .and_then(|c| c.get("currency"))
        .and_then(Value::as_str)
        .unwrap_or("");

    let fair = money_cell(result.get("fair_value_per_share"));
    let market = money_cell(result.get("market_price"));

    println!(
        "\nThe intrinsic / fair value of {name} is {fair} {currency} and the \
         current share price is {market} {currency}"
    );

    let deviation = parse_decimal(result.get("deviation_fraction")).unwrap_or_default();
    let pct = (deviation * dec!(100)).round_dp(0);
    let verdict = match result.get("price_level").and_then(Value::as_str) {
        Some("Overvalued") => "overvalued".red().bold(),
        _ => "undervalued".green().bold(),
    };
    println!("{name} is {pct}% {verdict}!");
}

fn print_envelope_footer(envelope: &Value) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_fields(value: &Value) {
    let Value::Object(map) = value else {
        println!("{}", value);
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &cell(val)]);
    }
    println!("{}", Table::from(builder));
}

/// Render a numeric cell with two decimals and thousands separators.
fn money_cell(value: Option<&Value>) -> String {
    match value.and_then(|v| parse_decimal(Some(v))) {
        Some(d) => group_thousands(&d.round_dp(2).to_string()),
        None => cell(value.unwrap_or(&Value::Null)),
    }
}

fn parse_decimal(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn group_thousands(raw: &str) -> String {
    let (sign, rest) = raw.strip_prefix('-').map_or(("", raw), |r| ("-", r));
    let (int_part, frac_part) = rest.split_once('.').unwrap_or((rest, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac_part.is_empty() {
        format!("{sign}{grouped}.00")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("2731.82"), "2,731.82");
        assert_eq!(group_thousands("-59500000000.00"), "-59,500,000,000.00");
        assert_eq!(group_thousands("103"), "103.00");
        assert_eq!(group_thousands("1.07"), "1.07");
    }

    #[test]
    fn test_parse_decimal_from_string() {
        let v = Value::String("106.09".into());
        assert_eq!(parse_decimal(Some(&v)), Some("106.09".parse().unwrap()));
    }
}
