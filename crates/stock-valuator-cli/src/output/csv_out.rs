use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// Valuation payloads emit one record per forecast row plus the terminal
/// value; other payloads fall back to field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.get("result").unwrap_or(value);

    if let Some(Value::Array(rows)) = result.get("forecast_table") {
        let _ = wtr.write_record([
            "year",
            "free_cash_flow",
            "discount_factor",
            "discounted_fcf",
            "is_estimate",
        ]);

        for row in rows {
            let _ = wtr.write_record([
                field(row, "year"),
                field(row, "free_cash_flow"),
                field(row, "discount_factor"),
                field(row, "discounted_fcf"),
                field(row, "is_estimate"),
            ]);
        }

        if let Some(tv) = result.get("terminal_value") {
            let _ = wtr.write_record([
                "terminal".to_string(),
                field(tv, "undiscounted"),
                String::new(),
                field(tv, "discounted"),
                "true".to_string(),
            ]);
        }
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
        }
    } else {
        let _ = wtr.write_record([&format_csv_value(result)]);
    }

    let _ = wtr.flush();
}

fn field(obj: &Value, key: &str) -> String {
    obj.get(key).map(format_csv_value).unwrap_or_default()
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
