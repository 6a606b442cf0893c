use colored::Colorize;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

/// Fields holding fractional rates; shown as percentages.
const RATE_FIELDS: [&str; 7] = [
    "roe",
    "risk",
    "guaranteed_yield",
    "min_roe",
    "max_roe",
    "min_risk",
    "max_risk",
];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    println!("{}", render(value));

    if let Value::Object(envelope) = value {
        print_notes(envelope);
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => field_table(result),
            _ => field_table(map),
        },
        Value::Array(rows) => row_table(rows),
        _ => value.to_string(),
    }
}

fn print_notes(envelope: &Map<String, Value>) {
    let none_admissible = envelope
        .get("result")
        .and_then(|r| r.get("status"))
        .and_then(Value::as_str)
        == Some("none_admissible");
    if none_admissible {
        println!(
            "\n{}",
            "No allocation meets both thresholds; lower them or refine the step."
                .yellow()
                .bold()
        );
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn field_table(map: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_cell(key, val)]);
    }
    Table::from(builder).to_string()
}

fn row_table(rows: &[Value]) -> String {
    let headers: Vec<String> = match rows.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        Some(_) => {
            return rows
                .iter()
                .map(|v| format_cell("", v))
                .collect::<Vec<_>>()
                .join("\n")
        }
        None => return "(no portfolios)".to_string(),
    };

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h).map(|v| format_cell(h, v)).unwrap_or_default())
            .collect();
        builder.push_record(cells);
    }
    Table::from(builder).to_string()
}

fn format_cell(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) if RATE_FIELDS.contains(&key) => as_percent(s),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr
            .iter()
            .map(|v| format_cell("", v))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// "0.03085" -> "3.085%"; anything unparsable is passed through.
fn as_percent(s: &str) -> String {
    match Decimal::from_str(s) {
        Ok(d) => format!("{}%", (d * Decimal::ONE_HUNDRED).round_dp(4).normalize()),
        Err(_) => s.to_string(),
    }
}
