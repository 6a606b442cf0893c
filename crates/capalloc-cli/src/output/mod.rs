pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Print a command result in the requested format.
///
/// Commands hand back either an envelope (`result`, `warnings`, ...), a flat
/// object, or an array of portfolio / allocation rows; each printer handles
/// all three shapes.
pub fn print_output(format: &OutputFormat, value: &Value) {
    let print: fn(&Value) = match format {
        OutputFormat::Json => json::print_json,
        OutputFormat::Table => table::print_table,
        OutputFormat::Csv => csv_out::print_csv,
        OutputFormat::Minimal => minimal::print_minimal,
    };
    print(value);
}
