use serde_json::Value;

/// Pretty-print JSON to stdout. Decimals are already strings, so no
/// precision is lost on the way out.
pub fn print_json(value: &Value) {
    match render(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

fn render(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
