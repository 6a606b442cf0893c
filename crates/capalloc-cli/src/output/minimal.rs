use serde_json::Value;

/// Result fields worth printing alone, most important first.
const PRIORITY_KEYS: [&str; 4] = ["recommendation", "allocations", "roe", "risk"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal(value));
}

fn minimal(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                match map.get(key) {
                    Some(val) if !val.is_null() => return format_minimal(val),
                    _ => {}
                }
            }
            match map.iter().next() {
                Some((key, val)) => format!("{}: {}", key, format_minimal(val)),
                None => String::new(),
            }
        }
        // Row views: the count is the answer.
        Value::Array(rows) => format!("{} rows", rows.len()),
        other => format_minimal(other),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recommendation_first() {
        let v = json!({"result": {"status": "recommended", "recommendation": "Taux 50% | Cash 50%", "roe": "0.03"}});
        assert_eq!(minimal(&v), "Taux 50% | Cash 50%");
    }

    #[test]
    fn test_grid_count() {
        let v = json!({"step": 10, "allocations": 1001, "candidates": 161051});
        assert_eq!(minimal(&v), "1001");
    }

    #[test]
    fn test_rows() {
        assert_eq!(minimal(&json!([{"Taux": 100}, {"Cash": 100}])), "2 rows");
    }
}
