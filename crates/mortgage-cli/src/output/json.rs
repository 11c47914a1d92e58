use serde_json::Value;

/// Pretty-print JSON to stdout.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Print the plain-text report a command attached to its envelope, followed
/// by any warnings. Commands without a report fall back to JSON.
pub fn print_text(value: &Value) {
    let Some(report) = value.get("report").and_then(Value::as_str) else {
        print_json(value);
        return;
    };

    println!("{}", report);
    let warnings = value
        .get("warnings")
        .and_then(Value::as_array)
        .map(|w| w.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();
    for w in warnings {
        println!("warning: {}", w);
    }
}
