use serde_json::Value;

/// Pulls a clean number out of a heterogeneous telemetry field.
///
/// Device firmware reports battery and temperature inconsistently: sometimes a
/// plain number, sometimes a string with a unit suffix ("34.14 c", "85%").
/// Stripping rule: keep ASCII digits, the first decimal point, and a minus sign
/// only while nothing has been kept yet. Returns `None` when the residue is
/// empty or does not parse.
pub fn extract_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => extract_numeric_text(s),
        _ => None,
    }
}

fn extract_numeric_text(text: &str) -> Option<f64> {
    let mut residue = String::new();
    let mut seen_point = false;

    for c in text.chars() {
        if c.is_ascii_digit() {
            residue.push(c);
        } else if c == '.' && !seen_point {
            seen_point = true;
            residue.push(c);
        } else if c == '-' && residue.is_empty() {
            residue.push(c);
        }
    }

    residue.parse::<f64>().ok()
}

/// Round to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
