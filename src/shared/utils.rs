//! Utility functions and helpers

/// Calculate percentage change, `0.0` when the old value cannot be divided by
pub fn calculate_percentage_change(old_value: f64, new_value: f64) -> f64 {
    if old_value <= 0.0 || !old_value.is_finite() || !new_value.is_finite() {
        return 0.0;
    }
    let pct = ((new_value - old_value) / old_value) * 100.0;
    if pct.is_finite() { pct } else { 0.0 }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Format a dollar amount with thousands separators, e.g. `$1,234.50`
pub fn format_usd(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Format a signed percentage, e.g. `+2.50%`
pub fn format_pct(value: f64) -> String {
    format!("{:+.2}%", value)
}
