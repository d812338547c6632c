//! Human-readable byte counts for log and progress lines.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats `bytes` with base-1024 units, keeping at most two decimals.
///
/// `512 → "512B"`, `1536 → "1.5KB"`, `10_000_000 → "9.54MB"`. Sizes past the
/// gigabyte range stay in `GB`.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{}{}", trim_decimals(value), UNITS[unit])
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}
