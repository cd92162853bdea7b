// src/reshape/parse.rs

/// Trim whitespace and strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Coerce a raw population cell to a number.
///
/// Accepts thousands separators (`1,234,567`). Empty, non-numeric,
/// non-finite and negative cells are missing.
pub fn parse_population(raw: &str) -> Option<f64> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() {
        return None;
    }

    let digits: String = cleaned.chars().filter(|c| *c != ',').collect();
    let value: f64 = digits.parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}
