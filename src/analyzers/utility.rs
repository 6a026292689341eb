/// Rounds `value` to two decimal places for reporting.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compares two scores, falling back to `name` so ordering is total and stable.
pub fn score_then_name(a: (f64, &str), b: (f64, &str)) -> std::cmp::Ordering {
    a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1))
}
