//! Currency arithmetic helpers. Amounts are `f64` in major units, rounded to
//! cents at every step that produces a reported figure.

/// Continuity tolerance between adjacent ledger rows.
pub const BALANCE_EPSILON: f64 = 0.01;

/// Tolerance when matching an extracted amount token against a balance delta.
pub const MATCH_TOLERANCE: f64 = 0.05;

/// Round to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // normalize -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// `|a - b| <= tolerance`, with a tiny slack for binary float noise.
pub fn within(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance + 1e-9
}
