/// Percentage change from `old_value` to `new_value`.
///
/// A zero baseline never divides: the change is `0` when both values are zero
/// and `+100`/`-100` (by the sign of `new_value`) otherwise. Billing, cost and
/// insight views all go through this helper.
pub fn pct_change(new_value: f64, old_value: f64) -> f64 {
    if old_value == 0.0 {
        if new_value == 0.0 {
            0.0
        } else if new_value > 0.0 {
            100.0
        } else {
            -100.0
        }
    } else {
        (new_value - old_value) / old_value * 100.0
    }
}

/// Round to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
