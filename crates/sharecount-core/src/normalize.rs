//! Count normalization across heterogeneous numeric payloads.

use crate::value::StatValue;

/// Converts a reported value into an integer count.
///
/// Floats are truncated toward zero. Anything that is not a number, numeric
/// text included, counts as zero so one odd payload never spoils a total.
pub fn normalize_count(value: &StatValue) -> i64 {
    match value {
        StatValue::Int(count) => *count,
        StatValue::Float(count) if count.is_finite() => count.trunc() as i64,
        _ => 0,
    }
}

/// Sums normalized counts, saturating at the `i64` bounds.
pub fn sum_counts<'a>(values: impl IntoIterator<Item = &'a StatValue>) -> i64 {
    values
        .into_iter()
        .map(normalize_count)
        .fold(0_i64, i64::saturating_add)
}
