//! Score normalisation and ordering.

use std::cmp::Ordering;

/// Z-score: subtract the mean, divide by the population standard deviation.
///
/// Constant input has zero deviation and yields NaN for every element, as
/// does any input containing NaN. Empty input stays empty.
pub fn zscore(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return vec![];
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    values.iter().map(|v| (v - mean) / std).collect()
}

/// Best-first ordering of scores: higher first, NaN after every number.
///
/// NaN compares equal to NaN so that a stable sort keeps their input order.
pub fn best_first(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Stable sort of (item, score) pairs, best first.
pub fn sort_best_first<T>(scored: &mut [(T, f64)]) {
    scored.sort_by(|a, b| best_first(a.1, b.1));
}
