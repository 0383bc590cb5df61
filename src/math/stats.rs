//! Descriptive statistics over sales amounts.
//!
//! All functions are total: empty or too-short inputs yield `0.0` (or `None`
//! where a value is genuinely undefined) instead of NaN.

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns `None` for fewer than two values, where it is undefined.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Z-scores for every value, or `None` when the standard deviation is
/// undefined or zero.
pub fn z_scores(values: &[f64]) -> Option<Vec<f64>> {
    let std = sample_std(values)?;
    if !(std.is_finite() && std > 0.0) {
        return None;
    }
    let m = mean(values);
    Some(values.iter().map(|x| (x - m) / std).collect())
}

/// `numerator / denominator`, or `0.0` when the denominator is zero.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
