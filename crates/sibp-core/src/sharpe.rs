//! Annualized Sharpe-ratio calculator.
//!
//! Pure and deterministic: both proving strategies call this with the raw,
//! unnormalized returns so the reported statistic never depends on the
//! quantized circuit input.

/// Trading days per year used for annualization.
pub const ANNUALIZATION_FACTOR: f64 = 252.0;

/// Standard deviations below this are treated as zero to avoid
/// division-by-near-zero blowups.
pub const MIN_STD: f64 = 1e-8;

/// Compute the annualized Sharpe ratio of a daily-returns series.
///
/// Returns exactly `0.0` when fewer than 2 values are supplied or when the
/// population standard deviation is below [`MIN_STD`] (a single-point ratio
/// is statistically meaningless). Otherwise
/// `mean / std * sqrt(ANNUALIZATION_FACTOR)`.
#[must_use]
pub fn compute_sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if std < MIN_STD {
        return 0.0;
    }
    mean / std * ANNUALIZATION_FACTOR.sqrt()
}

/// Round to `dp` decimal places (used for the wire representation of the
/// statistic and the proving time).
#[inline]
#[must_use]
pub fn round_dp(x: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (x * factor).round() / factor
}
