//! Recency blending over `[today, yesterday, 2 days ago, ...]`.

use crate::config::MissingDayPolicy;

/// Weighted mean of `values` against positional `weights`.
///
/// `None` marks a day without data. Under [`MissingDayPolicy::AsZero`] it
/// contributes 0 while its weight still counts toward the divisor, so a
/// missing day scores like the worst possible value. Under
/// [`MissingDayPolicy::Renormalize`] it is skipped entirely.
///
/// Only the first `min(values.len(), weights.len())` positions are used; the
/// divisor is the sum of weights actually applied. No applied weight → 0.
pub fn lag_blend(values: &[Option<f64>], weights: &[f64], policy: MissingDayPolicy) -> f64 {
    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for (v, w) in values.iter().zip(weights) {
        match (v, policy) {
            (Some(v), _) => {
                total += v * w;
                weight_sum += w;
            }
            (None, MissingDayPolicy::AsZero) => weight_sum += w,
            (None, MissingDayPolicy::Renormalize) => {}
        }
    }
    if weight_sum > 0.0 {
        total / weight_sum
    } else {
        0.0
    }
}
