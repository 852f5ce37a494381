//! Goodness of a raw factor value relative to a personal optimum.

/// `1 - |actual - optimal| / tolerance`, clamped to `[0, 1]`.
///
/// A non-positive (or NaN) tolerance yields 0 everywhere.
pub fn goodness(actual: f64, optimal: f64, tolerance: f64) -> f64 {
    if tolerance.is_nan() || tolerance <= 0.0 {
        return 0.0;
    }
    let v = 1.0 - (actual - optimal).abs() / tolerance;
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// Map a 1..=10 mood onto `[0, 1]`.
pub fn mood_unit(mood: f64) -> f64 {
    (mood - 1.0) / 9.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_tolerance_is_zero() {
        for tol in [0.0, -1.0, -0.0001, f64::NAN] {
            assert_eq!(goodness(5.0, 5.0, tol), 0.0);
            assert_eq!(goodness(1.0, 9.0, tol), 0.0);
        }
    }

    #[test]
    fn exact_optimum_is_one() {
        for (a, t) in [(8.0, 2.0), (0.0, 1.5), (3.3, 0.1)] {
            assert_eq!(goodness(a, a, t), 1.0);
        }
    }

    #[test]
    fn linear_falloff_and_clamp() {
        assert!((goodness(7.5, 8.0, 2.0) - 0.75).abs() < 1e-12);
        assert!((goodness(9.0, 8.0, 2.0) - 0.5).abs() < 1e-12);
        assert_eq!(goodness(12.0, 8.0, 2.0), 0.0);
    }

    #[test]
    fn mood_scale_endpoints() {
        assert_eq!(mood_unit(1.0), 0.0);
        assert_eq!(mood_unit(10.0), 1.0);
    }
}
