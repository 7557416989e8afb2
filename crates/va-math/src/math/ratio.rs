//! Saturating ratios for bounded scores.

/// Clamp a value into [0, 1]. NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// `numerator / scale`, saturating at 1 and floored at 0.
///
/// A non-positive scale yields 0.
pub fn unit_ratio(numerator: f64, scale: f64) -> f64 {
    if scale <= 0.0 || scale.is_nan() {
        return 0.0;
    }
    clamp_unit(numerator / scale)
}

/// Weighted sum of unit-interval terms.
///
/// Each term is clamped to [0, 1] before weighting and the total is
/// clamped again, so the result stays in [0, 1] whenever the weights sum
/// to at most 1.
pub fn weighted_unit_blend(terms: &[(f64, f64)]) -> f64 {
    let total: f64 = terms
        .iter()
        .map(|(weight, value)| weight * clamp_unit(*value))
        .sum();
    clamp_unit(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(0.25), 0.25);
        assert_eq!(clamp_unit(7.0), 1.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }

    #[test]
    fn test_unit_ratio_saturates() {
        assert_eq!(unit_ratio(1.0, 5.0), 0.2);
        assert_eq!(unit_ratio(5.0, 5.0), 1.0);
        assert_eq!(unit_ratio(12.0, 5.0), 1.0);
        assert_eq!(unit_ratio(-1.0, 5.0), 0.0);
        assert_eq!(unit_ratio(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_weighted_unit_blend() {
        let v = weighted_unit_blend(&[(0.4, 1.0), (0.4, 0.5), (0.2, 0.0)]);
        assert!((v - 0.6).abs() < 1e-12);
        let clamped = weighted_unit_blend(&[(0.4, 3.0), (0.4, -2.0), (0.2, 1.0)]);
        assert!((clamped - 0.6).abs() < 1e-12);
    }
}
