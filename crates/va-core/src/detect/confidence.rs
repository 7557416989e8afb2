//! Confidence scoring.
//!
//! A weighted blend of three unit-clamped terms:
//! data volume (snapshot count), signal strength (lift over baseline) and
//! elapsed time. Each term saturates, so the blend stays in [0, 1].

use serde::Serialize;
use va_math::{unit_ratio, weighted_unit_blend};

pub const DATA_WEIGHT: f64 = 0.4;
pub const SIGNAL_WEIGHT: f64 = 0.4;
pub const TIME_WEIGHT: f64 = 0.2;

/// Snapshot count at which the data term saturates.
pub const DATA_SATURATION: f64 = 5.0;
/// Lift above 1x at which the signal term saturates (multiplier 6).
pub const SIGNAL_SATURATION: f64 = 5.0;
/// Post age at which the time term saturates.
pub const TIME_SATURATION_HOURS: f64 = 3.0;

/// Per-term confidence, for reports and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceBreakdown {
    pub data_confidence: f64,
    pub signal_strength: f64,
    pub time_confidence: f64,
    pub confidence: f64,
}

/// Score every term and the final blend.
pub fn breakdown(
    snapshot_count: usize,
    velocity_multiplier: f64,
    hours_since_post: f64,
) -> ConfidenceBreakdown {
    let data_confidence = unit_ratio(snapshot_count as f64, DATA_SATURATION);
    let signal_strength = unit_ratio(velocity_multiplier - 1.0, SIGNAL_SATURATION);
    let time_confidence = unit_ratio(hours_since_post, TIME_SATURATION_HOURS);

    let confidence = weighted_unit_blend(&[
        (DATA_WEIGHT, data_confidence),
        (SIGNAL_WEIGHT, signal_strength),
        (TIME_WEIGHT, time_confidence),
    ]);

    ConfidenceBreakdown {
        data_confidence,
        signal_strength,
        time_confidence,
        confidence,
    }
}

/// Final confidence only.
pub fn score(snapshot_count: usize, velocity_multiplier: f64, hours_since_post: f64) -> f64 {
    breakdown(snapshot_count, velocity_multiplier, hours_since_post).confidence
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturated() {
        let b = breakdown(9, 10.0, 12.0);
        assert_eq!(b.data_confidence, 1.0);
        assert_eq!(b.signal_strength, 1.0);
        assert_eq!(b.time_confidence, 1.0);
        assert!((b.confidence - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_snapshot_data_term() {
        let b = breakdown(1, 2.5, 2.0);
        assert_eq!(b.data_confidence, 0.2);
    }

    #[test]
    fn test_floor_inputs_stay_in_range() {
        let b = breakdown(0, 1.0, 0.5);
        assert_eq!(b.data_confidence, 0.0);
        assert_eq!(b.signal_strength, 0.0);
        assert!((b.confidence - 0.2 * (0.5 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_sub_unit_multiplier_does_not_go_negative() {
        let b = breakdown(0, 0.2, 0.5);
        assert_eq!(b.signal_strength, 0.0);
        assert!(b.confidence >= 0.0);
    }

    #[test]
    fn test_weighted_blend() {
        // 0.4*0.6 + 0.4*0.5 + 0.2*(2/3)
        let c = score(3, 3.5, 2.0);
        assert!((c - (0.24 + 0.2 + 0.2 * 2.0 / 3.0)).abs() < 1e-12);
    }
}
