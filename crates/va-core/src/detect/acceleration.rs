//! Acceleration estimate from the snapshot series.
//!
//! Positive: views accelerating, the wave is still building.
//! Zero or negative: the wave is cresting or dying.

use va_common::Snapshot;
use va_config::DetectionConfig;
use va_math::index_slope;

/// Views-per-hour between consecutive snapshots in the recent window.
///
/// Only the last [`DetectionConfig::ACCELERATION_WINDOW`] snapshots (by
/// capture time) are used. Pairs with a non-positive time gap are dropped.
pub fn velocity_samples(snapshots: &[Snapshot]) -> Vec<f64> {
    let mut ordered: Vec<&Snapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.captured_at);

    let start = ordered
        .len()
        .saturating_sub(DetectionConfig::ACCELERATION_WINDOW);
    ordered[start..]
        .windows(2)
        .filter_map(|pair| {
            let dt_hours =
                (pair[1].captured_at - pair[0].captured_at).num_milliseconds() as f64 / 3_600_000.0;
            if dt_hours <= 0.0 {
                return None;
            }
            let dv = pair[1].views as f64 - pair[0].views as f64;
            Some(dv / dt_hours)
        })
        .collect()
}

/// Slope of the velocity samples by ordinal position.
///
/// Fewer than two samples is neutral (0.0).
pub fn estimate(snapshots: &[Snapshot]) -> f64 {
    let samples = velocity_samples(snapshots);
    if samples.len() < 2 {
        return 0.0;
    }
    index_slope(&samples)
}
