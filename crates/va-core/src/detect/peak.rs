//! Peak-window heuristic.
//!
//! Not a fitted model. The constants are part of the alert contract and
//! must stay stable so alert copy is comparable across releases.

/// Hours until the wave is expected to crest.
///
/// Decelerating or flat waves have probably crested already and get a short
/// shrinking window floored at 0. Accelerating waves get a longer window
/// that scales with the multiplier, floored at 0.5.
pub fn estimate_hours(velocity_multiplier: f64, acceleration: f64, hours_since_post: f64) -> f64 {
    if !(acceleration > 0.0) {
        return (2.0 - hours_since_post * 0.5).max(0.0);
    }

    let base_peak = 6.0 + velocity_multiplier.max(1.0).ln() * 4.0;
    let accel_factor = (acceleration / 1000.0).min(2.0);
    (base_peak * (1.0 + accel_factor * 0.3) - hours_since_post).max(0.5)
}
