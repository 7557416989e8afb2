//! Discrete urgency buckets. First matching rule wins.

use va_common::Urgency;

/// Multiplier that makes a fresh post critical.
pub const CRITICAL_MULTIPLIER: f64 = 5.0;
/// Age limit for the critical rule.
pub const CRITICAL_MAX_HOURS: f64 = 3.0;
/// Multiplier that makes a young post high.
pub const HIGH_MULTIPLIER: f64 = 3.0;
/// Age limit for the high rule.
pub const HIGH_MAX_HOURS: f64 = 6.0;

/// Classify a detection.
///
/// `Low` only comes back for posts below `spike_threshold`; a low result
/// does not on its own mean "not a spike".
pub fn classify(
    velocity_multiplier: f64,
    hours_since_post: f64,
    acceleration: f64,
    spike_threshold: f64,
) -> Urgency {
    if velocity_multiplier >= CRITICAL_MULTIPLIER && hours_since_post <= CRITICAL_MAX_HOURS {
        Urgency::Critical
    } else if velocity_multiplier >= HIGH_MULTIPLIER && hours_since_post <= HIGH_MAX_HOURS {
        Urgency::High
    } else if velocity_multiplier >= spike_threshold && acceleration > 0.0 {
        Urgency::High
    } else if velocity_multiplier >= spike_threshold {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}
