//! Eligibility filter and rate computation.
//!
//! A post is scorable when it has a posting timestamp, is at least half an
//! hour old, and has reached the configured minimum view count. Everything
//! else is excluded quietly; exclusion is not an error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use va_common::Post;
use va_config::DetectionConfig;

/// Why a post was not scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum Ineligible {
    /// No posting timestamp.
    MissingTimestamp,
    /// Younger than the minimum age.
    TooRecent { hours_since_post: f64 },
    /// Below the absolute view floor.
    BelowMinViews { views: u64, min_views: u64 },
}

impl std::fmt::Display for Ineligible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ineligible::MissingTimestamp => write!(f, "missing posting timestamp"),
            Ineligible::TooRecent { hours_since_post } => {
                write!(f, "too recent ({:.2}h since post)", hours_since_post)
            }
            Ineligible::BelowMinViews { views, min_views } => {
                write!(f, "{} views below minimum {}", views, min_views)
            }
        }
    }
}

/// Rates for a scorable post.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostRates {
    pub hours_since_post: f64,
    /// current views / max(baseline, 1)
    pub velocity_multiplier: f64,
    /// current views / max(hours since post, 0.5)
    pub view_velocity: f64,
}

/// Clamp a stored baseline so it can always be divided by.
///
/// Missing, zero, negative and NaN baselines all become 1.
pub fn normalize_baseline(baseline_views: Option<f64>) -> f64 {
    match baseline_views {
        Some(b) if b >= 1.0 => b,
        _ => 1.0,
    }
}

/// Decide whether `post` is scorable and compute its rates.
pub fn check(
    post: &Post,
    baseline_views: f64,
    now: DateTime<Utc>,
    config: &DetectionConfig,
) -> Result<PostRates, Ineligible> {
    let hours_since_post = post.hours_since(now).ok_or(Ineligible::MissingTimestamp)?;

    if hours_since_post < DetectionConfig::MIN_POST_AGE_HOURS {
        return Err(Ineligible::TooRecent { hours_since_post });
    }

    if post.views < config.min_views_threshold {
        return Err(Ineligible::BelowMinViews {
            views: post.views,
            min_views: config.min_views_threshold,
        });
    }

    let views = post.views as f64;
    Ok(PostRates {
        hours_since_post,
        velocity_multiplier: views / normalize_baseline(Some(baseline_views)),
        view_velocity: views / hours_since_post.max(DetectionConfig::MIN_POST_AGE_HOURS),
    })
}
