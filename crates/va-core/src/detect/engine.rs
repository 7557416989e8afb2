//! Velocity engine: per-post evaluation and creator-level ranking.
//!
//! The engine is pure. It never writes to the posts it reads; callers merge
//! [`SpikeDetection::metrics`] back into their own records.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, trace};
use va_common::{Post, PostMetrics, SpikeDetection};
use va_config::DetectionConfig;

use super::eligibility::{self, Ineligible};
use super::{acceleration, confidence, peak, urgency};

/// Posts skipped during a creator analysis, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionCounts {
    pub missing_timestamp: usize,
    pub outside_window: usize,
    pub too_recent: usize,
    pub below_min_views: usize,
    /// Scored but below the spike threshold.
    pub below_threshold: usize,
}

impl ExclusionCounts {
    fn record(&mut self, reason: &Ineligible) {
        match reason {
            Ineligible::MissingTimestamp => self.missing_timestamp += 1,
            Ineligible::TooRecent { .. } => self.too_recent += 1,
            Ineligible::BelowMinViews { .. } => self.below_min_views += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_timestamp
            + self.outside_window
            + self.too_recent
            + self.below_min_views
            + self.below_threshold
    }
}

/// Full result of a creator analysis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreatorAnalysis {
    /// Spikes, highest multiplier first.
    pub spikes: Vec<SpikeDetection>,
    /// Derived metrics for every scored post, spike or not.
    pub metrics: Vec<PostMetrics>,
    pub posts_in_window: usize,
    pub excluded: ExclusionCounts,
}

/// Stateless spike detector bound to one detection config.
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityEngine {
    config: DetectionConfig,
}

impl VelocityEngine {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Score one post, or say why it was skipped.
    pub fn assess_post(
        &self,
        post: &Post,
        baseline_views: f64,
        now: DateTime<Utc>,
    ) -> Result<SpikeDetection, Ineligible> {
        let rates = eligibility::check(post, baseline_views, now, &self.config)?;

        let accel = acceleration::estimate(&post.snapshots);
        let estimated_peak_hours =
            peak::estimate_hours(rates.velocity_multiplier, accel, rates.hours_since_post);
        let urgency = urgency::classify(
            rates.velocity_multiplier,
            rates.hours_since_post,
            accel,
            self.config.spike_threshold,
        );
        let confidence = confidence::score(
            post.snapshots.len(),
            rates.velocity_multiplier,
            rates.hours_since_post,
        );

        Ok(SpikeDetection {
            post_id: post.id,
            velocity_multiplier: rates.velocity_multiplier,
            view_velocity: rates.view_velocity,
            hours_since_post: rates.hours_since_post,
            acceleration: accel,
            estimated_peak_hours,
            urgency,
            confidence,
            snapshot_count: post.snapshots.len(),
            is_spike: self.is_spike(rates.velocity_multiplier),
        })
    }

    /// Score one post against a baseline.
    ///
    /// `None` when the post is not scorable. Sub-threshold posts still
    /// produce a detection with `is_spike == false`.
    pub fn evaluate_post(
        &self,
        post: &Post,
        baseline_views: f64,
        now: DateTime<Utc>,
    ) -> Option<SpikeDetection> {
        match self.assess_post(post, baseline_views, now) {
            Ok(detection) => Some(detection),
            Err(reason) => {
                trace!(post_id = %post.id, reason = %reason, "post not scorable");
                None
            }
        }
    }

    /// Spikes among a creator's recent posts, highest multiplier first.
    pub fn analyze_creator(
        &self,
        baseline_views: f64,
        posts: &[Post],
        now: DateTime<Utc>,
    ) -> Vec<SpikeDetection> {
        self.analyze_creator_detailed(baseline_views, posts, now)
            .spikes
    }

    /// Like [`analyze_creator`](Self::analyze_creator), keeping metrics for
    /// every scored post and counts for every skipped one.
    pub fn analyze_creator_detailed(
        &self,
        baseline_views: f64,
        posts: &[Post],
        now: DateTime<Utc>,
    ) -> CreatorAnalysis {
        let cutoff = recency_cutoff(now);
        let mut analysis = CreatorAnalysis::default();

        let mut candidates: Vec<&Post> = Vec::with_capacity(posts.len());
        for post in posts {
            match post.posted_at {
                None => analysis.excluded.missing_timestamp += 1,
                Some(posted) if posted < cutoff => analysis.excluded.outside_window += 1,
                Some(_) => candidates.push(post),
            }
        }
        // Newest first, so equal multipliers rank the fresher post higher.
        candidates.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        analysis.posts_in_window = candidates.len();

        for post in candidates {
            match self.assess_post(post, baseline_views, now) {
                Ok(detection) => {
                    analysis.metrics.push(detection.metrics());
                    if detection.velocity_multiplier >= self.config.spike_threshold {
                        debug!(
                            post_id = %detection.post_id,
                            multiplier = detection.velocity_multiplier,
                            urgency = %detection.urgency,
                            "spike detected"
                        );
                        analysis.spikes.push(detection);
                    } else {
                        analysis.excluded.below_threshold += 1;
                    }
                }
                Err(reason) => {
                    trace!(post_id = %post.id, reason = %reason, "post not scorable");
                    analysis.excluded.record(&reason);
                }
            }
        }

        analysis
            .spikes
            .sort_by(|a, b| b.velocity_multiplier.total_cmp(&a.velocity_multiplier));
        analysis
    }

    fn is_spike(&self, velocity_multiplier: f64) -> bool {
        velocity_multiplier >= self.config.spike_threshold
    }
}

/// Oldest posting time still inside the creator analysis window.
pub fn recency_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    let window_ms = (DetectionConfig::RECENCY_WINDOW_HOURS * 3_600_000.0) as i64;
    now - Duration::milliseconds(window_ms)
}

/// Score one post with an explicit config.
pub fn evaluate_post(
    config: &DetectionConfig,
    post: &Post,
    baseline_views: f64,
    now: DateTime<Utc>,
) -> Option<SpikeDetection> {
    VelocityEngine::new(*config).evaluate_post(post, baseline_views, now)
}

/// Rank a creator's spikes with an explicit config.
pub fn analyze_creator(
    config: &DetectionConfig,
    baseline_views: f64,
    posts: &[Post],
    now: DateTime<Utc>,
) -> Vec<SpikeDetection> {
    VelocityEngine::new(*config).analyze_creator(baseline_views, posts, now)
}
