//! Property-based tests for velocity engine invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use va_common::{CreatorId, Post, PostId, Snapshot};
use va_config::DetectionConfig;
use va_core::detect::{acceleration, confidence, peak, VelocityEngine};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap()
}

fn post(id: u64, views: u64, age_minutes: i64) -> Post {
    let mut p = Post::new(PostId(id), CreatorId(1), views);
    p.posted_at = Some(now() - Duration::minutes(age_minutes));
    p
}

fn snapshots(id: u64, points: &[(i64, u64)]) -> Vec<Snapshot> {
    points
        .iter()
        .map(|&(minute, views)| Snapshot {
            post_id: PostId(id),
            views,
            likes: 0,
            comments: 0,
            captured_at: now() - Duration::minutes(minute),
        })
        .collect()
}

fn arb_post() -> impl Strategy<Value = Post> {
    (
        1u64..1_000,
        0u64..2_000_000,
        0i64..(80 * 60),
        prop::collection::vec((0i64..(72 * 60), 0u64..2_000_000), 0..8),
    )
        .prop_map(|(id, views, age, points)| {
            let mut p = post(id, views, age);
            p.snapshots = snapshots(id, &points);
            p
        })
}

fn arb_config() -> impl Strategy<Value = DetectionConfig> {
    (0.5f64..10.0, 0u64..20_000).prop_map(|(t, v)| DetectionConfig::new(t, v))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn multiplier_is_views_over_clamped_baseline(
        p in arb_post(),
        baseline in -100.0f64..1.0e6,
    ) {
        let engine = VelocityEngine::new(DetectionConfig::new(2.5, 0));
        if let Some(d) = engine.evaluate_post(&p, baseline, now()) {
            let expected = p.views as f64 / baseline.max(1.0);
            prop_assert!(d.velocity_multiplier >= 0.0);
            prop_assert!((d.velocity_multiplier - expected).abs() <= 1e-9 * expected.max(1.0));
        }
    }

    #[test]
    fn scored_posts_are_old_enough_and_large_enough(
        p in arb_post(),
        config in arb_config(),
        baseline in 0.0f64..1.0e5,
    ) {
        let engine = VelocityEngine::new(config);
        if let Some(d) = engine.evaluate_post(&p, baseline, now()) {
            prop_assert!(d.hours_since_post >= DetectionConfig::MIN_POST_AGE_HOURS);
            prop_assert!(p.views >= config.min_views_threshold);
        }
    }

    #[test]
    fn bounded_outputs(
        p in arb_post(),
        baseline in 0.0f64..1.0e5,
    ) {
        let engine = VelocityEngine::new(DetectionConfig::new(2.5, 0));
        if let Some(d) = engine.evaluate_post(&p, baseline, now()) {
            prop_assert!((0.0..=1.0).contains(&d.confidence));
            prop_assert!(d.estimated_peak_hours >= 0.0);
            if d.acceleration > 0.0 {
                prop_assert!(d.estimated_peak_hours >= 0.5);
            }
            prop_assert!(d.acceleration.is_finite());
        }
    }

    #[test]
    fn analyze_output_sorted_and_above_threshold(
        posts in prop::collection::vec(arb_post(), 0..12),
        config in arb_config(),
        baseline in 0.0f64..1.0e5,
    ) {
        let engine = VelocityEngine::new(config);
        let spikes = engine.analyze_creator(baseline, &posts, now());
        for d in &spikes {
            prop_assert!(d.velocity_multiplier >= config.spike_threshold);
            prop_assert!(d.is_spike);
        }
        for pair in spikes.windows(2) {
            prop_assert!(pair[0].velocity_multiplier >= pair[1].velocity_multiplier);
        }
    }

    #[test]
    fn analyze_is_deterministic(
        posts in prop::collection::vec(arb_post(), 0..12),
        baseline in 0.0f64..1.0e5,
    ) {
        let engine = VelocityEngine::default();
        let first = engine.analyze_creator(baseline, &posts, now());
        let second = engine.analyze_creator(baseline, &posts, now());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn confidence_in_unit_interval(
        n in 0usize..50,
        m in -10.0f64..1.0e4,
        h in 0.0f64..500.0,
    ) {
        let c = confidence::score(n, m, h);
        prop_assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn peak_never_negative(
        m in 0.0f64..1.0e4,
        accel in -1.0e7f64..1.0e7,
        h in 0.5f64..72.0,
    ) {
        let hours = peak::estimate_hours(m, accel, h);
        prop_assert!(hours >= 0.0);
        if accel > 0.0 {
            prop_assert!(hours >= 0.5);
        }
    }

    /// Snapshots that all share one capture time give no usable velocity.
    #[test]
    fn simultaneous_snapshots_have_no_trend(
        views in prop::collection::vec(0u64..1_000_000, 0..6),
    ) {
        let points: Vec<(i64, u64)> = views.iter().map(|&v| (30, v)).collect();
        let snaps = snapshots(1, &points);
        prop_assert!(acceleration::velocity_samples(&snaps).is_empty());
        prop_assert_eq!(acceleration::estimate(&snaps), 0.0);
    }
}
