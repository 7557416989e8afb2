//! Creator baselines.
//!
//! The baseline is the denominator of every velocity multiplier. It is
//! owned by the creator record; this module only reads it, or recomputes
//! it from the creator's latest posts when the stored value is unusable.

use va_common::{Creator, Post};
use va_config::ScanConfig;

/// Mean views over the `limit` most recently posted posts.
///
/// Posts without a timestamp sort last. `None` when there is nothing to
/// average.
pub fn average_views(posts: &[Post], limit: usize) -> Option<f64> {
    if limit == 0 {
        return None;
    }
    let mut recent: Vec<&Post> = posts.iter().collect();
    recent.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
    recent.truncate(limit);
    if recent.is_empty() {
        return None;
    }
    let total: f64 = recent.iter().map(|p| p.views as f64).sum();
    Some(total / recent.len() as f64)
}

/// Baseline to score a creator against. Always at least 1.
///
/// Prefers the stored average, then a fresh average over the configured
/// number of recent posts.
pub fn resolve(creator: &Creator, scan: &ScanConfig) -> f64 {
    let stored = creator.avg_views.filter(|v| v.is_finite() && *v > 0.0);
    stored
        .or_else(|| average_views(&creator.posts, scan.baseline_post_count))
        .map(|b| b.max(1.0))
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use va_common::{CreatorId, PostId};

    fn creator(avg: Option<f64>, views: &[u64]) -> Creator {
        let t0 = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        let posts = views
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut p = Post::new(PostId(i as u64 + 1), CreatorId(1), v);
                p.posted_at = Some(t0 + Duration::days(i as i64));
                p
            })
            .collect();
        Creator {
            id: CreatorId(1),
            handle: "growth.lab".to_string(),
            display_name: None,
            follower_count: None,
            avg_views: avg,
            avg_likes: None,
            avg_comments: None,
            is_active: true,
            last_scraped_at: None,
            posts,
        }
    }

    #[test]
    fn test_average_uses_most_recent() {
        let c = creator(None, &[100, 200, 300, 400]);
        // Latest two are 400 and 300.
        assert_eq!(average_views(&c.posts, 2), Some(350.0));
        assert_eq!(average_views(&c.posts, 10), Some(250.0));
    }

    #[test]
    fn test_average_empty() {
        assert_eq!(average_views(&[], 20), None);
        let c = creator(None, &[100]);
        assert_eq!(average_views(&c.posts, 0), None);
    }

    #[test]
    fn test_resolve_prefers_stored() {
        let c = creator(Some(12_000.0), &[100, 200]);
        assert_eq!(resolve(&c, &ScanConfig::default()), 12_000.0);
    }

    #[test]
    fn test_resolve_recomputes_when_missing_or_zero() {
        let scan = ScanConfig::default();
        assert_eq!(resolve(&creator(None, &[100, 300]), &scan), 200.0);
        assert_eq!(resolve(&creator(Some(0.0), &[100, 300]), &scan), 200.0);
        assert_eq!(resolve(&creator(Some(f64::NAN), &[100, 300]), &scan), 200.0);
    }

    #[test]
    fn test_resolve_never_below_one() {
        let scan = ScanConfig::default();
        assert_eq!(resolve(&creator(None, &[]), &scan), 1.0);
        assert_eq!(resolve(&creator(None, &[0, 0]), &scan), 1.0);
        assert_eq!(resolve(&creator(Some(0.25), &[]), &scan), 1.0);
    }
}
