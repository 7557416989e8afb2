//! Domain records shared by ingestion, detection, and alerting.
//!
//! Records are plain serde structs; the JSON shape is the dataset format
//! consumed by `va-core scan` and the payload format it emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::{AlertId, CreatorId, PostId, UserId};

fn default_true() -> bool {
    true
}

/// Urgency of a detected spike.
///
/// Variants are declared least urgent first so that the derived ordering
/// ranks `Critical` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Notable but not urgent.
    Low,
    /// Above threshold, wave flat or cresting.
    Medium,
    /// 3x+ inside six hours, or above threshold and still accelerating.
    High,
    /// 5x+ inside the first three hours.
    Critical,
}

impl Urgency {
    /// All levels, most urgent first.
    pub const ALL: &'static [Urgency] = &[
        Urgency::Critical,
        Urgency::High,
        Urgency::Medium,
        Urgency::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Critical => "critical",
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a generated alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Pending,
    Sent,
    Opened,
    ActedOn,
    Dismissed,
    Expired,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertStatus::Pending => "pending",
            AlertStatus::Sent => "sent",
            AlertStatus::Opened => "opened",
            AlertStatus::ActedOn => "acted_on",
            AlertStatus::Dismissed => "dismissed",
            AlertStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Point-in-time engagement capture for a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub post_id: PostId,
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    pub captured_at: DateTime<Utc>,
}

/// Metrics derived for a post by one evaluation pass.
///
/// Returned to the caller instead of being written onto the post, so the
/// same post can be evaluated from several threads without aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostMetrics {
    pub post_id: PostId,
    /// Views per hour since posting.
    pub view_velocity: f64,
    /// Current views over the creator baseline.
    pub velocity_multiplier: f64,
    pub hours_since_post: f64,
    pub is_spike: bool,
}

/// A single post by a tracked creator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub creator_id: CreatorId,

    /// Identifier on the source platform.
    #[serde(default)]
    pub external_id: Option<String>,

    #[serde(default)]
    pub post_url: Option<String>,

    #[serde(default)]
    pub caption: Option<String>,

    /// reel, carousel, image
    #[serde(default)]
    pub post_type: Option<String>,

    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: Option<u64>,

    /// Opaque content format label (listicle, storytime, ...).
    #[serde(default)]
    pub detected_format: Option<String>,

    /// Opaque hook label (hook_question, hook_cliffhanger, ...).
    #[serde(default)]
    pub detected_hook_type: Option<String>,

    /// Metrics from the most recent evaluation, merged by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PostMetrics>,

    /// Engagement history, ascending by capture time.
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

impl Post {
    /// Minimal post for tests and fixtures.
    pub fn new(id: PostId, creator_id: CreatorId, views: u64) -> Self {
        Post {
            id,
            creator_id,
            external_id: None,
            post_url: None,
            caption: None,
            post_type: None,
            posted_at: None,
            views,
            likes: 0,
            comments: 0,
            shares: None,
            detected_format: None,
            detected_hook_type: None,
            metrics: None,
            snapshots: Vec::new(),
        }
    }

    /// Hours elapsed between posting and `now`, if the post has a timestamp.
    pub fn hours_since(&self, now: DateTime<Utc>) -> Option<f64> {
        self.posted_at
            .map(|posted| (now - posted).num_milliseconds() as f64 / 3_600_000.0)
    }

    /// Merge metrics produced by an evaluation pass.
    ///
    /// Metrics for a different post are ignored.
    pub fn apply_metrics(&mut self, metrics: &PostMetrics) -> bool {
        if metrics.post_id != self.id {
            return false;
        }
        self.metrics = Some(*metrics);
        true
    }

    /// Whether the last merged evaluation flagged this post as a spike.
    pub fn is_spike(&self) -> bool {
        self.metrics.map(|m| m.is_spike).unwrap_or(false)
    }
}

/// A classified, scored spike for one post.
///
/// Values are kept at full precision; [`SpikeDetection::rounded`] gives
/// the precision used for reports and alert copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeDetection {
    pub post_id: PostId,
    pub velocity_multiplier: f64,
    /// Views per hour right now.
    pub view_velocity: f64,
    pub hours_since_post: f64,
    /// Positive while the wave is building, zero or negative once it crests.
    pub acceleration: f64,
    /// Hours until the wave is expected to crest.
    pub estimated_peak_hours: f64,
    pub urgency: Urgency,
    /// 0-1 confidence this is a real spike.
    pub confidence: f64,
    pub snapshot_count: usize,
    pub is_spike: bool,
}

impl SpikeDetection {
    /// Metrics to merge back into the post record.
    pub fn metrics(&self) -> PostMetrics {
        PostMetrics {
            post_id: self.post_id,
            view_velocity: self.view_velocity,
            velocity_multiplier: self.velocity_multiplier,
            hours_since_post: self.hours_since_post,
            is_spike: self.is_spike,
        }
    }

    /// Copy rounded to display precision.
    pub fn rounded(&self) -> SpikeDetection {
        SpikeDetection {
            velocity_multiplier: round_to(self.velocity_multiplier, 2),
            view_velocity: round_to(self.view_velocity, 1),
            hours_since_post: round_to(self.hours_since_post, 1),
            acceleration: round_to(self.acceleration, 3),
            estimated_peak_hours: round_to(self.estimated_peak_hours, 1),
            confidence: round_to(self.confidence, 2),
            ..self.clone()
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// A competitor or inspiration creator being monitored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: CreatorId,
    pub handle: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub follower_count: Option<u64>,

    /// Historical average views; the spike baseline.
    #[serde(default)]
    pub avg_views: Option<f64>,

    #[serde(default)]
    pub avg_likes: Option<f64>,

    #[serde(default)]
    pub avg_comments: Option<f64>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub last_scraped_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub posts: Vec<Post>,
}

/// A user's content positioning, used to personalise alert copy and drafts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPillars {
    #[serde(default)]
    pub primary_narrative: Option<String>,
    /// `None` when the user never set topics; drafts then use a generic topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

/// An account tracking creators and receiving alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,

    #[serde(default)]
    pub instagram_handle: Option<String>,

    #[serde(default)]
    pub content_pillars: Option<ContentPillars>,

    #[serde(default)]
    pub niche_tags: Vec<String>,

    #[serde(default)]
    pub push_token: Option<String>,

    #[serde(default = "default_true")]
    pub notification_enabled: bool,

    #[serde(default)]
    pub creators: Vec<Creator>,
}

/// A ready-to-film draft derived from a trending post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftContent {
    pub hook: String,
    pub visual_beats: Vec<String>,
    #[serde(default)]
    pub caption_draft: Option<String>,
    pub format_breakdown: String,
    pub adaptation_notes: String,
    pub cta: String,
    pub rationale: String,
    pub estimated_production_time: String,
}

/// A push-ready alert generated from a spike detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub user_id: UserId,
    pub post_id: PostId,
    pub creator_handle: String,

    pub velocity_multiplier: f64,
    pub views_at_detection: u64,
    pub hours_since_post: f64,
    #[serde(default)]
    pub detected_format: Option<String>,

    pub headline: String,
    pub body: String,
    #[serde(default)]
    pub draft: Option<DraftContent>,

    pub urgency: Urgency,
    #[serde(default)]
    pub status: AlertStatus,

    /// Estimated window before the wave peaks.
    #[serde(default)]
    pub estimated_peak_hours: Option<f64>,

    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub opened_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn detection() -> SpikeDetection {
        SpikeDetection {
            post_id: PostId(9),
            velocity_multiplier: 3.14159,
            view_velocity: 1234.567,
            hours_since_post: 2.349,
            acceleration: -0.12345,
            estimated_peak_hours: 0.0,
            urgency: Urgency::High,
            confidence: 0.6666,
            snapshot_count: 3,
            is_spike: true,
        }
    }

    #[test]
    fn test_urgency_ordering() {
        assert!(Urgency::Critical > Urgency::High);
        assert!(Urgency::High > Urgency::Medium);
        assert!(Urgency::Medium > Urgency::Low);
        assert_eq!(Urgency::ALL[0], Urgency::Critical);
    }

    #[test]
    fn test_urgency_serialization() {
        assert_eq!(serde_json::to_string(&Urgency::Critical).unwrap(), "\"critical\"");
        let parsed: Urgency = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, Urgency::Medium);
    }

    #[test]
    fn test_alert_status_serialization() {
        assert_eq!(serde_json::to_string(&AlertStatus::ActedOn).unwrap(), "\"acted_on\"");
        assert_eq!(AlertStatus::default(), AlertStatus::Pending);
    }

    #[test]
    fn test_rounded_precision() {
        let r = detection().rounded();
        assert_eq!(r.velocity_multiplier, 3.14);
        assert_eq!(r.view_velocity, 1234.6);
        assert_eq!(r.hours_since_post, 2.3);
        assert_eq!(r.acceleration, -0.123);
        assert_eq!(r.confidence, 0.67);
        assert_eq!(r.urgency, Urgency::High);
    }

    #[test]
    fn test_metrics_roundtrip_into_post() {
        let d = detection();
        let mut post = Post::new(PostId(9), CreatorId(1), 5000);
        assert!(!post.is_spike());
        assert!(post.apply_metrics(&d.metrics()));
        assert!(post.is_spike());
        assert_eq!(post.metrics.unwrap().velocity_multiplier, d.velocity_multiplier);
    }

    #[test]
    fn test_apply_metrics_ignores_other_post() {
        let mut post = Post::new(PostId(1), CreatorId(1), 5000);
        assert!(!post.apply_metrics(&detection().metrics()));
        assert!(post.metrics.is_none());
    }

    #[test]
    fn test_hours_since() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut post = Post::new(PostId(1), CreatorId(1), 0);
        assert!(post.hours_since(now).is_none());
        post.posted_at = Some(now - Duration::minutes(90));
        assert!((post.hours_since(now).unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_creator_defaults_from_json() {
        let creator: Creator =
            serde_json::from_str(r#"{"id": 3, "handle": "cs.to.ceo"}"#).unwrap();
        assert!(creator.is_active);
        assert!(creator.avg_views.is_none());
        assert!(creator.posts.is_empty());
    }
}
