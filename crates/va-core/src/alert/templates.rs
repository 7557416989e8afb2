//! Alert copy.
//!
//! Headline and body are picked by urgency. Numbers are rendered from the
//! display-rounded detection so the copy matches what reports show.

use chrono::{DateTime, Utc};
use va_common::{Alert, AlertId, AlertStatus, Creator, Post, SpikeDetection, Urgency, UserProfile};

use super::draft::fallback_draft;

const DEFAULT_CREATOR: &str = "A creator";
const DEFAULT_FORMAT: &str = "content";
const DEFAULT_NARRATIVE: &str = "your content";

/// Values substituted into the templates.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateVars {
    pub creator: String,
    pub views: u64,
    pub hours: f64,
    pub multiplier: f64,
    pub format: String,
    pub peak_hours: f64,
    pub narrative: String,
}

impl TemplateVars {
    pub fn new(
        user: &UserProfile,
        creator: &Creator,
        post: &Post,
        detection: &SpikeDetection,
    ) -> Self {
        let shown = detection.rounded();
        let creator_name = if creator.handle.trim().is_empty() {
            DEFAULT_CREATOR.to_string()
        } else {
            creator.handle.clone()
        };
        let narrative = user
            .content_pillars
            .as_ref()
            .and_then(|p| p.primary_narrative.clone())
            .unwrap_or_else(|| DEFAULT_NARRATIVE.to_string());

        TemplateVars {
            creator: creator_name,
            views: post.views,
            hours: shown.hours_since_post,
            multiplier: shown.velocity_multiplier,
            format: post
                .detected_format
                .clone()
                .unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
            peak_hours: shown.estimated_peak_hours,
            narrative,
        }
    }
}

pub fn headline(urgency: Urgency, v: &TemplateVars) -> String {
    match urgency {
        Urgency::Critical => format!(
            "{} just hit {} views in {:.0}h. Your draft is ready — tap to ride this wave before it peaks.",
            v.creator,
            thousands(v.views),
            v.hours
        ),
        Urgency::High => format!(
            "{} is at {:.1}x their average using a {} format. I already rewrote it for your pillars. Open your draft.",
            v.creator, v.multiplier, v.format
        ),
        Urgency::Medium => format!(
            "{} is gaining traction ({:.1}x) with a {}. Draft available if you want to catch this wave.",
            v.creator, v.multiplier, v.format
        ),
        Urgency::Low => format!(
            "Heads up: {} posted a {} that's picking up steam ({:.1}x).",
            v.creator, v.format, v.multiplier
        ),
    }
}

pub fn body(urgency: Urgency, v: &TemplateVars) -> String {
    match urgency {
        Urgency::Critical => format!(
            "{} hit {} views in just {:.0} hours using a {} format. \
             The algorithm is actively pushing this wave. I've already reverse-engineered their \
             exact visual beat structure and rewrote it using your core content pillars. \
             Estimated window: ~{:.0}h before this wave peaks. Tap to open your draft flow.",
            v.creator,
            thousands(v.views),
            v.hours,
            v.format,
            v.peak_hours
        ),
        Urgency::High => format!(
            "{} is running at {:.1}x their normal engagement with a {}. \
             This format is triggering high early-retention signals. \
             I've built you a draft using your narrative ({}). Window: ~{:.0}h remaining.",
            v.creator, v.multiplier, v.format, v.narrative, v.peak_hours
        ),
        Urgency::Medium => format!(
            "{} is outperforming at {:.1}x with a {}. \
             A draft is ready based on your content pillars if you want to move on this.",
            v.creator, v.multiplier, v.format
        ),
        Urgency::Low => format!(
            "{} posted a {} performing at {:.1}x. Worth watching.",
            v.creator, v.format, v.multiplier
        ),
    }
}

/// Push notification title: urgency prefix, then the creator handle.
pub fn push_title(alert: &Alert) -> String {
    let prefix = match alert.urgency {
        Urgency::Critical => "WAVE ALERT",
        Urgency::High => "Trend Spike",
        Urgency::Medium => "Velocity Alert",
        Urgency::Low => "Trend Watch",
    };
    format!("{} — {}", prefix, alert.creator_handle)
}

/// Build a pending alert for one detection.
pub fn compose(
    id: AlertId,
    user: &UserProfile,
    creator: &Creator,
    post: &Post,
    detection: &SpikeDetection,
    now: DateTime<Utc>,
) -> Alert {
    let vars = TemplateVars::new(user, creator, post, detection);
    let shown = detection.rounded();

    Alert {
        id,
        user_id: user.id,
        post_id: post.id,
        creator_handle: vars.creator.clone(),
        velocity_multiplier: shown.velocity_multiplier,
        views_at_detection: post.views,
        hours_since_post: shown.hours_since_post,
        detected_format: Some(vars.format.clone()),
        headline: headline(detection.urgency, &vars),
        body: body(detection.urgency, &vars),
        draft: Some(fallback_draft(user, post, detection.velocity_multiplier)),
        urgency: detection.urgency,
        status: AlertStatus::Pending,
        estimated_peak_hours: Some(shown.estimated_peak_hours),
        created_at: now,
        sent_at: None,
        opened_at: None,
    }
}

/// `1234567` → `1,234,567`
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
