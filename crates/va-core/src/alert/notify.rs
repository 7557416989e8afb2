//! Push delivery shim.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use va_common::{Alert, AlertStatus, Result, UserProfile};

use super::templates::push_title;

/// What a push provider receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub data: PushData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushData {
    pub alert_id: String,
    pub urgency: String,
    pub action: String,
}

impl PushPayload {
    pub fn for_alert(alert: &Alert) -> Self {
        PushPayload {
            title: push_title(alert),
            body: alert.headline.clone(),
            data: PushData {
                alert_id: alert.id.to_string(),
                urgency: alert.urgency.to_string(),
                action: "open_draft".to_string(),
            },
        }
    }
}

/// A push provider.
pub trait Notifier: Send + Sync {
    /// Deliver one payload. `Ok(false)` means the provider declined it.
    fn send(&self, payload: &PushPayload, token: &str) -> Result<bool>;
}

/// Writes pushes to the log instead of a provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, payload: &PushPayload, _token: &str) -> Result<bool> {
        info!(
            target: "alert.push",
            alert_id = %payload.data.alert_id,
            urgency = %payload.data.urgency,
            title = %payload.title,
            body = %payload.body,
            "push logged"
        );
        Ok(true)
    }
}

/// Push `alert` to `user` when they can and want to receive it.
///
/// On success the alert is marked sent at `now`. Returns whether a push
/// went out.
pub fn deliver(
    notifier: &dyn Notifier,
    user: &UserProfile,
    alert: &mut Alert,
    push_enabled: bool,
    now: DateTime<Utc>,
) -> Result<bool> {
    if !push_enabled || !user.notification_enabled {
        return Ok(false);
    }
    let Some(token) = user.push_token.as_deref().filter(|t| !t.is_empty()) else {
        return Ok(false);
    };

    let sent = notifier.send(&PushPayload::for_alert(alert), token)?;
    if sent {
        alert.status = AlertStatus::Sent;
        alert.sent_at = Some(now);
    }
    Ok(sent)
}
