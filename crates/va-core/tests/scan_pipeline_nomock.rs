//! Scan pipeline tests against a real ledger file.
//!
//! No mocks: a persisted `AlertLedger`, the `LogNotifier` shim, and
//! datasets parsed from JSON the way the CLI reads them.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;
use va_common::{AlertStatus, PostId, Result, Urgency, UserId};
use va_config::Settings;
use va_core::alert::{LogNotifier, Notifier, PushPayload};
use va_core::cooldown::{AlertLedger, CooldownGate};
use va_core::detect::recency_cutoff;
use va_core::scan::{Dataset, Scanner};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap()
}

fn ts(hours_ago: f64) -> String {
    (now() - Duration::minutes((hours_ago * 60.0) as i64)).to_rfc3339()
}

/// Two users tracking the same creator, plus one quiet creator.
fn dataset() -> Dataset {
    let json = format!(
        r#"{{
          "users": [
            {{
              "id": 1,
              "username": "maya",
              "push_token": "tok-maya",
              "content_pillars": {{ "primary_narrative": "founder diaries", "topics": ["bootstrapping"] }},
              "creators": [
                {{
                  "id": 10,
                  "handle": "growth.lab",
                  "avg_views": 10000,
                  "posts": [
                    {{ "id": 100, "creator_id": 10, "posted_at": "{hot}", "views": 50000,
                       "detected_format": "listicle", "detected_hook_type": "hook_number",
                       "snapshots": [
                         {{ "post_id": 100, "views": 8000,  "captured_at": "{s1}" }},
                         {{ "post_id": 100, "views": 20000, "captured_at": "{s2}" }},
                         {{ "post_id": 100, "views": 50000, "captured_at": "{s3}" }}
                       ] }},
                    {{ "id": 101, "creator_id": 10, "posted_at": "{warm}", "views": 30000 }},
                    {{ "id": 102, "creator_id": 10, "posted_at": "{cold}", "views": 4000 }},
                    {{ "id": 103, "creator_id": 10, "views": 90000 }}
                  ]
                }},
                {{
                  "id": 11,
                  "handle": "quiet.one",
                  "avg_views": 20000,
                  "posts": [ {{ "id": 110, "creator_id": 11, "posted_at": "{warm}", "views": 21000 }} ]
                }}
              ]
            }},
            {{
              "id": 2,
              "username": "theo",
              "notification_enabled": false,
              "creators": [
                {{
                  "id": 10,
                  "handle": "growth.lab",
                  "avg_views": 10000,
                  "posts": [ {{ "id": 100, "creator_id": 10, "posted_at": "{hot}", "views": 50000 }} ]
                }}
              ]
            }}
          ]
        }}"#,
        hot = ts(2.0),
        warm = ts(10.0),
        cold = ts(5.0),
        s1 = ts(1.5),
        s2 = ts(1.0),
        s3 = ts(0.0),
    );
    Dataset::from_json(&json).unwrap()
}

fn scanner(ledger: AlertLedger) -> Scanner {
    Scanner::new(
        Settings::default(),
        Arc::new(ledger),
        Arc::new(LogNotifier),
        "run-nomock",
    )
    .unwrap()
}

#[test]
fn scan_alerts_every_tracking_user() {
    let summary = scanner(AlertLedger::in_memory(6)).scan(&dataset(), now(), None).unwrap();

    assert_eq!(summary.users_scanned, 2);
    assert_eq!(summary.creators_scanned, 3);
    assert_eq!(summary.posts_scanned, 6);
    // Posts 100 (5x) and 101 (3x) for maya, post 100 for theo.
    assert_eq!(summary.spikes_detected, 3);
    assert_eq!(summary.alerts_generated, 3);

    let first = &summary.alerts[0];
    assert_eq!(first.user_id, UserId(1));
    assert_eq!(first.post_id, PostId(100));
    assert_eq!(first.urgency, Urgency::Critical);
    assert_eq!(first.status, AlertStatus::Sent);
    assert!(first.draft.is_some());

    // Theo has notifications off: alert recorded but not pushed.
    let theo = summary.alerts.iter().find(|a| a.user_id == UserId(2)).unwrap();
    assert_eq!(theo.status, AlertStatus::Pending);
    assert!(theo.sent_at.is_none());

    let ids: Vec<u64> = summary.alerts.iter().map(|a| a.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn creator_report_counts_exclusions() {
    let summary = scanner(AlertLedger::in_memory(6)).scan(&dataset(), now(), Some(UserId(1))).unwrap();
    let growth = summary
        .creators
        .iter()
        .find(|c| c.handle == "growth.lab")
        .unwrap();

    assert_eq!(growth.baseline_views, 10_000.0);
    assert_eq!(growth.posts_in_window, 3);
    assert_eq!(growth.excluded.missing_timestamp, 1);
    assert_eq!(growth.excluded.below_threshold, 1);
    assert_eq!(growth.spikes.len(), 2);
    assert_eq!(growth.spikes[0].post_id, PostId(100));
}

#[test]
fn ledger_file_suppresses_repeat_alerts_across_runs() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ledger.json");
    let data = dataset();

    let first = scanner(AlertLedger::open(&path, 6).unwrap())
        .scan(&data, now(), None)
        .unwrap();
    assert_eq!(first.alerts_generated, 3);
    assert!(path.exists());

    // A later process, inside the cooldown window.
    let second = scanner(AlertLedger::open(&path, 6).unwrap())
        .scan(&data, now() + Duration::hours(1), None)
        .unwrap();
    assert_eq!(second.spikes_detected, 3);
    assert_eq!(second.alerts_generated, 0);
    assert_eq!(second.alerts_suppressed, 3);

    // After the cooldown the same spikes alert again, with fresh ids.
    let third = scanner(AlertLedger::open(&path, 6).unwrap())
        .scan(&data, now() + Duration::hours(7), None)
        .unwrap();
    assert_eq!(third.alerts_generated, third.spikes_detected);
    assert!(third.alerts.iter().all(|a| a.id.0 > 3));
}

#[test]
fn ledger_file_keeps_delivery_status() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ledger.json");

    let summary = scanner(AlertLedger::open(&path, 6).unwrap())
        .scan(&dataset(), now(), None)
        .unwrap();
    let reported: Vec<(u64, AlertStatus)> =
        summary.alerts.iter().map(|a| (a.id.0, a.status)).collect();
    assert_eq!(
        reported,
        vec![
            (1, AlertStatus::Sent),
            (2, AlertStatus::Sent),
            (3, AlertStatus::Pending)
        ]
    );

    let persisted: Vec<(u64, AlertStatus)> = AlertLedger::open(&path, 6)
        .unwrap()
        .entries()
        .iter()
        .map(|e| (e.alert_id.0, e.status))
        .collect();
    assert_eq!(persisted, reported);
}

#[test]
fn expiring_ledger_reopens_the_gate() {
    let ledger = AlertLedger::in_memory(12);
    let shared = ledger.clone();
    let s = scanner(ledger);
    let data = dataset();

    s.scan(&data, now(), None).unwrap();
    assert!(shared.is_active(UserId(1), PostId(100), now()).unwrap());

    let later = now() + Duration::hours(80);
    assert_eq!(shared.expire_before(recency_cutoff(later)).unwrap(), 3);
    assert!(!shared.is_active(UserId(1), PostId(100), now()).unwrap());
    assert!(shared.is_empty());
}

#[test]
fn unknown_user_is_an_input_error() {
    let err = scanner(AlertLedger::in_memory(6))
        .scan(&dataset(), now(), Some(UserId(42)))
        .unwrap_err();
    assert_eq!(err.code(), 22);
}

struct FailingNotifier {
    attempts: Mutex<usize>,
}

impl Notifier for FailingNotifier {
    fn send(&self, _payload: &PushPayload, _token: &str) -> Result<bool> {
        *self.attempts.lock().unwrap() += 1;
        Err(va_common::Error::Delivery("provider down".to_string()))
    }
}

#[test]
fn delivery_failure_keeps_alert_pending() {
    let notifier = Arc::new(FailingNotifier {
        attempts: Mutex::new(0),
    });
    let ledger = AlertLedger::in_memory(6);
    let s = Scanner::new(
        Settings::default(),
        Arc::new(ledger.clone()),
        notifier.clone(),
        "run-nomock",
    )
    .unwrap();

    let summary = s.scan(&dataset(), now(), Some(UserId(1))).unwrap();
    assert_eq!(summary.alerts_generated, 2);
    assert!(summary.alerts.iter().all(|a| a.status == AlertStatus::Pending));
    assert_eq!(*notifier.attempts.lock().unwrap(), 2);
    // The undelivered alerts still hold the cooldown, as pending.
    let entries = ledger.entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.status == AlertStatus::Pending));
}

#[test]
fn parallelism_setting_does_not_change_results() {
    let data = dataset();
    let mut settings = Settings::default();
    settings.scan.max_parallel_creators = 1;
    let serial = Scanner::new(
        settings,
        Arc::new(AlertLedger::in_memory(6)),
        Arc::new(LogNotifier),
        "run-serial",
    )
    .unwrap()
    .scan(&data, now(), None)
    .unwrap();
    let parallel = scanner(AlertLedger::in_memory(6)).scan(&data, now(), None).unwrap();

    assert_eq!(serial.metrics, parallel.metrics);
    let spikes = |s: &va_core::ScanSummary| -> Vec<PostId> {
        s.creators.iter().flat_map(|c| c.spikes.iter().map(|d| d.post_id)).collect()
    };
    assert_eq!(spikes(&serial), spikes(&parallel));
}
