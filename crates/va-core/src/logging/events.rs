//! Structured event vocabulary.
//!
//! Event names are stable strings; every JSONL record carries the run id
//! and pipeline stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Scan pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading the dataset.
    Ingest,
    /// Velocity engine.
    Detect,
    /// Duplicate suppression.
    Cooldown,
    /// Alert composition.
    Alert,
    /// Push delivery.
    Notify,
    /// Output rendering.
    Report,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Ingest => "ingest",
            Stage::Detect => "detect",
            Stage::Cooldown => "cooldown",
            Stage::Alert => "alert",
            Stage::Notify => "notify",
            Stage::Report => "report",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable event names.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const INGEST_LOADED: &str = "ingest.loaded";

    pub const SCAN_STARTED: &str = "scan.started";
    pub const SCAN_FINISHED: &str = "scan.finished";

    pub const DETECT_CREATOR_DONE: &str = "detect.creator_done";
    pub const DETECT_CREATOR_FAILED: &str = "detect.creator_failed";

    pub const ALERT_GENERATED: &str = "alert.generated";
    pub const ALERT_SUPPRESSED_COOLDOWN: &str = "alert.suppressed_cooldown";

    pub const NOTIFY_SENT: &str = "notify.sent";
    pub const NOTIFY_FAILED: &str = "notify.failed";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// A structured log event, for callers that want a record rather than a
/// tracing macro.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub ts: DateTime<Utc>,
    pub level: Level,
    pub event: String,
    pub run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<String>,
    pub stage: Stage,
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, serde_json::Value>,
}

impl LogEvent {
    pub fn new(
        level: Level,
        event: impl Into<String>,
        run_id: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> Self {
        LogEvent {
            ts: Utc::now(),
            level,
            event: event.into(),
            run_id: run_id.into(),
            scan_id: None,
            stage,
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_scan_id(mut self, scan_id: impl Into<String>) -> Self {
        self.scan_id = Some(scan_id.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
        self
    }

    /// Serialize to a single JSON line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }
}

/// Correlation ids shared by every event of one run.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub scan_id: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            scan_id: None,
        }
    }

    pub fn with_scan_id(mut self, scan_id: impl Into<String>) -> Self {
        self.scan_id = Some(scan_id.into());
        self
    }

    pub fn event(
        &self,
        level: Level,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        let mut e = LogEvent::new(level, event, &self.run_id, stage, message);
        e.scan_id.clone_from(&self.scan_id);
        e
    }

    pub fn info(&self, event: impl Into<String>, stage: Stage, message: impl Into<String>) -> LogEvent {
        self.event(Level::Info, event, stage, message)
    }
}
