//! Alert cooldown ledger.
//!
//! The engine has no memory: it re-reports the same spike on every scan.
//! This ledger remembers which (user, post) pairs were already alerted and
//! suppresses repeats inside the cooldown window.
//!
//! ```text
//! SpikeDetection → CooldownGate::is_active ──yes──→ suppressed
//!                          │ no
//!                          ↓
//!                  compose alert → CooldownGate::record
//!                                        ↓
//!                                 [state file] (optional)
//! ```
//!
//! Entries older than the retention horizon (the longer of the cooldown and
//! the detection window) are pruned on load and on record, so the state
//! file stays bounded under a polling loop.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use va_common::{Alert, AlertId, AlertStatus, PostId, Urgency, UserId};
use va_config::DetectionConfig;

/// Errors from ledger persistence.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to load ledger {path}: {reason}")]
    LoadState { path: String, reason: String },

    #[error("ledger lock poisoned")]
    Poisoned,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<LedgerError> for va_common::Error {
    fn from(err: LedgerError) -> Self {
        va_common::Error::Ledger(err.to_string())
    }
}

/// Decides whether a new alert for a post would be a duplicate.
pub trait CooldownGate: Send + Sync {
    /// True when `user` was already alerted about `post` inside the window.
    fn is_active(&self, user: UserId, post: PostId, now: DateTime<Utc>)
        -> Result<bool, LedgerError>;

    /// Remember an issued alert, with its final delivery status.
    fn record(&self, alert: &Alert) -> Result<(), LedgerError>;

    /// Id for the next alert to be issued.
    fn next_alert_id(&self) -> Result<AlertId, LedgerError>;
}

/// One issued alert, as far as cooldown is concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub alert_id: AlertId,
    pub user_id: UserId,
    pub post_id: PostId,
    pub urgency: Urgency,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Alert> for LedgerEntry {
    fn from(alert: &Alert) -> Self {
        LedgerEntry {
            alert_id: alert.id,
            user_id: alert.user_id,
            post_id: alert.post_id,
            urgency: alert.urgency,
            status: alert.status,
            created_at: alert.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerState {
    entries: Vec<LedgerEntry>,
    /// Highest id ever issued. Survives pruning so ids are never reused.
    #[serde(default)]
    last_alert_id: u64,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

impl LedgerState {
    /// Drop entries created before `cutoff`. Returns how many were removed.
    fn prune_old(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.created_at >= cutoff);
        before - self.entries.len()
    }

    /// Newest creation time on file, used as the clock when loading.
    fn newest(&self) -> Option<DateTime<Utc>> {
        self.entries.iter().map(|e| e.created_at).max()
    }

    fn sync_last_id(&mut self) {
        let max = self.entries.iter().map(|e| e.alert_id.0).max().unwrap_or(0);
        self.last_alert_id = self.last_alert_id.max(max);
    }
}

/// In-memory alert ledger, optionally backed by a JSON state file.
#[derive(Debug, Clone)]
pub struct AlertLedger {
    cooldown: Duration,
    state: Arc<RwLock<LedgerState>>,
    state_path: Option<PathBuf>,
}

impl AlertLedger {
    /// Ledger that lives only for this process.
    pub fn in_memory(cooldown_hours: u32) -> Self {
        Self {
            cooldown: Duration::hours(i64::from(cooldown_hours)),
            state: Arc::new(RwLock::new(LedgerState::default())),
            state_path: None,
        }
    }

    /// Open a ledger persisted at `path`. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>, cooldown_hours: u32) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let cooldown = Duration::hours(i64::from(cooldown_hours));
        let state = Self::load_state(&path, retention_for(cooldown))?;
        Ok(Self {
            cooldown,
            state: Arc::new(RwLock::new(state)),
            state_path: Some(path),
        })
    }

    /// How long an entry is kept before pruning.
    pub fn retention(&self) -> Duration {
        retention_for(self.cooldown)
    }

    fn load_state(path: &Path, retention: Duration) -> Result<LedgerState, LedgerError> {
        if !path.exists() {
            return Ok(LedgerState::default());
        }
        let load_err = |reason: String| LedgerError::LoadState {
            path: path.display().to_string(),
            reason,
        };
        let file = File::open(path).map_err(|e| load_err(e.to_string()))?;
        let mut state: LedgerState =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| load_err(e.to_string()))?;

        // Files written before the id counter existed.
        state.sync_last_id();
        if let Some(newest) = state.newest() {
            state.prune_old(newest - retention);
        }
        Ok(state)
    }

    fn save_state(&self, state: &LedgerState) -> Result<(), LedgerError> {
        let Some(ref path) = self.state_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        let file = File::create(&temp_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), state)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    pub fn state_path(&self) -> Option<&Path> {
        self.state_path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.state
            .read()
            .map(|s| s.entries.clone())
            .unwrap_or_default()
    }

    /// Drop every entry created before `cutoff`.
    ///
    /// Returns how many entries were removed.
    pub fn expire_before(&self, cutoff: DateTime<Utc>) -> Result<usize, LedgerError> {
        let mut state = self.state.write().map_err(|_| LedgerError::Poisoned)?;
        let expired = state.prune_old(cutoff);
        if expired > 0 {
            state.last_updated = Some(Utc::now());
            self.save_state(&state)?;
        }
        Ok(expired)
    }
}

/// The longer of the cooldown and the detection window.
fn retention_for(cooldown: Duration) -> Duration {
    let window_ms = (DetectionConfig::RECENCY_WINDOW_HOURS * 3_600_000.0) as i64;
    cooldown.max(Duration::milliseconds(window_ms))
}

impl CooldownGate for AlertLedger {
    fn is_active(
        &self,
        user: UserId,
        post: PostId,
        now: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        let cutoff = now - self.cooldown;
        let state = self.state.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(state.entries.iter().any(|e| {
            e.user_id == user
                && e.post_id == post
                && e.created_at >= cutoff
                && e.status != AlertStatus::Expired
        }))
    }

    fn record(&self, alert: &Alert) -> Result<(), LedgerError> {
        let mut state = self.state.write().map_err(|_| LedgerError::Poisoned)?;
        state.entries.push(LedgerEntry::from(alert));
        state.last_alert_id = state.last_alert_id.max(alert.id.0);
        state.prune_old(alert.created_at - self.retention());
        state.last_updated = Some(Utc::now());
        self.save_state(&state)
    }

    fn next_alert_id(&self) -> Result<AlertId, LedgerError> {
        let state = self.state.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(AlertId(state.last_alert_id + 1))
    }
}
