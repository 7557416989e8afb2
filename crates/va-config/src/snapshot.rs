//! Configuration snapshots for scan reports and reproducibility.
//!
//! A snapshot captures the exact settings in force when a scan ran, so a
//! report can be tied back to the thresholds that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::{ConfigPath, ConfigSource};
use crate::settings::Settings;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the settings were loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// Source of the settings.
    pub source: String,

    /// SHA-256 of the canonical settings JSON.
    pub settings_hash: String,

    pub spike_threshold: f64,
    pub min_views_threshold: u64,
    pub cooldown_hours: u32,
}

impl ConfigSnapshot {
    /// Create a snapshot of effective settings.
    pub fn new(settings: &Settings, resolved: &ConfigPath, timestamp: DateTime<Utc>) -> Self {
        let canonical = serde_json::to_string(settings).unwrap_or_default();
        ConfigSnapshot {
            timestamp,
            schema_version: settings.schema_version.clone(),
            path: resolved.path.as_ref().map(|p| p.display().to_string()),
            source: resolved.source.to_string(),
            settings_hash: hash_content(&canonical),
            spike_threshold: settings.detection.spike_threshold,
            min_views_threshold: settings.detection.min_views_threshold,
            cooldown_hours: settings.alerts.cooldown_hours,
        }
    }

    /// Snapshot of the built-in defaults.
    pub fn defaults_only(timestamp: DateTime<Utc>) -> Self {
        let resolved = ConfigPath {
            path: None,
            source: ConfigSource::BuiltinDefault,
        };
        Self::new(&Settings::default(), &resolved, timestamp)
    }

    /// Check if this snapshot matches another (same settings).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.settings_hash == other.settings_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.settings_hash[..12.min(self.settings_hash.len())]
    }
}

/// Compute SHA-256 hash of content.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
