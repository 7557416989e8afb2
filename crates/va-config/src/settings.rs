//! Settings types.
//!
//! Every section defaults independently, so a settings file only needs
//! to name the values it changes.

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Environment variable names for per-knob overrides.
pub const ENV_SPIKE_THRESHOLD: &str = "VA_SPIKE_THRESHOLD";
pub const ENV_MIN_VIEWS_THRESHOLD: &str = "VA_MIN_VIEWS_THRESHOLD";
pub const ENV_ALERT_COOLDOWN_HOURS: &str = "VA_ALERT_COOLDOWN_HOURS";
pub const ENV_POLLING_INTERVAL_MINUTES: &str = "VA_POLLING_INTERVAL_MINUTES";

/// All per-knob override variables, for diagnostics and test guards.
pub const ENV_OVERRIDES: &[&str] = &[
    ENV_SPIKE_THRESHOLD,
    ENV_MIN_VIEWS_THRESHOLD,
    ENV_ALERT_COOLDOWN_HOURS,
    ENV_POLLING_INTERVAL_MINUTES,
];

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

/// Complete settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub alerts: AlertConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            description: None,
            detection: DetectionConfig::default(),
            scan: ScanConfig::default(),
            alerts: AlertConfig::default(),
        }
    }
}

/// Parameters handed to the velocity engine on every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Multiplier at or above which a post is a spike.
    pub spike_threshold: f64,

    /// Posts below this many views are never scored.
    pub min_views_threshold: u64,
}

impl DetectionConfig {
    /// Only posts this recent are considered at the creator level.
    pub const RECENCY_WINDOW_HOURS: f64 = 72.0;

    /// Only the most recent snapshots feed acceleration.
    pub const ACCELERATION_WINDOW: usize = 5;

    /// Posts younger than this carry too little signal to score.
    pub const MIN_POST_AGE_HOURS: f64 = 0.5;

    pub fn new(spike_threshold: f64, min_views_threshold: u64) -> Self {
        Self {
            spike_threshold,
            min_views_threshold,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            spike_threshold: 2.5,
            min_views_threshold: 1000,
        }
    }
}

/// Scan loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Minutes between scheduled scans.
    pub polling_interval_minutes: u32,

    /// How many recent posts feed a recomputed baseline.
    pub baseline_post_count: usize,

    /// Hours of data considered "recent" for velocity reporting.
    pub velocity_window_hours: u32,

    /// Worker threads for per-creator detection; 0 uses the rayon default.
    pub max_parallel_creators: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            polling_interval_minutes: 30,
            baseline_post_count: 20,
            velocity_window_hours: 6,
            max_parallel_creators: 0,
        }
    }
}

/// Alert generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Repeat alerts for the same post are suppressed for this long.
    pub cooldown_hours: u32,

    /// Deliver push notifications for new alerts.
    pub push_enabled: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_hours: 6,
            push_enabled: true,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse settings from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Canonical JSON form, used for hashing and `config show`.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Apply `VA_*` environment overrides on top of the loaded values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ValidationError> {
        if let Some(v) = env_parse::<f64>(ENV_SPIKE_THRESHOLD)? {
            self.detection.spike_threshold = v;
        }
        if let Some(v) = env_parse::<u64>(ENV_MIN_VIEWS_THRESHOLD)? {
            self.detection.min_views_threshold = v;
        }
        if let Some(v) = env_parse::<u32>(ENV_ALERT_COOLDOWN_HOURS)? {
            self.alerts.cooldown_hours = v;
        }
        if let Some(v) = env_parse::<u32>(ENV_POLLING_INTERVAL_MINUTES)? {
            self.scan.polling_interval_minutes = v;
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ValidationError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ValidationError::InvalidValue {
                field: key.to_string(),
                message: format!("cannot parse '{}': {}", raw, e),
            }),
        Err(_) => Ok(None),
    }
}
