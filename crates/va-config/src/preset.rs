//! Configuration presets for common tracking styles.
//!
//! - Aggressive: lower threshold, earlier alerts, shorter cooldown
//! - Balanced: the built-in defaults
//! - Conservative: only strong spikes on established accounts

use crate::settings::{AlertConfig, DetectionConfig, ScanConfig, Settings};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Lower threshold, smaller accounts, frequent alerts
    Aggressive,
    /// Built-in defaults
    Balanced,
    /// High threshold, large accounts, infrequent alerts
    Conservative,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Aggressive,
        PresetName::Balanced,
        PresetName::Conservative,
    ];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Aggressive => "aggressive",
            PresetName::Balanced => "balanced",
            PresetName::Conservative => "conservative",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "aggressive" | "eager" => Some(PresetName::Aggressive),
            "balanced" | "default" => Some(PresetName::Balanced),
            "conservative" | "strict" => Some(PresetName::Conservative),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Aggressive => "Flag 2x spikes from 500 views, re-alert after 3h",
            PresetName::Balanced => "Flag 2.5x spikes from 1000 views, re-alert after 6h",
            PresetName::Conservative => "Flag 3.5x spikes from 5000 views, re-alert after 12h",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Debug, Clone)]
pub enum PresetError {
    /// Unknown preset name.
    UnknownPreset(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(name) => {
                write!(
                    f,
                    "Unknown preset '{}'. Available: {}",
                    name,
                    PresetName::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PresetError {}

/// Get the settings for a preset.
pub fn get_preset(name: PresetName) -> Settings {
    match name {
        PresetName::Aggressive => Settings {
            description: Some(name.description().to_string()),
            detection: DetectionConfig::new(2.0, 500),
            scan: ScanConfig {
                polling_interval_minutes: 15,
                ..ScanConfig::default()
            },
            alerts: AlertConfig {
                cooldown_hours: 3,
                ..AlertConfig::default()
            },
            ..Settings::default()
        },
        PresetName::Balanced => Settings {
            description: Some(name.description().to_string()),
            ..Settings::default()
        },
        PresetName::Conservative => Settings {
            description: Some(name.description().to_string()),
            detection: DetectionConfig::new(3.5, 5000),
            scan: ScanConfig {
                polling_interval_minutes: 60,
                ..ScanConfig::default()
            },
            alerts: AlertConfig {
                cooldown_hours: 12,
                ..AlertConfig::default()
            },
            ..Settings::default()
        },
    }
}

/// Information about a preset for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub description: String,
    pub spike_threshold: f64,
    pub min_views_threshold: u64,
    pub cooldown_hours: u32,
}

impl PresetInfo {
    /// Create info from a preset.
    pub fn from_preset(name: PresetName) -> Self {
        let settings = get_preset(name);
        Self {
            name: name.as_str().to_string(),
            description: name.description().to_string(),
            spike_threshold: settings.detection.spike_threshold,
            min_views_threshold: settings.detection.min_views_threshold,
            cooldown_hours: settings.alerts.cooldown_hours,
        }
    }
}

/// List all available presets with summary information.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| PresetInfo::from_preset(name))
        .collect()
}
