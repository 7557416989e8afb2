//! Velocity Alerts configuration loading and validation.
//!
//! This crate provides:
//! - Typed settings for detection, scanning, and alerting
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Environment overrides for individual knobs
//! - Semantic validation
//! - Presets and config snapshots for scan reports

pub mod preset;
pub mod resolve;
pub mod settings;
pub mod snapshot;
pub mod validate;

pub use preset::{get_preset, list_presets, PresetName};
pub use resolve::{resolve_config, ConfigPath, ConfigSource};
pub use settings::{AlertConfig, DetectionConfig, ScanConfig, Settings};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_settings, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Load settings the standard way: resolve a file, parse it (or use
/// defaults), apply environment overrides, then validate.
pub fn load_settings(
    cli_path: Option<&std::path::Path>,
) -> ValidationResult<(Settings, ConfigPath)> {
    let resolved = resolve_config(cli_path);
    let mut settings = match &resolved.path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    settings.apply_env_overrides()?;
    validate_settings(&settings)?;
    Ok((settings, resolved))
}
