//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::settings::Settings;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate settings semantically.
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    if settings.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: settings.schema_version.clone(),
        });
    }

    let threshold = settings.detection.spike_threshold;
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "detection.spike_threshold".to_string(),
            message: format!("Must be a positive number, got {}", threshold),
        });
    }

    if settings.scan.polling_interval_minutes == 0 {
        return Err(ValidationError::InvalidValue {
            field: "scan.polling_interval_minutes".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    if settings.scan.baseline_post_count == 0 {
        return Err(ValidationError::InvalidValue {
            field: "scan.baseline_post_count".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    // A cooldown shorter than the polling interval lets every scan
    // re-alert the same post.
    let polling_hours = settings.scan.polling_interval_minutes as f64 / 60.0;
    if settings.alerts.cooldown_hours > 0 && (settings.alerts.cooldown_hours as f64) < polling_hours
    {
        return Err(ValidationError::SemanticError(format!(
            "alerts.cooldown_hours ({}) is shorter than the polling interval ({} min)",
            settings.alerts.cooldown_hours, settings.scan.polling_interval_minutes
        )));
    }

    Ok(())
}
