//! Error types for Velocity Alerts.
//!
//! Errors carry:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! The velocity engine itself never fails on data-quality problems; these
//! errors come from the layers around it (config, dataset input, ledger,
//! delivery).
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 20,
//!   "category": "input",
//!   "message": "invalid dataset: missing field `handle` at line 4",
//!   "recoverable": true,
//!   "context": { "file": "dataset.json" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for Velocity Alerts operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors.
    Config,
    /// Dataset / ingestion input errors.
    Input,
    /// Detection engine errors.
    Engine,
    /// Alert composition and delivery errors.
    Alert,
    /// Cooldown ledger errors.
    Ledger,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Engine => write!(f, "engine"),
            ErrorCategory::Alert => write!(f, "alert"),
            ErrorCategory::Ledger => write!(f, "ledger"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Velocity Alerts.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    // Input errors (20-29)
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("creator not found: {handle}")]
    CreatorNotFound { handle: String },

    #[error("user {user_id} not found")]
    UserNotFound { user_id: u64 },

    // Engine errors (30-39)
    #[error("detection failed for creator {handle}: {reason}")]
    Detection { handle: String, reason: String },

    // Alert errors (40-49)
    #[error("alert composition failed: {0}")]
    AlertComposition(String),

    #[error("notification delivery failed: {0}")]
    Delivery(String),

    // Ledger errors (50-59)
    #[error("cooldown ledger error: {0}")]
    Ledger(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 30-39: Engine errors
    /// - 40-49: Alert errors
    /// - 50-59: Ledger errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidSettings(_) => 11,
            Error::InvalidDataset(_) => 20,
            Error::CreatorNotFound { .. } => 21,
            Error::UserNotFound { .. } => 22,
            Error::Detection { .. } => 30,
            Error::AlertComposition(_) => 40,
            Error::Delivery(_) => 41,
            Error::Ledger(_) => 50,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidSettings(_) => ErrorCategory::Config,

            Error::InvalidDataset(_)
            | Error::CreatorNotFound { .. }
            | Error::UserNotFound { .. } => ErrorCategory::Input,

            Error::Detection { .. } => ErrorCategory::Engine,

            Error::AlertComposition(_) | Error::Delivery(_) => ErrorCategory::Alert,

            Error::Ledger(_) => ErrorCategory::Ledger,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) | Error::InvalidSettings(_) => true,
            Error::InvalidDataset(_) => true,
            Error::CreatorNotFound { .. } | Error::UserNotFound { .. } => false,
            Error::Detection { .. } => true,
            Error::AlertComposition(_) => true,
            // Push services are flaky; the next scan retries.
            Error::Delivery(_) => true,
            Error::Ledger(_) => true,
            Error::Io(_) | Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Run 'va-core config validate' to check the settings file.",
            Error::InvalidSettings(_) => {
                "Fix the reported field, or start from 'va-core config preset balanced'."
            }
            Error::InvalidDataset(_) => {
                "Check the dataset JSON against the expected shape (users -> creators -> posts)."
            }
            Error::CreatorNotFound { .. } => {
                "The handle is not tracked in this dataset. Check spelling and the active flag."
            }
            Error::UserNotFound { .. } => "The user id does not exist in this dataset.",
            Error::Detection { .. } => "Skip this creator and report with the offending input.",
            Error::AlertComposition(_) => "Retry the scan; alert copy is rebuilt from scratch.",
            Error::Delivery(_) => "Check the push token and delivery credentials, then rescan.",
            Error::Ledger(_) => {
                "The cooldown ledger is unreadable. Move it aside; a fresh one is created on next scan."
            }
            Error::Io(_) => "Check file paths and permissions, then retry.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidSettings(_) => "Invalid Settings",
            Error::InvalidDataset(_) => "Invalid Dataset",
            Error::CreatorNotFound { .. } => "Creator Not Found",
            Error::UserNotFound { .. } => "User Not Found",
            Error::Detection { .. } => "Detection Error",
            Error::AlertComposition(_) => "Alert Composition Error",
            Error::Delivery(_) => "Delivery Failed",
            Error::Ledger(_) => "Cooldown Ledger Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Remediation hint.
    pub remediation: String,

    /// Additional structured context (e.g., handle, file path).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::CreatorNotFound { handle } | Error::Detection { handle, .. } => {
                context.insert("handle".to_string(), serde_json::json!(handle));
            }
            Error::UserNotFound { user_id } => {
                context.insert("user_id".to_string(), serde_json::json!(user_id));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            remediation: err.remediation().to_string(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}
