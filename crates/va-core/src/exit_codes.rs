//! Exit codes for the va-core CLI.
//!
//! Ranges:
//! - 0-2: scan outcomes (parse the outcome from the code, not the output)
//! - 10-19: user/environment errors
//! - 20-29: internal errors

use va_common::{Error, ErrorCategory};

/// Exit codes for va-core operations. Stable contract for schedulers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// No spikes found.
    Clean = 0,
    /// Spikes found, every alert suppressed or none requested.
    SpikesFound = 1,
    /// At least one alert generated.
    AlertsGenerated = 2,

    /// Invalid arguments.
    ArgsError = 10,
    /// Configuration missing or invalid.
    ConfigError = 11,
    /// Dataset unreadable or inconsistent.
    InputError = 12,

    /// Internal error (bug).
    InternalError = 20,
    /// I/O error.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Outcome for a finished scan or analysis.
    pub fn for_outcome(spikes: usize, alerts: usize) -> Self {
        if alerts > 0 {
            ExitCode::AlertsGenerated
        } else if spikes > 0 {
            ExitCode::SpikesFound
        } else {
            ExitCode::Clean
        }
    }

    /// Map a failure to its exit code.
    pub fn for_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Input => ExitCode::InputError,
            ErrorCategory::Io => ExitCode::IoError,
            ErrorCategory::Ledger => ExitCode::IoError,
            ErrorCategory::Engine | ErrorCategory::Alert => ExitCode::InternalError,
        }
    }

    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::SpikesFound => "OK_SPIKES",
            ExitCode::AlertsGenerated => "OK_ALERTS",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
