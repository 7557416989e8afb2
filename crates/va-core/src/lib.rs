//! Velocity Alerts Core Library
//!
//! This library provides the core functionality for spike detection:
//! - The velocity engine (eligibility, acceleration, peak, urgency, confidence)
//! - Creator baselines
//! - Alert cooldown ledger
//! - Alert composition and the push notification shim
//! - Scan orchestration and report rendering
//! - Structured logging and exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod alert;
pub mod baseline;
pub mod cooldown;
pub mod detect;
pub mod exit_codes;
pub mod logging;
pub mod report;
pub mod scan;

pub use cooldown::{AlertLedger, CooldownGate, LedgerError};
pub use detect::{analyze_creator, evaluate_post, VelocityEngine};
pub use exit_codes::ExitCode;
pub use scan::{Dataset, ScanSummary, Scanner};
