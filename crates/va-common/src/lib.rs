//! Velocity Alerts common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - Creator, post, snapshot, and alert records
//! - Spike detections and the per-post metrics derived from them
//! - Identity newtypes and scan IDs
//! - Common error types
//! - Output format specifications

pub mod error;
pub mod id;
pub mod model;
pub mod output;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::{AlertId, CreatorId, PostId, ScanId, UserId};
pub use model::{
    Alert, AlertStatus, ContentPillars, Creator, DraftContent, Post, PostMetrics, Snapshot,
    SpikeDetection, Urgency, UserProfile,
};
pub use output::OutputFormat;

/// Schema version for JSON payloads produced by the CLI.
pub const SCHEMA_VERSION: &str = "1.0.0";
