//! Rendering of scan and analysis results for the CLI.
//!
//! JSON payloads carry the schema version and the config snapshot so a
//! report can be matched to the thresholds that produced it. Markdown and
//! summary output use display precision; JSON keeps full precision.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use va_common::{OutputFormat, Result, SpikeDetection, SCHEMA_VERSION};
use va_config::ConfigSnapshot;

use crate::alert::thousands;
use crate::scan::{CreatorReport, ScanSummary};

/// JSON envelope for `va-core scan`.
#[derive(Debug, Serialize)]
pub struct ScanReport<'a> {
    pub schema_version: &'static str,
    pub run_id: &'a str,
    pub config: &'a ConfigSnapshot,
    #[serde(flatten)]
    pub summary: &'a ScanSummary,
}

/// JSON envelope for `va-core analyze`.
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub schema_version: &'static str,
    pub run_id: &'a str,
    pub evaluated_at: DateTime<Utc>,
    pub config: &'a ConfigSnapshot,
    pub creator: &'a CreatorReport,
}

pub fn render_scan(
    summary: &ScanSummary,
    config: &ConfigSnapshot,
    run_id: &str,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let report = ScanReport {
                schema_version: SCHEMA_VERSION,
                run_id,
                config,
                summary,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Summary => Ok(scan_summary_line(summary)),
        OutputFormat::Md => Ok(scan_markdown(summary, config)),
    }
}

pub fn render_analysis(
    creator: &CreatorReport,
    evaluated_at: DateTime<Utc>,
    config: &ConfigSnapshot,
    run_id: &str,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let report = AnalysisReport {
                schema_version: SCHEMA_VERSION,
                run_id,
                evaluated_at,
                config,
                creator,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Summary => Ok(analysis_summary_line(creator)),
        OutputFormat::Md => {
            let mut out = String::new();
            let _ = writeln!(out, "# va-core analyze @{}", creator.handle);
            let _ = writeln!(out);
            let _ = writeln!(out, "Evaluated at: {}", evaluated_at.to_rfc3339());
            let _ = writeln!(out, "Config: {} ({})", config.short_id(), config.source);
            let _ = writeln!(out);
            creator_section(&mut out, creator, "##");
            Ok(out)
        }
    }
}

/// One line, for cron mail and quick checks.
pub fn scan_summary_line(summary: &ScanSummary) -> String {
    let mut line = format!(
        "[{}] scanned {} posts from {} creators: {} spikes, {} alerts, {} suppressed",
        summary.scan_id,
        summary.posts_scanned,
        summary.creators_scanned,
        summary.spikes_detected,
        summary.alerts_generated,
        summary.alerts_suppressed,
    );
    if summary.creators_failed > 0 {
        let _ = write!(line, ", {} creators failed", summary.creators_failed);
    }
    line
}

pub fn analysis_summary_line(creator: &CreatorReport) -> String {
    match creator.spikes.first() {
        Some(top) => format!(
            "@{}: {} spikes in {} posts (top {:.2}x, {})",
            creator.handle,
            creator.spikes.len(),
            creator.posts_in_window,
            top.velocity_multiplier,
            top.urgency,
        ),
        None => format!(
            "@{}: no spikes in {} posts",
            creator.handle, creator.posts_in_window
        ),
    }
}

fn scan_markdown(summary: &ScanSummary, config: &ConfigSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# va-core scan");
    let _ = writeln!(out);
    let _ = writeln!(out, "Scan: {}", summary.scan_id);
    let _ = writeln!(out, "Evaluated at: {}", summary.evaluated_at.to_rfc3339());
    let _ = writeln!(
        out,
        "Config: {} ({}, threshold {}x, min views {})",
        config.short_id(),
        config.source,
        config.spike_threshold,
        thousands(config.min_views_threshold),
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "| Users | Creators | Failed | Posts | Spikes | Alerts | Suppressed |");
    let _ = writeln!(out, "|---:|---:|---:|---:|---:|---:|---:|");
    let _ = writeln!(
        out,
        "| {} | {} | {} | {} | {} | {} | {} |",
        summary.users_scanned,
        summary.creators_scanned,
        summary.creators_failed,
        summary.posts_scanned,
        summary.spikes_detected,
        summary.alerts_generated,
        summary.alerts_suppressed,
    );

    if !summary.alerts.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Alerts");
        let _ = writeln!(out);
        let _ = writeln!(out, "| # | User | Creator | Urgency | Multiplier | Status | Headline |");
        let _ = writeln!(out, "|---:|---:|---|---|---:|---|---|");
        for alert in &summary.alerts {
            let _ = writeln!(
                out,
                "| {} | {} | @{} | {} | {:.1}x | {} | {} |",
                alert.id,
                alert.user_id,
                alert.creator_handle,
                alert.urgency,
                alert.velocity_multiplier,
                alert.status,
                escape_cell(&alert.headline),
            );
        }
    }

    for creator in summary.creators.iter().filter(|c| !c.spikes.is_empty()) {
        let _ = writeln!(out);
        creator_section(&mut out, creator, "##");
    }
    out
}

fn creator_section(out: &mut String, creator: &CreatorReport, heading: &str) {
    let _ = writeln!(out, "{} @{}", heading, creator.handle);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Baseline: {} views, {} posts in window, {} excluded",
        thousands(creator.baseline_views.round() as u64),
        creator.posts_in_window,
        creator.excluded.total(),
    );
    let _ = writeln!(out);
    if creator.spikes.is_empty() {
        let _ = writeln!(out, "No spikes.");
        return;
    }
    spike_table(out, &creator.spikes);
}

fn spike_table(out: &mut String, spikes: &[SpikeDetection]) {
    let _ = writeln!(
        out,
        "| Post | Multiplier | Views/h | Age (h) | Accel | Peak in (h) | Urgency | Confidence |"
    );
    let _ = writeln!(out, "|---:|---:|---:|---:|---:|---:|---|---:|");
    for d in spikes.iter().map(SpikeDetection::rounded) {
        let _ = writeln!(
            out,
            "| {} | {}x | {} | {} | {} | {} | {} | {} |",
            d.post_id,
            d.velocity_multiplier,
            d.view_velocity,
            d.hours_since_post,
            d.acceleration,
            d.estimated_peak_hours,
            d.urgency,
            d.confidence,
        );
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
