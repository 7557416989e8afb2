//! Scan orchestration: detect → cooldown → alert → notify.
//!
//! Creators are analysed in parallel; each creator's engine pass is
//! independent. Alerts are then issued sequentially per user so ids and
//! ledger writes stay ordered.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info_span, warn};
use va_common::{
    Alert, Creator, CreatorId, Error, Post, PostMetrics, Result, ScanId, SpikeDetection,
    UserId, UserProfile,
};
use va_config::Settings;

use crate::alert::{self, Notifier};
use crate::baseline;
use crate::cooldown::CooldownGate;
use crate::detect::{CreatorAnalysis, ExclusionCounts, VelocityEngine};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};

/// Everything a scan reads: users, their tracked creators, and posts with
/// snapshot history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<UserProfile>,
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidDataset(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidDataset(format!("{}: {}", path.display(), reason));
        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))
    }

    pub fn user(&self, id: UserId) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.id == id)
    }

    /// First creator with this handle, across all users, with its owner.
    pub fn creator_by_handle(&self, handle: &str) -> Option<(&UserProfile, &Creator)> {
        let wanted = handle.trim_start_matches('@');
        self.users.iter().find_map(|u| {
            u.creators
                .iter()
                .find(|c| c.handle.eq_ignore_ascii_case(wanted))
                .map(|c| (u, c))
        })
    }
}

/// Engine output for one creator.
#[derive(Debug, Clone, Serialize)]
pub struct CreatorReport {
    pub user_id: UserId,
    pub creator_id: CreatorId,
    pub handle: String,
    pub baseline_views: f64,
    pub posts_in_window: usize,
    pub excluded: ExclusionCounts,
    /// Spikes, highest multiplier first.
    pub spikes: Vec<SpikeDetection>,
}

impl CreatorReport {
    fn new(user_id: UserId, creator: &Creator, baseline_views: f64, analysis: CreatorAnalysis) -> Self {
        CreatorReport {
            user_id,
            creator_id: creator.id,
            handle: creator.handle.clone(),
            baseline_views,
            posts_in_window: analysis.posts_in_window,
            excluded: analysis.excluded,
            spikes: analysis.spikes,
        }
    }
}

/// Result of one scan pass.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub scan_id: ScanId,
    pub evaluated_at: DateTime<Utc>,
    pub users_scanned: usize,
    pub creators_scanned: usize,
    pub creators_failed: usize,
    pub posts_scanned: usize,
    pub spikes_detected: usize,
    pub alerts_generated: usize,
    pub alerts_suppressed: usize,
    pub alerts: Vec<Alert>,
    pub creators: Vec<CreatorReport>,
    /// Derived metrics for every scored post, for the caller to store.
    pub metrics: Vec<PostMetrics>,
}

impl ScanSummary {
    fn new(scan_id: ScanId, now: DateTime<Utc>) -> Self {
        ScanSummary {
            scan_id,
            evaluated_at: now,
            users_scanned: 0,
            creators_scanned: 0,
            creators_failed: 0,
            posts_scanned: 0,
            spikes_detected: 0,
            alerts_generated: 0,
            alerts_suppressed: 0,
            alerts: Vec::new(),
            creators: Vec::new(),
            metrics: Vec::new(),
        }
    }
}

/// Runs the full pipeline over a dataset.
pub struct Scanner {
    settings: Settings,
    engine: VelocityEngine,
    gate: Arc<dyn CooldownGate>,
    notifier: Arc<dyn Notifier>,
    pool: Option<rayon::ThreadPool>,
    log: LogContext,
}

impl Scanner {
    pub fn new(
        settings: Settings,
        gate: Arc<dyn CooldownGate>,
        notifier: Arc<dyn Notifier>,
        run_id: impl Into<String>,
    ) -> Result<Self> {
        let pool = match settings.scan.max_parallel_creators {
            0 => None,
            n => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| Error::Config(format!("thread pool: {}", e)))?,
            ),
        };
        Ok(Scanner {
            engine: VelocityEngine::new(settings.detection),
            settings,
            gate,
            notifier,
            pool,
            log: LogContext::new(run_id),
        })
    }

    pub fn engine(&self) -> &VelocityEngine {
        &self.engine
    }

    /// Scan every user (or just `only_user`) at instant `now`.
    pub fn scan(
        &self,
        dataset: &Dataset,
        now: DateTime<Utc>,
        only_user: Option<UserId>,
    ) -> Result<ScanSummary> {
        let users: Vec<&UserProfile> = match only_user {
            Some(id) => vec![dataset
                .user(id)
                .ok_or(Error::UserNotFound { user_id: id.0 })?],
            None => dataset.users.iter().collect(),
        };

        let scan_id = ScanId::at(now);
        let log = self.log.clone().with_scan_id(scan_id.to_string());
        let span = info_span!("scan", run_id = %log.run_id, scan_id = %scan_id);
        let _enter = span.enter();

        log_event!(log, INFO, event_names::SCAN_STARTED, Stage::Detect, "scan started",
            users = users.len());

        let mut summary = ScanSummary::new(scan_id, now);
        for user in users {
            self.scan_user(user, now, &log, &mut summary);
        }

        log_event!(log, INFO, event_names::SCAN_FINISHED, Stage::Report, "scan finished",
            posts_scanned = summary.posts_scanned,
            spikes_detected = summary.spikes_detected,
            alerts_generated = summary.alerts_generated,
            alerts_suppressed = summary.alerts_suppressed);
        Ok(summary)
    }

    fn scan_user(
        &self,
        user: &UserProfile,
        now: DateTime<Utc>,
        log: &LogContext,
        summary: &mut ScanSummary,
    ) {
        summary.users_scanned += 1;
        let creators: Vec<&Creator> = user.creators.iter().filter(|c| c.is_active).collect();
        let outcomes = self.analyze_all(&creators, now);

        for (creator, outcome) in creators.into_iter().zip(outcomes) {
            summary.creators_scanned += 1;
            summary.posts_scanned += creator.posts.len();

            let (baseline_views, analysis) = match outcome {
                Ok(ok) => ok,
                Err(err) => {
                    summary.creators_failed += 1;
                    log_event!(log, WARN, event_names::DETECT_CREATOR_FAILED, Stage::Detect,
                        "creator analysis failed",
                        creator = creator.handle.as_str(),
                        error = tracing::field::display(&err));
                    continue;
                }
            };

            log_event!(log, DEBUG, event_names::DETECT_CREATOR_DONE, Stage::Detect,
                "creator analysed",
                creator = creator.handle.as_str(),
                baseline = baseline_views,
                spikes = analysis.spikes.len());

            summary.spikes_detected += analysis.spikes.len();
            summary.metrics.extend_from_slice(&analysis.metrics);

            for detection in &analysis.spikes {
                if let Err(err) = self.issue(user, creator, detection, now, log, summary) {
                    warn!(creator = %creator.handle, post_id = %detection.post_id, error = %err,
                        "alert not issued");
                }
            }

            summary
                .creators
                .push(CreatorReport::new(user.id, creator, baseline_views, analysis));
        }
    }

    fn analyze_all(
        &self,
        creators: &[&Creator],
        now: DateTime<Utc>,
    ) -> Vec<Result<(f64, CreatorAnalysis)>> {
        let run = || -> Vec<Result<(f64, CreatorAnalysis)>> {
            creators
                .par_iter()
                .map(|creator| self.analyze_creator(creator, now))
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Detections for one creator, without cooldown or alerts.
    pub fn report_creator(
        &self,
        user_id: UserId,
        creator: &Creator,
        now: DateTime<Utc>,
    ) -> Result<CreatorReport> {
        let (baseline_views, analysis) = self.analyze_creator(creator, now)?;
        Ok(CreatorReport::new(user_id, creator, baseline_views, analysis))
    }

    /// Baseline plus engine pass for one creator.
    pub fn analyze_creator(
        &self,
        creator: &Creator,
        now: DateTime<Utc>,
    ) -> Result<(f64, CreatorAnalysis)> {
        if let Some(stray) = creator.posts.iter().find(|p| p.creator_id != creator.id) {
            return Err(Error::Detection {
                handle: creator.handle.clone(),
                reason: format!(
                    "post {} belongs to creator {}, not {}",
                    stray.id, stray.creator_id, creator.id
                ),
            });
        }
        let baseline_views = baseline::resolve(creator, &self.settings.scan);
        let analysis = self
            .engine
            .analyze_creator_detailed(baseline_views, &creator.posts, now);
        Ok((baseline_views, analysis))
    }

    fn issue(
        &self,
        user: &UserProfile,
        creator: &Creator,
        detection: &SpikeDetection,
        now: DateTime<Utc>,
        log: &LogContext,
        summary: &mut ScanSummary,
    ) -> Result<()> {
        if self.gate.is_active(user.id, detection.post_id, now)? {
            summary.alerts_suppressed += 1;
            log_event!(log, DEBUG, event_names::ALERT_SUPPRESSED_COOLDOWN, Stage::Cooldown,
                "cooldown active",
                user_id = user.id.0,
                post_id = detection.post_id.0);
            return Ok(());
        }

        let post = find_post(creator, detection)?;
        let mut alert = alert::compose(self.gate.next_alert_id()?, user, creator, post, detection, now);

        log_event!(log, INFO, event_names::ALERT_GENERATED, Stage::Alert, "alert generated",
            alert_id = alert.id.0,
            user = user.username.as_str(),
            creator = alert.creator_handle.as_str(),
            multiplier = alert.velocity_multiplier,
            urgency = alert.urgency.as_str());

        match alert::deliver(
            self.notifier.as_ref(),
            user,
            &mut alert,
            self.settings.alerts.push_enabled,
            now,
        ) {
            Ok(true) => log_event!(log, DEBUG, event_names::NOTIFY_SENT, Stage::Notify,
                "push sent", alert_id = alert.id.0),
            Ok(false) => {}
            Err(err) => log_event!(log, WARN, event_names::NOTIFY_FAILED, Stage::Notify,
                "push failed", alert_id = alert.id.0, error = tracing::field::display(&err)),
        }
        // Recorded after delivery so the ledger keeps the final status.
        self.gate.record(&alert)?;

        summary.alerts_generated += 1;
        summary.alerts.push(alert);
        Ok(())
    }
}

fn find_post<'a>(creator: &'a Creator, detection: &SpikeDetection) -> Result<&'a Post> {
    creator
        .posts
        .iter()
        .find(|p| p.id == detection.post_id)
        .ok_or_else(|| {
            Error::AlertComposition(format!(
                "post {} missing from creator {}",
                detection.post_id, creator.handle
            ))
        })
}
