//! va-core CLI entry point.
//!
//! Velocity Alerts core binary: scan tracked creators for algorithmic
//! spikes, issue cooldown-gated alerts, and inspect configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use va_common::{Error, OutputFormat, StructuredError, UserId, SCHEMA_VERSION};
use va_config::{
    get_preset, list_presets, load_settings, resolve_config, validate_settings, ConfigPath,
    ConfigSnapshot, ConfigSource, PresetName, Settings, ValidationError,
};
use va_core::alert::LogNotifier;
use va_core::cooldown::{AlertLedger, CooldownGate};
use va_core::detect::recency_cutoff;
use va_core::exit_codes::ExitCode;
use va_core::log_event;
use va_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use va_core::report;
use va_core::scan::{Dataset, Scanner};

/// Velocity Alerts Core - spike detection for tracked creators
#[derive(Parser)]
#[command(name = "va-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a built-in preset instead of the settings file
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: detect, cooldown, alert, notify
    Scan(ScanArgs),

    /// Show spike detections for one creator (no alerts)
    Analyze(AnalyzeArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Dataset JSON (users, creators, posts, snapshots)
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Persist the cooldown ledger at this path
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Only scan this user
    #[arg(long)]
    user: Option<u64>,

    /// Evaluation instant (RFC 3339); defaults to now
    #[arg(long, value_parser = parse_instant)]
    now: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Dataset JSON (users, creators, posts, snapshots)
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Creator handle, with or without '@'
    #[arg(long)]
    creator: String,

    /// Evaluation instant (RFC 3339); defaults to now
    #[arg(long, value_parser = parse_instant)]
    now: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective settings
    Show,

    /// Validate a settings file (defaults to the resolved one)
    Validate {
        /// Path to settings file
        path: Option<PathBuf>,
    },

    /// Show a preset, or list presets when no name is given
    Preset {
        /// Preset name (aggressive, balanced, conservative)
        name: Option<String>,
    },
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC 3339 timestamp: {}", e))
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());
    log_event!(ctx, DEBUG, event_names::RUN_STARTED, Stage::Init, "va-core started",
        version = env!("CARGO_PKG_VERSION"));

    let result = match &cli.command {
        Commands::Scan(args) => run_scan(&cli.global, &ctx, args),
        Commands::Analyze(args) => run_analyze(&cli.global, &ctx, args),
        Commands::Config(args) => run_config(&cli.global, &ctx, args),
        Commands::Version => {
            print_version(&cli.global);
            Ok(ExitCode::Clean)
        }
    };

    let exit_code = result.unwrap_or_else(|err| output_error(&cli.global, &ctx, &err));
    log_event!(ctx, DEBUG, event_names::RUN_FINISHED, Stage::Report, "va-core finished",
        exit_code = exit_code.as_i32());
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Settings
// ============================================================================

fn config_error(err: ValidationError) -> Error {
    match err {
        ValidationError::IoError(msg) | ValidationError::ParseError(msg) => Error::Config(msg),
        other => Error::InvalidSettings(other.to_string()),
    }
}

/// Effective settings plus the snapshot recorded in reports.
fn effective_settings(
    global: &GlobalOpts,
    ctx: &LogContext,
) -> Result<(Settings, ConfigSnapshot), Error> {
    let now = Utc::now();
    if let Some(name) = &global.preset {
        let preset: PresetName = name
            .parse()
            .map_err(|e: va_config::preset::PresetError| Error::Config(e.to_string()))?;
        let mut settings = get_preset(preset);
        settings.apply_env_overrides().map_err(config_error)?;
        validate_settings(&settings).map_err(config_error)?;
        let resolved = ConfigPath {
            path: None,
            source: ConfigSource::BuiltinDefault,
        };
        let mut snapshot = ConfigSnapshot::new(&settings, &resolved, now);
        snapshot.source = format!("preset {}", preset);
        log_event!(ctx, INFO, event_names::CONFIG_LOADED, Stage::Init, "preset loaded",
            preset = preset.as_str());
        return Ok((settings, snapshot));
    }

    let (settings, resolved) = load_settings(global.config.as_deref()).map_err(config_error)?;
    match &resolved.path {
        Some(path) => log_event!(ctx, DEBUG, event_names::CONFIG_LOADED, Stage::Init,
            "settings loaded",
            path = tracing::field::display(path.display()),
            source = tracing::field::display(&resolved.source)),
        None => log_event!(ctx, DEBUG, event_names::CONFIG_DEFAULT_USED, Stage::Init,
            "no settings file, using defaults"),
    }
    let snapshot = ConfigSnapshot::new(&settings, &resolved, now);
    Ok((settings, snapshot))
}

fn load_dataset(path: &Path, ctx: &LogContext) -> Result<Dataset, Error> {
    let dataset = Dataset::from_file(path)?;
    log_event!(ctx, INFO, event_names::INGEST_LOADED, Stage::Ingest, "dataset loaded",
        path = tracing::field::display(path.display()),
        users = dataset.users.len());
    Ok(dataset)
}

// ============================================================================
// Commands
// ============================================================================

fn run_scan(global: &GlobalOpts, ctx: &LogContext, args: &ScanArgs) -> Result<ExitCode, Error> {
    let (settings, snapshot) = effective_settings(global, ctx)?;
    let dataset = load_dataset(&args.input, ctx)?;
    let now = args.now.unwrap_or_else(Utc::now);

    let ledger = match &args.ledger {
        Some(path) => AlertLedger::open(path, settings.alerts.cooldown_hours)?,
        None => AlertLedger::in_memory(settings.alerts.cooldown_hours),
    };
    let expired = ledger.expire_before(recency_cutoff(now))?;
    if expired > 0 {
        tracing::debug!(expired, "pruned stale ledger entries");
    }

    let gate: Arc<dyn CooldownGate> = Arc::new(ledger);
    let scanner = Scanner::new(settings, gate, Arc::new(LogNotifier), ctx.run_id.clone())?;
    let summary = scanner.scan(&dataset, now, args.user.map(UserId))?;

    println!(
        "{}",
        report::render_scan(&summary, &snapshot, &ctx.run_id, global.format)?
    );
    Ok(ExitCode::for_outcome(
        summary.spikes_detected,
        summary.alerts_generated,
    ))
}

fn run_analyze(
    global: &GlobalOpts,
    ctx: &LogContext,
    args: &AnalyzeArgs,
) -> Result<ExitCode, Error> {
    let (settings, snapshot) = effective_settings(global, ctx)?;
    let dataset = load_dataset(&args.input, ctx)?;
    let now = args.now.unwrap_or_else(Utc::now);

    let (owner, creator) =
        dataset
            .creator_by_handle(&args.creator)
            .ok_or_else(|| Error::CreatorNotFound {
                handle: args.creator.clone(),
            })?;

    let scanner = Scanner::new(
        settings.clone(),
        Arc::new(AlertLedger::in_memory(settings.alerts.cooldown_hours)),
        Arc::new(LogNotifier),
        ctx.run_id.clone(),
    )?;
    let creator_report = scanner.report_creator(owner.id, creator, now)?;

    println!(
        "{}",
        report::render_analysis(&creator_report, now, &snapshot, &ctx.run_id, global.format)?
    );
    Ok(ExitCode::for_outcome(creator_report.spikes.len(), 0))
}

fn run_config(
    global: &GlobalOpts,
    ctx: &LogContext,
    args: &ConfigArgs,
) -> Result<ExitCode, Error> {
    match &args.command {
        ConfigCommands::Show => run_config_show(global, ctx),
        ConfigCommands::Validate { path } => run_config_validate(global, path.as_deref()),
        ConfigCommands::Preset { name } => run_config_preset(global, name.as_deref()),
    }
}

fn run_config_show(global: &GlobalOpts, ctx: &LogContext) -> Result<ExitCode, Error> {
    let (settings, snapshot) = effective_settings(global, ctx)?;

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "generated_at": Utc::now().to_rfc3339(),
                "source": {
                    "path": snapshot.path,
                    "kind": snapshot.source,
                    "hash": snapshot.settings_hash,
                },
                "settings": settings,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Summary => {
            println!(
                "[{}] config: {} threshold={}x min_views={} cooldown={}h",
                snapshot.short_id(),
                snapshot.path.as_deref().unwrap_or("built-in defaults"),
                settings.detection.spike_threshold,
                settings.detection.min_views_threshold,
                settings.alerts.cooldown_hours,
            );
        }
        OutputFormat::Md => {
            println!("# va-core config show");
            println!();
            match &snapshot.path {
                Some(path) => println!("Source: {} ({})", path, snapshot.source),
                None => println!("Source: **{}**", snapshot.source),
            }
            println!("Hash: {}", snapshot.short_id());
            println!();
            println!("## Detection");
            println!("- Spike threshold: {}x", settings.detection.spike_threshold);
            println!("- Minimum views: {}", settings.detection.min_views_threshold);
            println!();
            println!("## Scan");
            println!("- Polling interval: {} min", settings.scan.polling_interval_minutes);
            println!("- Baseline posts: {}", settings.scan.baseline_post_count);
            println!();
            println!("## Alerts");
            println!("- Cooldown: {} h", settings.alerts.cooldown_hours);
            println!("- Push enabled: {}", settings.alerts.push_enabled);
        }
    }
    Ok(ExitCode::Clean)
}

fn run_config_validate(global: &GlobalOpts, path: Option<&Path>) -> Result<ExitCode, Error> {
    let resolved = resolve_config(path.or(global.config.as_deref()));
    let Some(file) = resolved.path.as_ref() else {
        return match path {
            Some(p) => Err(Error::Config(format!("{} not found", p.display()))),
            None => {
                print_validated(global, None, &resolved);
                Ok(ExitCode::Clean)
            }
        };
    };

    let settings = Settings::from_file(file).map_err(config_error)?;
    validate_settings(&settings).map_err(config_error)?;
    print_validated(global, Some(file), &resolved);
    Ok(ExitCode::Clean)
}

fn print_validated(global: &GlobalOpts, file: Option<&Path>, resolved: &ConfigPath) {
    let shown = file
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "status": "valid",
                "path": file.map(|p| p.display().to_string()),
                "source": resolved.source.to_string(),
            });
            println!("{:#}", response);
        }
        OutputFormat::Summary => println!("config valid: {}", shown),
        OutputFormat::Md => {
            println!("# va-core config validate");
            println!();
            println!("{} is valid ({}).", shown, resolved.source);
        }
    }
}

fn run_config_preset(global: &GlobalOpts, name: Option<&str>) -> Result<ExitCode, Error> {
    let Some(name) = name else {
        let presets = list_presets();
        match global.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&presets)?),
            _ => {
                for p in &presets {
                    println!("{}: {}", p.name, p.description);
                }
            }
        }
        return Ok(ExitCode::Clean);
    };

    let preset: PresetName = name
        .parse()
        .map_err(|e: va_config::preset::PresetError| Error::Config(e.to_string()))?;
    let settings = get_preset(preset);
    match global.format {
        OutputFormat::Json => println!("{}", settings.to_json_pretty()?),
        OutputFormat::Summary => println!(
            "{}: threshold={}x min_views={} cooldown={}h",
            preset,
            settings.detection.spike_threshold,
            settings.detection.min_views_threshold,
            settings.alerts.cooldown_hours,
        ),
        OutputFormat::Md => {
            println!("# Preset {}", preset);
            println!();
            println!("{}", preset.description());
            println!();
            println!("```json");
            println!("{}", settings.to_json_pretty()?);
            println!("```");
        }
    }
    Ok(ExitCode::Clean)
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            let version_info = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "va_core_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{:#}", version_info);
        }
        _ => {
            println!("va-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

/// Report a failure on stderr in the requested format.
fn output_error(global: &GlobalOpts, ctx: &LogContext, err: &Error) -> ExitCode {
    let exit_code = ExitCode::for_error(err);
    if exit_code == ExitCode::ConfigError {
        log_event!(ctx, ERROR, event_names::CONFIG_ERROR, Stage::Init, "configuration rejected",
            code = err.code(),
            error = tracing::field::display(err));
    } else {
        log_event!(ctx, ERROR, event_names::INTERNAL_ERROR, Stage::Report, "command failed",
            code = err.code(),
            error = tracing::field::display(err));
    }

    match global.format {
        OutputFormat::Json => {
            let structured = StructuredError::from(err).with_context("run_id", &ctx.run_id);
            eprintln!("{}", structured.to_json());
        }
        OutputFormat::Summary => eprintln!("[{}] error {}: {}", ctx.run_id, err.code(), err),
        OutputFormat::Md => {
            eprintln!("# {}", err.headline());
            eprintln!();
            eprintln!("Error: {}", err);
            eprintln!();
            eprintln!("Hint: {}", err.remediation());
        }
    }
    exit_code
}
