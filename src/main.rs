//! CLI entry point for the stop frequency tier classifier.
//!
//! Loads a weekday and a weekend schedule, classifies every stop into the
//! configured frequency tiers and writes one CSV row per stop.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use stop_tiers::classifier::{classify_all, merge_results};
use stop_tiers::config::TierConfig;
use stop_tiers::loader::{STOPS_FILE, load_schedule, load_stops};
use stop_tiers::output::{RunSummary, write_final_table, write_summary};
use stop_tiers::table::StopSet;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "stop_tiers")]
#[command(about = "Classify transit stops into service frequency tiers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every stop and write the per-stop tier table
    Classify {
        /// CSV file to write results to
        #[arg(value_name = "OUTPUT")]
        output: String,

        /// Directory holding the weekday reference-date tables
        #[arg(value_name = "WEEKDAY_DIR")]
        weekday: PathBuf,

        /// Directory holding the weekend reference-date tables
        #[arg(value_name = "WEEKEND_DIR")]
        weekend: PathBuf,

        /// Canonical stop table (defaults to stops.csv in the weekday directory)
        #[arg(long)]
        stops: Option<PathBuf>,

        /// JSON tier table replacing the built-in tiers
        #[arg(long)]
        tiers: Option<String>,

        /// Disable a tier by column id (repeatable)
        #[arg(long = "disable", value_name = "COLUMN")]
        disabled: Vec<String>,

        /// Optional: write a JSON run summary here
        #[arg(long)]
        summary: Option<String>,
    },
    /// Print the built-in tier table as JSON
    Tiers,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/stop_tiers.log".to_string());
    let _log_guard = init_tracing(Path::new(&log_file_path));

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            output,
            weekday,
            weekend,
            stops,
            tiers,
            disabled,
            summary,
        } => {
            let mut config = match tiers {
                Some(path) => TierConfig::load(&path)?,
                None => TierConfig::default(),
            };
            for column in &disabled {
                config.disable(column);
            }
            config.validate()?;

            let stops_path = stops.unwrap_or_else(|| weekday.join(STOPS_FILE));
            classify(&config, &output, &weekday, &weekend, &stops_path, summary.as_deref())?;
        }
        Commands::Tiers => {
            println!("{}", serde_json::to_string_pretty(&TierConfig::default())?);
        }
    }

    Ok(())
}

/// Installs a colored stderr layer (`RUST_LOG`, default info) and a JSON
/// daily rolling file layer (`RUST_LOG_JSON`, default debug).
///
/// The returned guard flushes the file writer on drop and must outlive the run.
fn init_tracing(log_file: &Path) -> WorkerGuard {
    let log_dir = log_file.parent().unwrap_or(Path::new("logs"));
    let log_name = log_file
        .file_name()
        .unwrap_or(OsStr::new("stop_tiers.log"));
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, log_name));

    let filter = |var: &str, default: LevelFilter| {
        EnvFilter::builder()
            .with_default_directive(default.into())
            .with_env_var(var)
            .from_env_lossy()
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(std::io::stderr)
                .with_filter(filter("RUST_LOG", LevelFilter::INFO)),
        )
        .with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(file_writer)
                .with_filter(filter("RUST_LOG_JSON", LevelFilter::DEBUG)),
        )
        .init();

    guard
}

/// Runs every enabled tier and writes the merged table.
///
/// Tiers that fail on missing input leave their column empty; the table is
/// still written and the run then reports the failed tiers as an error.
#[tracing::instrument(skip(config, summary_path))]
fn classify(
    config: &TierConfig,
    output: &str,
    weekday_dir: &Path,
    weekend_dir: &Path,
    stops_path: &Path,
    summary_path: Option<&str>,
) -> Result<()> {
    let weekday = load_schedule(weekday_dir, "weekday")?;
    let weekend = load_schedule(weekend_dir, "weekend")?;
    let coordinates = load_stops(stops_path)?;

    let enabled = config.enabled().count();
    info!(
        enabled,
        configured = config.tiers.len(),
        "Classifying frequency tiers"
    );
    if enabled == 0 {
        warn!("All tiers are disabled; output will only list stops");
    }

    let outcomes = classify_all(&config.tiers, &weekday, &weekend);
    let tier_sets: Vec<(String, StopSet)> = outcomes
        .iter()
        .map(|outcome| (outcome.column.clone(), outcome.stops()))
        .collect();

    let table = merge_results(&tier_sets, &coordinates);
    write_final_table(output, &table)?;

    let summary = RunSummary::new(&config.tiers, &outcomes, &table);
    for tier in &summary.tiers {
        info!(
            tier = %tier.column,
            status = ?tier.status,
            stops = tier.qualifying_stops,
            "Tier summary"
        );
    }
    if let Some(path) = summary_path {
        write_summary(path, &summary)?;
    }

    let failed: Vec<&str> = summary.failed().map(|t| t.column.as_str()).collect();
    if !failed.is_empty() {
        error!(failed = ?failed, "Some tiers could not be classified");
        bail!("tiers failed: {}", failed.join(", "));
    }

    info!(rows = table.rows.len(), "Classification complete");
    Ok(())
}
