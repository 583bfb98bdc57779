//! `court-sync` — mirror scraped tennis court bookings into per-location
//! calendars.
//!
//! ## Usage
//!
//! ```sh
//! # Show the dates a sync run covers
//! court-sync window --config sync.json
//!
//! # Print the create/delete plan without touching the calendar
//! court-sync plan --config sync.json --slots slots.json --calendar calendar.json
//!
//! # Apply the plan (or just log it with --dry-run)
//! court-sync sync --config sync.json --slots slots.json --calendar calendar.json
//!
//! # Remove every event this tool created in the next 90 days
//! court-sync purge --config sync.json --calendar calendar.json --dry-run
//! ```
//!
//! Logs go to stderr (`RUST_LOG` overrides the level); JSON reports go to
//! stdout.

mod calendar;
mod config;
mod input;
mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use court_engine::window::{SyncWindow, DEFAULT_PURGE_DAYS};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::calendar::FileCalendar;
use crate::config::SyncConfig;
use crate::sync::{ApplyOptions, LocationPlan, LocationSummary};

#[derive(Parser)]
#[command(
    name = "court-sync",
    version,
    about = "Sync tennis court bookings into calendars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dates covered by a sync run
    Window {
        /// Config file (defaults apply if omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override today's date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Compute and print the reconciliation plan; changes nothing
    Plan {
        #[arg(short, long)]
        config: PathBuf,
        /// Slot Extractor output (JSON)
        #[arg(short, long)]
        slots: PathBuf,
        /// Calendar state file (JSON)
        #[arg(long)]
        calendar: PathBuf,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Compute the plan and apply it to the calendar
    Sync {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        slots: PathBuf,
        #[arg(long)]
        calendar: PathBuf,
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Log planned changes without applying them
        #[arg(long)]
        dry_run: bool,
        /// Also delete surplus duplicate events
        #[arg(long)]
        prune_duplicates: bool,
    },
    /// Delete every event this tool created within the next N days
    Purge {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        calendar: PathBuf,
        /// Number of days from today to clear
        #[arg(long, default_value_t = DEFAULT_PURGE_DAYS)]
        days: u32,
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Log deletions without performing them
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Window { config, today } => {
            let config = SyncConfig::load_or_default(config.as_deref())?;
            let tz = config.tz()?;
            let window = sync::sync_window(&config, today_in(tz, today))?;
            for date in window.dates() {
                println!("{}", date);
            }
        }
        Commands::Plan {
            config,
            slots,
            calendar,
            today,
        } => {
            let (config, tz) = load_config(&config)?;
            let window = sync::sync_window(&config, today_in(tz, today))?;
            let days = input::load_days(&slots)?;
            let client = FileCalendar::open(&calendar)?;

            let plans = sync::plan_all(&config, tz, &window, &days, &client)?;
            let report: Vec<PlanReport> = plans.iter().map(PlanReport::from).collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Sync {
            config,
            slots,
            calendar,
            today,
            dry_run,
            prune_duplicates,
        } => {
            let (config, tz) = load_config(&config)?;
            let window = sync::sync_window(&config, today_in(tz, today))?;
            info!(
                first = %window.first(),
                last = %window.last(),
                dry_run,
                "starting court sync"
            );
            let days = input::load_days(&slots)?;
            let mut client = FileCalendar::open(&calendar)?;

            let plans = sync::plan_all(&config, tz, &window, &days, &client)?;
            let options = ApplyOptions {
                dry_run,
                prune_duplicates,
            };
            let summaries: Vec<LocationSummary> = plans
                .iter()
                .map(|planned| sync::apply_plan(planned, &mut client, options))
                .collect();
            if !dry_run {
                client.save()?;
            }
            finish(&summaries)?;
        }
        Commands::Purge {
            config,
            calendar,
            days,
            today,
            dry_run,
        } => {
            let (config, tz) = load_config(&config)?;
            let window = SyncWindow::from_today(today_in(tz, today), days)
                .context("Purge window is empty or out of range")?;
            info!(
                first = %window.first(),
                last = %window.last(),
                dry_run,
                "starting purge"
            );
            let mut client = FileCalendar::open(&calendar)?;

            let summaries = config
                .locations
                .iter()
                .map(|(location, calendar_id)| {
                    sync::purge_location(location, calendar_id, &mut client, tz, &window, dry_run)
                })
                .collect::<Result<Vec<_>>>()?;
            if !dry_run {
                client.save()?;
            }
            finish(&summaries)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "court_sync=debug,court_engine=debug"
    } else {
        "court_sync=info,court_engine=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> Result<(SyncConfig, Tz)> {
    let config = SyncConfig::load(path)?;
    let tz = config.validate()?;
    Ok((config, tz))
}

/// Today's date in the venue's timezone unless overridden.
fn today_in(tz: Tz, today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive())
}

/// Print the run summary and fail the process if any operation failed.
fn finish(summaries: &[LocationSummary]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summaries)?);
    let failed: usize = summaries.iter().map(|s| s.failed).sum();
    if failed > 0 {
        anyhow::bail!("{} calendar operation(s) failed", failed);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON report DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct PlannedEventReport {
    title: String,
    start: String,
    end: String,
}

#[derive(Serialize)]
struct SkippedReport {
    id: String,
    error: String,
}

#[derive(Serialize)]
struct PlanReport {
    location: String,
    calendar_id: String,
    to_create: Vec<PlannedEventReport>,
    to_delete: Vec<String>,
    surplus_duplicates: Vec<String>,
    skipped: Vec<SkippedReport>,
    foreign_events: usize,
}

impl From<&LocationPlan> for PlanReport {
    fn from(p: &LocationPlan) -> Self {
        Self {
            location: p.location.clone(),
            calendar_id: p.calendar_id.clone(),
            to_create: p
                .plan
                .to_create
                .iter()
                .map(|e| PlannedEventReport {
                    title: e.title().to_string(),
                    start: e.start.to_rfc3339(),
                    end: e.end.to_rfc3339(),
                })
                .collect(),
            to_delete: p.plan.to_delete.clone(),
            surplus_duplicates: p.plan.surplus_duplicates.clone(),
            skipped: p
                .skipped
                .iter()
                .map(|s| SkippedReport {
                    id: s.id.clone(),
                    error: s.error.to_string(),
                })
                .collect(),
            foreign_events: p.foreign,
        }
    }
}
