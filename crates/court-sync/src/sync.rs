//! Per-location orchestration around the engine: fetch, plan, apply.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use court_engine::window::SyncWindow;
use court_engine::{
    consolidate, is_owned_title, reconcile, CalendarStateIndex, CourtIntervals, DaySlots,
    ReconciliationPlan, SkippedEvent, TimeSlotMatrix,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::calendar::{CalendarClient, DeleteOutcome};
use crate::config::SyncConfig;

/// How a computed plan is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    pub dry_run: bool,
    pub prune_duplicates: bool,
}

/// Plan for one configured location.
#[derive(Debug)]
pub struct LocationPlan {
    pub location: String,
    pub calendar_id: String,
    pub plan: ReconciliationPlan,
    pub skipped: Vec<SkippedEvent>,
    pub foreign: usize,
}

/// Counts reported after applying (or dry-running) a location's plan.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct LocationSummary {
    pub location: String,
    pub calendar_id: String,
    pub created: usize,
    pub deleted: usize,
    pub already_missing: usize,
    pub failed: usize,
    pub dry_run: bool,
}

/// Resolve the sync window relative to `today`.
pub fn sync_window(config: &SyncConfig, today: NaiveDate) -> Result<SyncWindow> {
    SyncWindow::upcoming(today, config.start_offset_days, config.sync_days)
        .context("Sync window is empty or out of range")
}

/// Build per-location plans. Touches the calendar read-only.
pub fn plan_all(
    config: &SyncConfig,
    tz: Tz,
    window: &SyncWindow,
    days: &[DaySlots],
    client: &dyn CalendarClient,
) -> Result<Vec<LocationPlan>> {
    let in_window: Vec<DaySlots> = days
        .iter()
        .filter(|day| window.contains(day.date))
        .cloned()
        .collect();
    if in_window.len() < days.len() {
        warn!(
            dropped = days.len() - in_window.len(),
            "ignoring slot days outside the sync window"
        );
    }
    let missing = window
        .dates()
        .filter(|date| !in_window.iter().any(|day| day.date == *date))
        .count();
    if missing > 0 {
        warn!(missing, "sync window days absent from slot input are treated as free");
    }

    let matrix = TimeSlotMatrix::from_days(&in_window).context("Slot input rejected")?;
    let desired = consolidate(&matrix, tz);
    info!(
        days = in_window.len(),
        intervals = desired.interval_count(),
        "consolidated slot input"
    );

    for (location, _) in desired.locations() {
        if !config.locations.contains_key(location) {
            warn!(location, "no calendar configured for location; skipping");
        }
    }

    let (time_min, time_max) = window.bounds(tz);
    let empty = CourtIntervals::new();
    let mut plans = Vec::with_capacity(config.locations.len());
    for (location, calendar_id) in &config.locations {
        let wanted = desired.for_location(location).unwrap_or_else(|| {
            warn!(location = %location, "no courts reported; all owned events will be removed");
            &empty
        });
        plans.push(plan_location(
            location,
            calendar_id,
            wanted,
            client,
            tz,
            (time_min, time_max),
        )?);
    }
    Ok(plans)
}

fn plan_location(
    location: &str,
    calendar_id: &str,
    wanted: &CourtIntervals,
    client: &dyn CalendarClient,
    tz: Tz,
    (time_min, time_max): (DateTime<Tz>, DateTime<Tz>),
) -> Result<LocationPlan> {
    let existing = client
        .list_events(calendar_id, time_min, time_max)
        .with_context(|| format!("Failed to list events for {}", location))?;
    let index = CalendarStateIndex::build(&existing, tz);

    for skipped in index.skipped() {
        warn!(location, id = %skipped.id, error = %skipped.error, "ignoring owned event");
    }
    if !index.duplicates().is_empty() {
        warn!(
            location,
            count = index.duplicates().len(),
            "duplicate owned events found"
        );
    }

    let plan = reconcile(wanted, &index);
    info!(
        location,
        existing = index.owned_count(),
        foreign = index.foreign_count(),
        create = plan.to_create.len(),
        delete = plan.to_delete.len(),
        "reconciled"
    );

    Ok(LocationPlan {
        location: location.to_string(),
        calendar_id: calendar_id.to_string(),
        plan,
        skipped: index.skipped().to_vec(),
        foreign: index.foreign_count(),
    })
}

/// Apply one location's plan. Individual failures are logged and counted;
/// the remaining operations still run.
pub fn apply_plan(
    planned: &LocationPlan,
    client: &mut dyn CalendarClient,
    options: ApplyOptions,
) -> LocationSummary {
    let mut summary = LocationSummary {
        location: planned.location.clone(),
        calendar_id: planned.calendar_id.clone(),
        dry_run: options.dry_run,
        ..LocationSummary::default()
    };
    let calendar_id = planned.calendar_id.as_str();

    let deletions = if options.prune_duplicates {
        planned.plan.deletions_with_duplicates()
    } else {
        planned.plan.to_delete.clone()
    };

    for id in &deletions {
        if options.dry_run {
            info!(calendar_id, id = %id, "[dry-run] would delete event");
            summary.deleted += 1;
            continue;
        }
        delete_one(client, calendar_id, id, &mut summary);
    }

    for event in &planned.plan.to_create {
        if options.dry_run {
            info!(
                calendar_id,
                title = event.title(),
                start = %event.start.to_rfc3339(),
                end = %event.end.to_rfc3339(),
                "[dry-run] would create event"
            );
            summary.created += 1;
            continue;
        }
        match client.insert_event(calendar_id, event) {
            Ok(id) => {
                debug!(calendar_id, id = %id, title = event.title(), "created event");
                summary.created += 1;
            }
            Err(e) => {
                error!(calendar_id, title = event.title(), error = ?e, "create failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        location = %summary.location,
        created = summary.created,
        deleted = summary.deleted,
        failed = summary.failed,
        dry_run = summary.dry_run,
        "location done"
    );
    summary
}

/// Delete every owned event in `window`, leaving foreign events alone.
pub fn purge_location(
    location: &str,
    calendar_id: &str,
    client: &mut dyn CalendarClient,
    tz: Tz,
    window: &SyncWindow,
    dry_run: bool,
) -> Result<LocationSummary> {
    let (time_min, time_max) = window.bounds(tz);
    let existing = client
        .list_events(calendar_id, time_min, time_max)
        .with_context(|| format!("Failed to list events for {}", location))?;

    let mut summary = LocationSummary {
        location: location.to_string(),
        calendar_id: calendar_id.to_string(),
        dry_run,
        ..LocationSummary::default()
    };
    let owned: Vec<_> = existing
        .iter()
        .filter(|event| is_owned_title(&event.title))
        .collect();
    info!(location, owned = owned.len(), total = existing.len(), "purging owned events");

    for event in owned {
        if dry_run {
            info!(calendar_id, id = %event.id, title = %event.title, "[dry-run] would delete event");
            summary.deleted += 1;
        } else {
            delete_one(client, calendar_id, &event.id, &mut summary);
        }
    }
    Ok(summary)
}

fn delete_one(
    client: &mut dyn CalendarClient,
    calendar_id: &str,
    id: &str,
    summary: &mut LocationSummary,
) {
    match client.delete_event(calendar_id, id) {
        Ok(DeleteOutcome::Deleted) => {
            debug!(calendar_id, id, "deleted event");
            summary.deleted += 1;
        }
        Ok(DeleteOutcome::Missing) => {
            warn!(calendar_id, id, "event already deleted or not found");
            summary.already_missing += 1;
        }
        Err(e) => {
            error!(calendar_id, id, error = ?e, "delete failed");
            summary.failed += 1;
        }
    }
}
