//! Half-hour occupancy table across the whole sync window.
//!
//! The Slot Extractor hands over one [`DaySlots`] per scraped day. This module
//! validates each court-day against the fixed 48-boundary grid, drops
//! non-tennis resources, normalizes court names, and fills in all-free rows for
//! days on which a court was not reported.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::court::{is_tennis_court, normalize_court_name};
use crate::error::{Result, SyncError};

/// Number of half-hour boundaries in a day.
pub const SLOTS_PER_DAY: usize = 48;

/// Length of one slot in minutes.
pub const SLOT_MINUTES: i64 = 30;

/// Occupancy for one court across one day, indexed by slot number.
pub type SlotRow = [bool; SLOTS_PER_DAY];

/// Time-of-day of slot `index` (`0` is `00:00`, `47` is `23:30`).
///
/// Returns `None` for indices outside the grid.
pub fn slot_time(index: usize) -> Option<NaiveTime> {
    if index >= SLOTS_PER_DAY {
        return None;
    }
    let minutes = index as u32 * SLOT_MINUTES as u32;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/// Slot index of a grid-aligned time-of-day, `None` if `time` is off the grid.
pub fn slot_index(time: NaiveTime) -> Option<usize> {
    if time.second() != 0 || time.nanosecond() != 0 || time.minute() % 30 != 0 {
        return None;
    }
    Some((time.hour() * 2 + time.minute() / 30) as usize)
}

/// Slot Extractor output for a single scraped day:
/// location → raw court name → time-of-day → occupied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub locations: BTreeMap<String, BTreeMap<String, BTreeMap<NaiveTime, bool>>>,
}

impl DaySlots {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            locations: BTreeMap::new(),
        }
    }
}

/// Immutable (location, court, date) → [`SlotRow`] table.
///
/// Every court discovered anywhere in the input has a row for every date in
/// the input; dates on which it was not reported are all-free.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSlotMatrix {
    dates: BTreeSet<NaiveDate>,
    rows: BTreeMap<String, BTreeMap<String, BTreeMap<NaiveDate, SlotRow>>>,
}

impl TimeSlotMatrix {
    /// Build the matrix from per-day extractor output.
    ///
    /// # Errors
    /// - [`SyncError::MalformedSlotGrid`] if any tennis court-day deviates from
    ///   the 48-entry half-hour grid, or a date with tennis courts appears in
    ///   more than one [`DaySlots`].
    /// - [`SyncError::MalformedCourtName`] if a tennis court name cannot be
    ///   normalized.
    ///
    /// Either error aborts the whole build; no partial matrix is returned.
    pub fn from_days(days: &[DaySlots]) -> Result<Self> {
        let mut dates = BTreeSet::new();
        let mut reported: BTreeMap<String, BTreeMap<String, BTreeMap<NaiveDate, SlotRow>>> =
            BTreeMap::new();

        for day in days {
            let repeated = !dates.insert(day.date);
            for (location, courts) in &day.locations {
                for (raw_court, slots) in courts {
                    if !is_tennis_court(raw_court) {
                        continue;
                    }
                    if repeated {
                        return Err(SyncError::MalformedSlotGrid {
                            date: day.date,
                            location: location.clone(),
                            court: raw_court.clone(),
                            reason: "date reported more than once".to_string(),
                        });
                    }
                    let court = normalize_court_name(raw_court)?;
                    let row = grid_row(day.date, location, raw_court, slots)?;

                    let entry = reported
                        .entry(location.clone())
                        .or_default()
                        .entry(court)
                        .or_default()
                        .entry(day.date)
                        .or_insert([false; SLOTS_PER_DAY]);
                    // Two raw names for the same court on one day: occupied wins.
                    for (cell, occupied) in entry.iter_mut().zip(row) {
                        *cell |= occupied;
                    }
                }
            }
        }

        for courts in reported.values_mut() {
            for by_date in courts.values_mut() {
                for date in &dates {
                    by_date.entry(*date).or_insert([false; SLOTS_PER_DAY]);
                }
            }
        }

        Ok(Self {
            dates,
            rows: reported,
        })
    }

    /// All dates covered, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    /// Locations with at least one tennis court.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Normalized court names at `location`, ascending.
    pub fn courts<'a>(&'a self, location: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .get(location)
            .into_iter()
            .flat_map(|courts| courts.keys().map(String::as_str))
    }

    /// Per-date rows for one court, ascending by date.
    pub fn court_days(
        &self,
        location: &str,
        court: &str,
    ) -> Option<&BTreeMap<NaiveDate, SlotRow>> {
        self.rows.get(location)?.get(court)
    }

    pub fn row(&self, location: &str, court: &str, date: NaiveDate) -> Option<&SlotRow> {
        self.court_days(location, court)?.get(&date)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Validate one court-day against the fixed grid and flatten it.
fn grid_row(
    date: NaiveDate,
    location: &str,
    court: &str,
    slots: &BTreeMap<NaiveTime, bool>,
) -> Result<SlotRow> {
    let malformed = |reason: String| SyncError::MalformedSlotGrid {
        date,
        location: location.to_string(),
        court: court.to_string(),
        reason,
    };

    let mut row = [false; SLOTS_PER_DAY];
    let mut seen = [false; SLOTS_PER_DAY];
    for (time, occupied) in slots {
        let index = slot_index(*time)
            .ok_or_else(|| malformed(format!("unexpected boundary {}", time.format("%H:%M:%S"))))?;
        seen[index] = true;
        row[index] = *occupied;
    }

    if let Some(missing) = seen.iter().position(|s| !s) {
        let time = slot_time(missing).map(|t| t.format("%H:%M").to_string());
        return Err(malformed(format!(
            "missing boundary {} ({} of {} present)",
            time.unwrap_or_default(),
            slots.len(),
            SLOTS_PER_DAY
        )));
    }

    Ok(row)
}
