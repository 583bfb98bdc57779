//! Run-length merge of half-hour slots into booking intervals.
//!
//! Each run of consecutive occupied slots within one day becomes a single
//! `[start, end)` interval. Runs never continue across midnight.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::dst::{localize, start_of_day};
use crate::slots::{slot_time, SlotRow, TimeSlotMatrix, SLOTS_PER_DAY, SLOT_MINUTES};

/// One merged run of occupied slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingInterval {
    pub location: String,
    /// Normalized court name, also used as the calendar event title.
    pub court: String,
    pub start: DateTime<Tz>,
    /// Exclusive.
    pub end: DateTime<Tz>,
}

impl BookingInterval {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Desired intervals for one location: court → intervals ordered by start.
pub type CourtIntervals = BTreeMap<String, Vec<BookingInterval>>;

/// Desired state for a whole run: location → court → intervals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredEventSet {
    locations: BTreeMap<String, CourtIntervals>,
}

impl DesiredEventSet {
    /// Desired intervals for `location`, or `None` if the input reported no
    /// tennis courts there.
    pub fn for_location(&self, location: &str) -> Option<&CourtIntervals> {
        self.locations.get(location)
    }

    pub fn locations(&self) -> impl Iterator<Item = (&str, &CourtIntervals)> {
        self.locations.iter().map(|(l, c)| (l.as_str(), c))
    }

    /// Total number of intervals across all locations and courts.
    pub fn interval_count(&self) -> usize {
        self.locations
            .values()
            .flat_map(|courts| courts.values())
            .map(Vec::len)
            .sum()
    }
}

/// Merge one court-day into booking intervals.
///
/// Every occupied slot contributes 30 minutes; a run of N occupied slots
/// starting at slot `i` ends at the boundary of slot `i + N`, with slot 48
/// being midnight of the following day. Boundaries are localized in `tz`, so
/// on DST transition days the absolute length follows the timezone rules.
/// A run that lies entirely inside a spring-forward gap would collapse to
/// zero length; it keeps its booked length from the shifted start instead,
/// so no occupied slot is ever lost.
pub fn consolidate_day(
    location: &str,
    court: &str,
    date: NaiveDate,
    row: &SlotRow,
    tz: Tz,
) -> Vec<BookingInterval> {
    let mut intervals = Vec::new();
    let mut pending: Option<usize> = None;

    for (index, occupied) in row.iter().enumerate() {
        match (pending, *occupied) {
            (None, true) => pending = Some(index),
            (Some(start), false) => {
                intervals.push(interval(location, court, date, start, index, tz));
                pending = None;
            }
            _ => {}
        }
    }
    if let Some(start) = pending {
        intervals.push(interval(location, court, date, start, SLOTS_PER_DAY, tz));
    }

    intervals
}

/// Consolidate every court in the matrix.
///
/// Output per court is the concatenation of its per-day intervals in date
/// order. Courts with no occupied slots still appear, with an empty list.
pub fn consolidate(matrix: &TimeSlotMatrix, tz: Tz) -> DesiredEventSet {
    let mut locations = BTreeMap::new();

    for location in matrix.locations() {
        let mut courts = CourtIntervals::new();
        for court in matrix.courts(location) {
            let intervals = matrix
                .court_days(location, court)
                .into_iter()
                .flatten()
                .flat_map(|(date, row)| consolidate_day(location, court, *date, row, tz))
                .collect();
            courts.insert(court.to_string(), intervals);
        }
        locations.insert(location.to_string(), courts);
    }

    DesiredEventSet { locations }
}

fn interval(
    location: &str,
    court: &str,
    date: NaiveDate,
    start_slot: usize,
    end_slot: usize,
    tz: Tz,
) -> BookingInterval {
    let start = boundary(date, start_slot, tz);
    let mut end = boundary(date, end_slot, tz);
    if end <= start {
        // Both boundaries fell into the same spring-forward gap.
        end = start + Duration::minutes(SLOT_MINUTES * (end_slot - start_slot) as i64);
    }
    BookingInterval {
        location: location.to_string(),
        court: court.to_string(),
        start,
        end,
    }
}

/// Instant of boundary `slot` on `date`; `SLOTS_PER_DAY` is next midnight.
fn boundary(date: NaiveDate, slot: usize, tz: Tz) -> DateTime<Tz> {
    match slot_time(slot) {
        Some(time) => localize(date, time, tz),
        None => match date.checked_add_signed(Duration::days(1)) {
            Some(next) => start_of_day(next, tz),
            None => localize(date, NaiveTime::MIN, tz) + Duration::days(1),
        },
    }
}
