//! DST-aware localization of wall-clock slot boundaries.
//!
//! Slot boundaries are civil times in the venue's timezone. Two days a year the
//! wall clock is not a bijection onto absolute time:
//!
//! - fall back: `01:00`–`02:00` happens twice; the earlier instant wins;
//! - spring forward: `02:00`–`03:00` never happens; the boundary moves forward
//!   to the first instant after the gap.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{Result, SyncError};

/// Upper bound on how far a non-existent local time is pushed forward.
/// Real-world gaps are at most a couple of hours.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Parse an IANA timezone identifier such as `"America/Los_Angeles"`.
///
/// # Errors
/// Returns [`SyncError::InvalidTimezone`] if `id` is not a known IANA zone.
pub fn parse_timezone(id: &str) -> Result<Tz> {
    id.parse()
        .map_err(|_| SyncError::InvalidTimezone(id.to_string()))
}

/// Localize `date` + `time` into `tz`.
pub fn localize(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Tz> {
    localize_naive(date.and_time(time), tz)
}

/// Local midnight at the start of `date` in `tz`.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    localize(date, NaiveTime::MIN, tz)
}

fn localize_naive(local: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => shift_past_gap(local, tz),
    }
}

/// Walk forward minute by minute until the wall clock exists again.
fn shift_past_gap(local: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    for minutes in 1..=MAX_GAP_MINUTES {
        let candidate = local + Duration::minutes(minutes);
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => continue,
        }
    }
    // No zone has a day-long gap; fall back to the raw offset-free reading.
    tz.from_utc_datetime(&local)
}
