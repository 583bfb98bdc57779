//! Date ranges a run covers.

use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;

use crate::dst::start_of_day;

/// Days between today and the first synced day; the source does not publish
/// reliable data for today and tomorrow.
pub const DEFAULT_START_OFFSET_DAYS: u32 = 2;

/// Number of days the source publishes ahead.
pub const DEFAULT_SYNC_DAYS: u32 = 80;

/// Default look-ahead for purging owned events.
pub const DEFAULT_PURGE_DAYS: u32 = 90;

/// A contiguous range of calendar dates. Never empty: the constructors
/// reject a zero-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    first: NaiveDate,
    days: u32,
}

impl SyncWindow {
    /// `days` dates starting `offset_days` after `today`.
    ///
    /// Returns `None` when `days` is zero or the range overflows the calendar.
    pub fn upcoming(today: NaiveDate, offset_days: u32, days: u32) -> Option<Self> {
        if days == 0 {
            return None;
        }
        let first = today.checked_add_signed(Duration::days(i64::from(offset_days)))?;
        first.checked_add_signed(Duration::days(i64::from(days) - 1))?;
        Some(Self { first, days })
    }

    /// `days` dates starting today.
    pub fn from_today(today: NaiveDate, days: u32) -> Option<Self> {
        Self::upcoming(today, 0, days)
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.first + Duration::days(i64::from(self.days) - 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first;
        (0..i64::from(self.days)).map(move |offset| first + Duration::days(offset))
    }

    /// Absolute `[start, end)` bounds: local midnight of the first day up to
    /// local midnight after the last day.
    pub fn bounds(&self, tz: Tz) -> (DateTime<Tz>, DateTime<Tz>) {
        let after_last = self.last() + Duration::days(1);
        (start_of_day(self.first, tz), start_of_day(after_last, tz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_window_starts_two_days_out() {
        let w = SyncWindow::upcoming(
            date(2024, 6, 1),
            DEFAULT_START_OFFSET_DAYS,
            DEFAULT_SYNC_DAYS,
        )
        .unwrap();
        assert_eq!(w.first(), date(2024, 6, 3));
        assert_eq!(w.last(), date(2024, 8, 21));
        assert_eq!(w.dates().count(), 80);
        assert!(w.contains(date(2024, 6, 3)));
        assert!(!w.contains(date(2024, 6, 2)));
    }

    #[test]
    fn zero_days_is_rejected() {
        assert_eq!(SyncWindow::from_today(date(2024, 6, 1), 0), None);
        assert_eq!(SyncWindow::upcoming(date(2024, 6, 1), 2, 0), None);
    }

    #[test]
    fn single_day_window_has_one_date() {
        let w = SyncWindow::from_today(date(2024, 6, 1), 1).unwrap();
        assert_eq!(w.first(), w.last());
        assert_eq!(w.dates().collect::<Vec<_>>(), vec![date(2024, 6, 1)]);
    }

    #[test]
    fn bounds_follow_local_midnight() {
        let tz = chrono_tz::America::Los_Angeles;
        let w = SyncWindow::from_today(date(2024, 6, 1), 1).unwrap();
        let (start, end) = w.bounds(tz);
        assert_eq!(start.to_rfc3339(), "2024-06-01T00:00:00-07:00");
        assert_eq!(end.to_rfc3339(), "2024-06-02T00:00:00-07:00");
    }
}
