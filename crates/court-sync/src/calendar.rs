//! Calendar Client seam and a JSON-file backed implementation.
//!
//! The file holds calendar id → list of events, in the same shape the engine
//! consumes:
//!
//! ```json
//! {
//!   "mervin@group.calendar.google.com": [
//!     { "id": "cs000001", "title": "Court 1",
//!       "start": "2024-06-01T09:00:00-07:00", "end": "2024-06-01T10:00:00-07:00" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use court_engine::{parse_instant, ExternalEvent, PlannedEvent};

/// What happened to a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Already gone (HTTP 404/410 on a real backend). Not an error.
    Missing,
}

/// Low-level calendar operations the sync loop needs.
pub trait CalendarClient {
    /// Events overlapping `[time_min, time_max)`.
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
    ) -> Result<Vec<ExternalEvent>>;

    /// Create an event and return its backend id.
    fn insert_event(&mut self, calendar_id: &str, event: &PlannedEvent) -> Result<String>;

    fn delete_event(&mut self, calendar_id: &str, event_id: &str) -> Result<DeleteOutcome>;
}

/// Calendar state persisted as a JSON file. Changes are held in memory until
/// [`FileCalendar::save`].
#[derive(Debug)]
pub struct FileCalendar {
    path: PathBuf,
    calendars: BTreeMap<String, Vec<ExternalEvent>>,
    next_id: u64,
}

impl FileCalendar {
    /// Open `path`, treating a missing file as an empty calendar set.
    pub fn open(path: &Path) -> Result<Self> {
        let calendars = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read calendar file: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse calendar file: {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        let next_id = calendars.values().map(Vec::len).sum::<usize>() as u64 + 1;
        Ok(Self {
            path: path.to_path_buf(),
            calendars,
            next_id,
        })
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.calendars)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write calendar file: {}", self.path.display()))
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = format!("cs{:06}", self.next_id);
            self.next_id += 1;
            let taken = self
                .calendars
                .values()
                .flatten()
                .any(|event| event.id == id);
            if !taken {
                return id;
            }
        }
    }
}

impl CalendarClient for FileCalendar {
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
    ) -> Result<Vec<ExternalEvent>> {
        let tz = time_min.timezone();
        let events = self.calendars.get(calendar_id).into_iter().flatten();
        Ok(events
            .filter(|event| {
                // Unparseable events are passed through; the index decides.
                match (parse_instant(&event.start, tz), parse_instant(&event.end, tz)) {
                    (Ok(start), Ok(end)) => start < time_max && end > time_min,
                    _ => true,
                }
            })
            .cloned()
            .collect())
    }

    fn insert_event(&mut self, calendar_id: &str, event: &PlannedEvent) -> Result<String> {
        let id = self.fresh_id();
        self.calendars
            .entry(calendar_id.to_string())
            .or_default()
            .push(ExternalEvent {
                id: id.clone(),
                title: event.title().to_string(),
                start: event.start.to_rfc3339(),
                end: event.end.to_rfc3339(),
            });
        Ok(id)
    }

    fn delete_event(&mut self, calendar_id: &str, event_id: &str) -> Result<DeleteOutcome> {
        let Some(events) = self.calendars.get_mut(calendar_id) else {
            return Ok(DeleteOutcome::Missing);
        };
        let before = events.len();
        events.retain(|event| event.id != event_id);
        Ok(if events.len() < before {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::Missing
        })
    }
}
