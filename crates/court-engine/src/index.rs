//! Keyed view of the events already present in a location's calendar.
//!
//! Only events whose title matches the engine's `"Court <N>"` convention are
//! indexed. Everything else is foreign and invisible to reconciliation.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::consolidate::BookingInterval;
use crate::court::is_owned_title;
use crate::error::{Result, SyncError};

/// An event as reported by the Calendar Client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEvent {
    /// Opaque, backend-assigned identifier.
    pub id: String,
    pub title: String,
    /// Raw start timestamp; must carry a UTC offset.
    pub start: String,
    /// Raw end timestamp; must carry a UTC offset.
    pub end: String,
}

/// Identity of an event for reconciliation purposes.
///
/// Instants are normalized to the configured timezone; comparison and
/// ordering are by absolute instant, so `09:00-07:00` and `16:00Z` are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalKey {
    pub court: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl CanonicalKey {
    pub fn new<A: TimeZone, B: TimeZone>(
        court: &str,
        start: &DateTime<A>,
        end: &DateTime<B>,
        tz: Tz,
    ) -> Self {
        Self {
            court: court.to_string(),
            start: start.with_timezone(&tz),
            end: end.with_timezone(&tz),
        }
    }

    pub fn from_interval(interval: &BookingInterval, tz: Tz) -> Self {
        Self::new(&interval.court, &interval.start, &interval.end, tz)
    }
}

/// An owned event left out of the index because its timestamps were unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    pub id: String,
    pub error: SyncError,
}

/// Parse a raw calendar timestamp into an absolute instant in `tz`.
///
/// Accepts RFC 3339 (`2024-06-01T09:00:00-07:00`, `2024-06-01T16:00:00Z`) and
/// the compact `±HHMM` offset form (`2024-06-01T09:00:00-0700`).
///
/// # Errors
/// Returns [`SyncError::AmbiguousInstant`] for values without an offset, such
/// as naive datetimes or all-day dates.
pub fn parse_instant(raw: &str, tz: Tz) -> Result<DateTime<Tz>> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::<FixedOffset>::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.with_timezone(&tz))
        .map_err(|_| SyncError::AmbiguousInstant(raw.to_string()))
}

/// Owned events of one calendar, keyed by [`CanonicalKey`].
#[derive(Debug, Clone)]
pub struct CalendarStateIndex {
    tz: Tz,
    keys: BTreeMap<CanonicalKey, String>,
    duplicates: Vec<String>,
    skipped: Vec<SkippedEvent>,
    foreign: usize,
}

impl CalendarStateIndex {
    /// Index a Calendar Client listing.
    ///
    /// When several owned events share a key, the lexicographically lowest id
    /// represents the key and the others are reported by [`Self::duplicates`].
    pub fn build(events: &[ExternalEvent], tz: Tz) -> Self {
        let mut by_key: BTreeMap<CanonicalKey, Vec<&str>> = BTreeMap::new();
        let mut skipped = Vec::new();
        let mut foreign = 0;

        for event in events {
            if !is_owned_title(&event.title) {
                foreign += 1;
                continue;
            }
            let parsed = parse_instant(&event.start, tz)
                .and_then(|start| parse_instant(&event.end, tz).map(|end| (start, end)));
            match parsed {
                Ok((start, end)) => by_key
                    .entry(CanonicalKey::new(&event.title, &start, &end, tz))
                    .or_default()
                    .push(&event.id),
                Err(error) => {
                    tracing::debug!(id = %event.id, %error, "skipping owned event");
                    skipped.push(SkippedEvent {
                        id: event.id.clone(),
                        error,
                    });
                }
            }
        }

        let mut keys = BTreeMap::new();
        let mut duplicates = Vec::new();
        for (key, mut ids) in by_key {
            ids.sort_unstable();
            ids.dedup();
            let mut ids = ids.into_iter().map(str::to_string);
            if let Some(representative) = ids.next() {
                let surplus: Vec<String> = ids.collect();
                if !surplus.is_empty() {
                    tracing::debug!(
                        court = %key.court,
                        start = %key.start,
                        keep = %representative,
                        surplus = surplus.len(),
                        "duplicate owned events"
                    );
                }
                duplicates.extend(surplus);
                keys.insert(key, representative);
            }
        }

        Self {
            tz,
            keys,
            duplicates,
            skipped,
            foreign,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Owned keys, ascending.
    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> {
        self.keys.keys()
    }

    pub fn contains(&self, key: &CanonicalKey) -> bool {
        self.keys.contains_key(key)
    }

    /// Representative event id for `key`.
    pub fn id_for(&self, key: &CanonicalKey) -> Option<&str> {
        self.keys.get(key).map(String::as_str)
    }

    /// Ids of owned events that duplicate another owned event's key.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn skipped(&self) -> &[SkippedEvent] {
        &self.skipped
    }

    /// Number of listed events that were not created by this engine.
    pub fn foreign_count(&self) -> usize {
        self.foreign
    }

    /// Number of distinct owned keys.
    pub fn owned_count(&self) -> usize {
        self.keys.len()
    }
}
