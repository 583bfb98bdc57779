//! Minimal create/delete plan between desired intervals and owned events.
//!
//! Identity is the exact [`CanonicalKey`]; there is no overlap matching. An
//! owned event that differs from a desired interval by one minute is replaced
//! (one delete plus one create), never adjusted.

use std::collections::BTreeSet;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::consolidate::CourtIntervals;
use crate::index::{CalendarStateIndex, CanonicalKey};

/// An event the caller should create. The title is the court name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEvent {
    pub court: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl PlannedEvent {
    pub fn title(&self) -> &str {
        &self.court
    }
}

impl From<CanonicalKey> for PlannedEvent {
    fn from(key: CanonicalKey) -> Self {
        Self {
            court: key.court,
            start: key.start,
            end: key.end,
        }
    }
}

/// Result of one reconciliation pass for one location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Ordered by court, then start, then end.
    pub to_create: Vec<PlannedEvent>,
    /// Representative ids of owned events with no desired counterpart,
    /// ordered by their key.
    pub to_delete: Vec<String>,
    /// Owned events that duplicate another owned event's key. Not deleted
    /// unless the caller opts in via [`Self::deletions_with_duplicates`].
    pub surplus_duplicates: Vec<String>,
}

impl ReconciliationPlan {
    /// `true` when the calendar already matches the desired state.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }

    /// Deletions including surplus duplicates, for callers that prune them.
    pub fn deletions_with_duplicates(&self) -> Vec<String> {
        self.to_delete
            .iter()
            .chain(&self.surplus_duplicates)
            .cloned()
            .collect()
    }
}

/// Compare one location's desired intervals against its owned events.
///
/// Pure and deterministic: the same inputs always give the same plan, and
/// reconciling again after the plan has been applied gives an empty plan.
/// Courts the calendar has never seen simply produce creates.
pub fn reconcile(desired: &CourtIntervals, existing: &CalendarStateIndex) -> ReconciliationPlan {
    let tz = existing.timezone();
    let desired_keys: BTreeSet<CanonicalKey> = desired
        .values()
        .flatten()
        .map(|interval| CanonicalKey::from_interval(interval, tz))
        .collect();

    let to_create = desired_keys
        .iter()
        .filter(|key| !existing.contains(key))
        .cloned()
        .map(PlannedEvent::from)
        .collect();

    let to_delete = existing
        .keys()
        .filter(|key| !desired_keys.contains(*key))
        .filter_map(|key| existing.id_for(key))
        .map(str::to_string)
        .collect();

    ReconciliationPlan {
        to_create,
        to_delete,
        surplus_duplicates: existing.duplicates().to_vec(),
    }
}
