//! Error types for court-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A court-day does not carry exactly the 48 half-hour boundaries.
    /// Fatal for the whole run.
    #[error("Malformed slot grid for {location} / {court} on {date}: {reason}")]
    MalformedSlotGrid {
        date: NaiveDate,
        location: String,
        court: String,
        reason: String,
    },

    #[error("Malformed court name: {0:?}")]
    MalformedCourtName(String),

    /// An existing event timestamp that cannot be pinned to an absolute instant.
    /// Recoverable: the event is skipped.
    #[error("Ambiguous instant: {0:?}")]
    AmbiguousInstant(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
