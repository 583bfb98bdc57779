//! Court-name predicates shared by ingestion and ownership checks.
//!
//! The source names courts like `"Mervin - Tennis Court 3"`; calendar events
//! carry the short form `"Court 3"`. Everything that converts between the two,
//! or decides whether a calendar title belongs to this engine, lives here.

use crate::error::{Result, SyncError};

/// Case-sensitive marker that distinguishes tennis courts from other
/// bookable resources (pickleball, rooms, ...) in the source feed.
pub const TENNIS_MARKER: &str = "Tennis";

const OWNED_TITLE_PREFIX: &str = "Court ";

/// Returns `true` when the raw source name refers to a tennis court.
pub fn is_tennis_court(raw: &str) -> bool {
    raw.contains(TENNIS_MARKER)
}

/// Normalize a raw source court name into its calendar title.
///
/// `"<Location> - Tennis Court <N>"` becomes `"Court <N>"`. The location part
/// may itself contain spaces but must be non-empty, and `<N>` must be one or
/// more ASCII digits.
///
/// # Errors
/// Returns [`SyncError::MalformedCourtName`] for any other shape.
///
/// # Examples
///
/// ```
/// use court_engine::normalize_court_name;
///
/// assert_eq!(normalize_court_name("Mervin - Tennis Court 3").unwrap(), "Court 3");
/// assert!(normalize_court_name("Tennis Court").is_err());
/// ```
pub fn normalize_court_name(raw: &str) -> Result<String> {
    let malformed = || SyncError::MalformedCourtName(raw.to_string());

    let (location, rest) = raw.split_once(" - ").ok_or_else(malformed)?;
    if location.trim().is_empty() {
        return Err(malformed());
    }
    let number = rest.strip_prefix("Tennis Court ").ok_or_else(malformed)?;
    if !is_ascii_number(number) {
        return Err(malformed());
    }

    Ok(format!("{}{}", OWNED_TITLE_PREFIX, number))
}

/// Returns `true` when a calendar event title matches the engine's own naming
/// convention (`"Court"`, a single space, one or more digits).
///
/// Events with any other title were not created by this engine and must never
/// be modified by it.
pub fn is_owned_title(title: &str) -> bool {
    title
        .strip_prefix(OWNED_TITLE_PREFIX)
        .is_some_and(is_ascii_number)
}

fn is_ascii_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
