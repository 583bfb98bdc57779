//! Tests for CalendarStateIndex: ownership filtering, instant normalization and
//! duplicate handling.

use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use court_engine::{parse_instant, CalendarStateIndex, CanonicalKey, ExternalEvent, SyncError};

// ── Helpers ─────────────────────────────────────────────────────────────────

const LA: Tz = chrono_tz::America::Los_Angeles;

fn event(id: &str, title: &str, start: &str, end: &str) -> ExternalEvent {
    ExternalEvent {
        id: id.to_string(),
        title: title.to_string(),
        start: start.to_string(),
        end: end.to_string(),
    }
}

fn key(court: &str, start: &str, end: &str) -> CanonicalKey {
    CanonicalKey::new(
        court,
        &parse_instant(start, LA).unwrap(),
        &parse_instant(end, LA).unwrap(),
        LA,
    )
}

// ── parse_instant ───────────────────────────────────────────────────────────

#[test]
fn offset_notations_resolve_to_same_instant() {
    let expected = Utc.with_ymd_and_hms(2024, 6, 1, 16, 0, 0).unwrap();
    for raw in [
        "2024-06-01T09:00:00-07:00",
        "2024-06-01T16:00:00Z",
        "2024-06-01T16:00:00+00:00",
        "2024-06-01T18:00:00+02:00",
        "2024-06-01T09:00:00-0700",
    ] {
        let parsed = parse_instant(raw, LA).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), expected, "{raw}");
        assert_eq!(parsed.timezone(), LA);
    }
}

#[test]
fn naive_and_date_only_values_are_ambiguous() {
    for raw in ["2024-06-01T09:00:00", "2024-06-01", "", "tomorrow"] {
        assert_eq!(
            parse_instant(raw, LA),
            Err(SyncError::AmbiguousInstant(raw.to_string()))
        );
    }
}

// ── Ownership ───────────────────────────────────────────────────────────────

#[test]
fn foreign_titles_are_invisible() {
    let events = vec![
        event("e1", "Court 1", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00"),
        event("e2", "Staff Meeting", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00"),
        event("e3", "Court 1 lesson", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00"),
        event("e4", "court 2", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00"),
    ];

    let index = CalendarStateIndex::build(&events, LA);

    assert_eq!(index.owned_count(), 1);
    assert_eq!(index.foreign_count(), 3);
    assert_eq!(
        index.keys().cloned().collect::<Vec<_>>(),
        vec![key("Court 1", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00")]
    );
}

#[test]
fn foreign_event_with_bad_timestamps_is_not_reported_as_skipped() {
    let events = vec![event("x", "Birthday", "2024-06-01", "2024-06-02")];

    let index = CalendarStateIndex::build(&events, LA);

    assert!(index.skipped().is_empty());
    assert_eq!(index.foreign_count(), 1);
}

// ── Normalization ───────────────────────────────────────────────────────────

#[test]
fn keys_compare_by_instant_not_string() {
    let events = vec![event("e1", "Court 1", "2024-06-01T16:00:00Z", "2024-06-01T17:00:00Z")];

    let index = CalendarStateIndex::build(&events, LA);
    let local = key("Court 1", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00");

    assert!(index.contains(&local));
    assert_eq!(index.id_for(&local), Some("e1"));
}

#[test]
fn same_times_on_different_courts_are_distinct() {
    let events = vec![
        event("a", "Court 1", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00"),
        event("b", "Court 2", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00"),
    ];

    let index = CalendarStateIndex::build(&events, LA);

    assert_eq!(index.owned_count(), 2);
    assert!(index.duplicates().is_empty());
}

// ── Recoverable errors ──────────────────────────────────────────────────────

#[test]
fn ambiguous_owned_event_is_skipped_not_fatal() {
    let events = vec![
        event("bad", "Court 3", "2024-06-01T09:00:00", "2024-06-01T10:00:00"),
        event("good", "Court 3", "2024-06-01T11:00:00-07:00", "2024-06-01T12:00:00-07:00"),
    ];

    let index = CalendarStateIndex::build(&events, LA);

    assert_eq!(index.owned_count(), 1);
    assert_eq!(index.skipped().len(), 1);
    assert_eq!(index.skipped()[0].id, "bad");
    assert_eq!(
        index.skipped()[0].error,
        SyncError::AmbiguousInstant("2024-06-01T09:00:00".to_string())
    );
}

#[test]
fn bad_end_alone_also_skips() {
    let events = vec![event("e", "Court 3", "2024-06-01T09:00:00Z", "2024-06-01")];

    let index = CalendarStateIndex::build(&events, LA);

    assert_eq!(index.owned_count(), 0);
    assert_eq!(
        index.skipped()[0].error,
        SyncError::AmbiguousInstant("2024-06-01".to_string())
    );
}

// ── Duplicates ──────────────────────────────────────────────────────────────

#[test]
fn duplicates_keep_lowest_id() {
    let events = vec![
        event("id-b", "Court 1", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00"),
        event("id-c", "Court 1", "2024-06-01T16:00:00Z", "2024-06-01T17:00:00Z"),
        event("id-a", "Court 1", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00"),
    ];

    let index = CalendarStateIndex::build(&events, LA);
    let k = key("Court 1", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00");

    assert_eq!(index.owned_count(), 1);
    assert_eq!(index.id_for(&k), Some("id-a"));
    assert_eq!(index.duplicates(), ["id-b".to_string(), "id-c".to_string()]);
}

#[test]
fn same_id_listed_twice_is_not_a_duplicate() {
    let e = event("e1", "Court 1", "2024-06-01T09:00:00-07:00", "2024-06-01T10:00:00-07:00");

    let index = CalendarStateIndex::build(&[e.clone(), e], LA);

    assert!(index.duplicates().is_empty());
    assert_eq!(index.owned_count(), 1);
}

#[test]
fn empty_listing() {
    let index = CalendarStateIndex::build(&[], LA);
    assert_eq!(index.owned_count(), 0);
    assert_eq!(index.foreign_count(), 0);
    assert_eq!(index.timezone(), LA);
}
