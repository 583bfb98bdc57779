//! Tests for TimeSlotMatrix construction and grid validation.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use court_engine::slots::{slot_time, DaySlots, TimeSlotMatrix, SLOTS_PER_DAY};
use court_engine::SyncError;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A complete 48-boundary court-day with the given slot indices occupied.
fn grid(occupied: &[usize]) -> BTreeMap<NaiveTime, bool> {
    (0..SLOTS_PER_DAY)
        .map(|i| (slot_time(i).unwrap(), occupied.contains(&i)))
        .collect()
}

fn day(d: NaiveDate, entries: &[(&str, &str, BTreeMap<NaiveTime, bool>)]) -> DaySlots {
    let mut slots = DaySlots::new(d);
    for (location, court, grid) in entries {
        slots
            .locations
            .entry(location.to_string())
            .or_default()
            .insert(court.to_string(), grid.clone());
    }
    slots
}

// ── Filtering & normalization ───────────────────────────────────────────────

#[test]
fn non_tennis_courts_are_dropped() {
    let d = date(2024, 6, 1);
    let days = vec![day(
        d,
        &[
            ("Mervin", "Mervin - Tennis Court 1", grid(&[10])),
            ("Mervin", "Mervin - Pickleball Court 1", grid(&[10])),
            ("Mervin", "Mervin - Community Room", grid(&[])),
        ],
    )];

    let matrix = TimeSlotMatrix::from_days(&days).unwrap();

    assert_eq!(matrix.courts("Mervin").collect::<Vec<_>>(), vec!["Court 1"]);
    assert!(matrix.row("Mervin", "Court 1", d).unwrap()[10]);
}

#[test]
fn non_tennis_rows_are_not_validated() {
    // A pickleball court with a broken grid is filtered before validation.
    let d = date(2024, 6, 1);
    let days = vec![day(
        d,
        &[
            ("Bay", "Bay - Tennis Court 2", grid(&[])),
            ("Bay", "Bay - Pickleball Court 1", BTreeMap::new()),
        ],
    )];

    assert!(TimeSlotMatrix::from_days(&days).is_ok());
}

#[test]
fn malformed_tennis_court_name_halts() {
    let days = vec![day(
        date(2024, 6, 1),
        &[("Bay", "Bay Tennis Court Two", grid(&[]))],
    )];

    assert_eq!(
        TimeSlotMatrix::from_days(&days),
        Err(SyncError::MalformedCourtName("Bay Tennis Court Two".to_string()))
    );
}

// ── Grid validation ─────────────────────────────────────────────────────────

#[test]
fn missing_boundary_is_malformed_grid() {
    let d = date(2024, 6, 1);
    let mut g = grid(&[]);
    g.remove(&NaiveTime::from_hms_opt(13, 30, 0).unwrap());
    let days = vec![day(d, &[("Mervin", "Mervin - Tennis Court 1", g)])];

    match TimeSlotMatrix::from_days(&days) {
        Err(SyncError::MalformedSlotGrid {
            date,
            location,
            court,
            reason,
        }) => {
            assert_eq!(date, d);
            assert_eq!(location, "Mervin");
            assert_eq!(court, "Mervin - Tennis Court 1");
            assert!(reason.contains("13:30"), "reason was {reason:?}");
        }
        other => panic!("expected MalformedSlotGrid, got {other:?}"),
    }
}

#[test]
fn extra_boundary_is_malformed_grid() {
    let mut g = grid(&[]);
    g.insert(NaiveTime::from_hms_opt(9, 15, 0).unwrap(), true);
    let days = vec![day(
        date(2024, 6, 1),
        &[("Mervin", "Mervin - Tennis Court 1", g)],
    )];

    assert!(matches!(
        TimeSlotMatrix::from_days(&days),
        Err(SyncError::MalformedSlotGrid { .. })
    ));
}

#[test]
fn one_bad_day_fails_the_whole_build() {
    let good = day(
        date(2024, 6, 1),
        &[("Mervin", "Mervin - Tennis Court 1", grid(&[1, 2]))],
    );
    let bad = day(
        date(2024, 6, 2),
        &[("Mervin", "Mervin - Tennis Court 1", BTreeMap::new())],
    );

    assert!(TimeSlotMatrix::from_days(&[good, bad]).is_err());
}

#[test]
fn repeated_date_is_malformed_grid() {
    let d = date(2024, 6, 1);
    let first = day(d, &[("Mervin", "Mervin - Tennis Court 1", grid(&[1]))]);
    let again = day(d, &[("Mervin", "Mervin - Tennis Court 1", grid(&[2]))]);

    assert_eq!(
        TimeSlotMatrix::from_days(&[first, again]),
        Err(SyncError::MalformedSlotGrid {
            date: d,
            location: "Mervin".to_string(),
            court: "Mervin - Tennis Court 1".to_string(),
            reason: "date reported more than once".to_string(),
        })
    );
}

#[test]
fn repeated_date_without_tennis_courts_is_ignored() {
    let d = date(2024, 6, 1);
    let first = day(d, &[("Mervin", "Mervin - Tennis Court 1", grid(&[1]))]);
    let again = day(d, &[("Mervin", "Mervin - Community Room", grid(&[]))]);

    let matrix = TimeSlotMatrix::from_days(&[first, again]).unwrap();
    assert!(matrix.row("Mervin", "Court 1", d).unwrap()[1]);
}

// ── Sparse input ────────────────────────────────────────────────────────────

#[test]
fn court_missing_on_a_day_is_all_free() {
    let d1 = date(2024, 6, 1);
    let d2 = date(2024, 6, 2);
    let days = vec![
        day(
            d1,
            &[
                ("Mervin", "Mervin - Tennis Court 1", grid(&[4])),
                ("Mervin", "Mervin - Tennis Court 2", grid(&[5])),
            ],
        ),
        day(d2, &[("Mervin", "Mervin - Tennis Court 1", grid(&[6]))]),
    ];

    let matrix = TimeSlotMatrix::from_days(&days).unwrap();

    assert_eq!(matrix.dates().collect::<Vec<_>>(), vec![d1, d2]);
    let row = matrix.row("Mervin", "Court 2", d2).unwrap();
    assert!(row.iter().all(|occupied| !occupied));
    assert!(matrix.row("Mervin", "Court 2", d1).unwrap()[5]);
}

#[test]
fn location_missing_on_a_day_is_all_free() {
    let d1 = date(2024, 6, 1);
    let d2 = date(2024, 6, 2);
    let days = vec![
        day(d1, &[("Bay", "Bay - Tennis Court 1", grid(&[0]))]),
        day(d2, &[("Mervin", "Mervin - Tennis Court 1", grid(&[0]))]),
    ];

    let matrix = TimeSlotMatrix::from_days(&days).unwrap();

    assert_eq!(matrix.locations().collect::<Vec<_>>(), vec!["Bay", "Mervin"]);
    assert!(!matrix.row("Bay", "Court 1", d2).unwrap()[0]);
    assert!(!matrix.row("Mervin", "Court 1", d1).unwrap()[0]);
}

#[test]
fn empty_input_builds_empty_matrix() {
    let matrix = TimeSlotMatrix::from_days(&[]).unwrap();
    assert!(matrix.is_empty());
    assert_eq!(matrix.dates().count(), 0);
    assert_eq!(matrix.courts("Mervin").count(), 0);
}

#[test]
fn raw_aliases_of_one_court_are_merged() {
    let d = date(2024, 6, 1);
    let days = vec![day(
        d,
        &[
            ("Mervin", "Mervin - Tennis Court 1", grid(&[2])),
            ("Mervin", "Mervin Park - Tennis Court 1", grid(&[3])),
        ],
    )];

    let matrix = TimeSlotMatrix::from_days(&days).unwrap();
    let row = matrix.row("Mervin", "Court 1", d).unwrap();

    assert!(row[2] && row[3]);
    assert_eq!(row.iter().filter(|o| **o).count(), 2);
}
