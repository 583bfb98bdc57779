//! Slot Extractor output read from a JSON file.
//!
//! ```json
//! [
//!   {
//!     "date": "2024-06-01",
//!     "locations": {
//!       "Mervin": {
//!         "Mervin - Tennis Court 1": { "00:00": false, "00:30": false, "...": true }
//!       }
//!     }
//!   }
//! ]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use court_engine::{DaySlots, SyncError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DayInput {
    date: NaiveDate,
    #[serde(default)]
    locations: BTreeMap<String, BTreeMap<String, BTreeMap<String, bool>>>,
}

pub fn load_days(path: &Path) -> Result<Vec<DaySlots>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read slot file: {}", path.display()))?;
    parse_days(&raw).with_context(|| format!("Failed to parse slot file: {}", path.display()))
}

pub fn parse_days(json: &str) -> Result<Vec<DaySlots>> {
    let inputs: Vec<DayInput> = serde_json::from_str(json)?;
    inputs.into_iter().map(into_day_slots).collect()
}

fn into_day_slots(input: DayInput) -> Result<DaySlots> {
    let mut day = DaySlots::new(input.date);
    for (location, courts) in input.locations {
        let mut parsed = BTreeMap::new();
        for (court, slots) in courts {
            let mut times = BTreeMap::new();
            for (raw, occupied) in slots {
                let time = parse_slot_time(&raw)
                    .with_context(|| format!("{} on {}", court, input.date))?;
                // "09:00" and "09:00:00" name the same boundary.
                if times.insert(time, occupied).is_some() {
                    return Err(SyncError::MalformedSlotGrid {
                        date: input.date,
                        location,
                        court,
                        reason: format!("duplicate boundary {}", time.format("%H:%M")),
                    }
                    .into());
                }
            }
            parsed.insert(court, times);
        }
        day.locations.insert(location, parsed);
    }
    Ok(day)
}

/// `"HH:MM"` or `"HH:MM:SS"`.
fn parse_slot_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .with_context(|| format!("Invalid slot time '{}'", raw))
}
