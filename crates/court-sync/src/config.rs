//! Run configuration: timezone, location → calendar mapping, sync window.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use court_engine::parse_timezone;
use court_engine::window::{DEFAULT_START_OFFSET_DAYS, DEFAULT_SYNC_DAYS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// Contents of the JSON config file.
///
/// ```json
/// {
///   "timezone": "America/Los_Angeles",
///   "locations": {
///     "Mervin": "mervin@group.calendar.google.com",
///     "Bay": "bay@group.calendar.google.com"
///   },
///   "start_offset_days": 2,
///   "sync_days": 80
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Location name as it appears in the slot data → calendar id.
    #[serde(default)]
    pub locations: BTreeMap<String, String>,
    #[serde(default = "default_start_offset_days")]
    pub start_offset_days: u32,
    #[serde(default = "default_sync_days")]
    pub sync_days: u32,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_start_offset_days() -> u32 {
    DEFAULT_START_OFFSET_DAYS
}

fn default_sync_days() -> u32 {
    DEFAULT_SYNC_DAYS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            locations: BTreeMap::new(),
            start_offset_days: default_start_offset_days(),
            sync_days: default_sync_days(),
        }
    }
}

impl SyncConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn tz(&self) -> Result<Tz> {
        Ok(parse_timezone(&self.timezone)?)
    }

    /// Checks needed before touching any calendar.
    pub fn validate(&self) -> Result<Tz> {
        if self.locations.is_empty() {
            anyhow::bail!("Config has no locations; nothing to sync");
        }
        if self.sync_days == 0 {
            anyhow::bail!("sync_days must be at least 1");
        }
        if let Some((location, _)) = self.locations.iter().find(|(_, id)| id.trim().is_empty()) {
            anyhow::bail!("Location '{}' has an empty calendar id", location);
        }
        self.tz()
    }
}
