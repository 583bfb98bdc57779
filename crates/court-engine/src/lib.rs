//! # court-engine
//!
//! Turns half-hour court occupancy into booking intervals and reconciles them
//! against an external calendar with the minimal set of creates and deletes.
//!
//! The engine is pure: no I/O, no sleeping, no retries. Callers fetch source
//! days and calendar listings, hand them over as plain data, and apply the
//! returned [`ReconciliationPlan`] themselves.
//!
//! ## Modules
//!
//! - [`slots`] — per-day extractor output → validated [`TimeSlotMatrix`]
//! - [`consolidate`] — slot runs → DST-correct [`BookingInterval`]s
//! - [`index`] — calendar listing → owned-event [`CalendarStateIndex`]
//! - [`reconcile`] — desired vs. existing → [`ReconciliationPlan`]
//! - [`court`] — court-name normalization and ownership predicate
//! - [`dst`] — wall-clock localization across DST transitions
//! - [`window`] — sync and purge date windows
//! - [`error`] — Error types

pub mod consolidate;
pub mod court;
pub mod dst;
pub mod error;
pub mod index;
pub mod reconcile;
pub mod slots;
pub mod window;

pub use consolidate::{consolidate, consolidate_day, BookingInterval, CourtIntervals, DesiredEventSet};
pub use court::{is_owned_title, is_tennis_court, normalize_court_name};
pub use dst::{localize, parse_timezone};
pub use error::SyncError;
pub use index::{parse_instant, CalendarStateIndex, CanonicalKey, ExternalEvent, SkippedEvent};
pub use reconcile::{reconcile, PlannedEvent, ReconciliationPlan};
pub use slots::{DaySlots, TimeSlotMatrix, SLOTS_PER_DAY, SLOT_MINUTES};
pub use window::SyncWindow;
