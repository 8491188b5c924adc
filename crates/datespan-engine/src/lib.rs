//! # datespan-engine
//!
//! Deterministic date-range evaluation for a two-date picker widget.
//!
//! The engine validates two typed dates, counts the days between them that
//! fall on selected weekdays, scales the count into a duration unit, and
//! keeps a capped history of results in a key-value store. It has no I/O of
//! its own: front ends supply the store and translate their events.
//!
//! ## Modules
//!
//! - [`date`] — text → validated [`DateValue`] anchored in an IANA timezone
//! - [`state`] — the two candidate dates with tri-state validity
//! - [`preset`] — "+1 week" / "+1 month" second-date presets
//! - [`evaluator`] — weekday-filtered day counting and unit scaling
//! - [`results`] — the live result view and its persisted, capped history
//! - [`store`] — the key-value store seam
//! - [`gatekeeper`] — keystroke filtering for the date inputs
//! - [`widget`] — one widget session tying the above together
//! - [`events`] — handler-table dispatch for widget events
//! - [`error`] — Error types

pub mod date;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod gatekeeper;
pub mod preset;
pub mod results;
pub mod state;
pub mod store;
pub mod widget;

pub use date::DateValue;
pub use error::EngineError;
pub use evaluator::{evaluate, format_message, DayFilter, DurationUnit, RangeResult};
pub use events::{EventKind, Outcome, WidgetEvent};
pub use gatekeeper::Gatekeeper;
pub use preset::{resolve_preset, Preset};
pub use results::{Position, ResultLog, MAX_PERSISTED, RESULTS_KEY};
pub use state::{DateState, Slot, Validity};
pub use store::{KeyValueStore, MemoryStore};
pub use widget::{Widget, WidgetOptions};

/// Parse an IANA timezone name.
///
/// # Errors
///
/// Returns [`EngineError::InvalidTimezone`] for names the tz database does not know.
pub fn parse_timezone(name: &str) -> error::Result<chrono_tz::Tz> {
    name.parse::<chrono_tz::Tz>()
        .map_err(|_| EngineError::InvalidTimezone(format!("'{name}'")))
}
