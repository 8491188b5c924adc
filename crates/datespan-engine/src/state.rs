//! Tracking of the two candidate dates and their validity.

use std::str::FromStr;

use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::date::DateValue;
use crate::error::EngineError;

/// One of the two date inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    First,
    Second,
}

impl FromStr for Slot {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Slot::First),
            "second" => Ok(Slot::Second),
            _ => Err(EngineError::InvalidSlot(format!("'{}'", s.trim()))),
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Slot::First => "first",
            Slot::Second => "second",
        })
    }
}

/// Outcome of the latest parse attempt for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    /// No parse attempted yet.
    #[default]
    Unknown,
    /// The latest text did not form a date.
    Invalid,
    Valid,
}

impl Validity {
    pub fn is_valid(self) -> bool {
        self == Validity::Valid
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Validity::Unknown => "unknown",
            Validity::Invalid => "invalid",
            Validity::Valid => "valid",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    value: Option<DateValue>,
    validity: Validity,
}

/// The two candidate dates of a session.
///
/// A failed parse marks the slot [`Validity::Invalid`] but keeps the last
/// good value around; every reader goes through the validity flag, so a
/// stale value is never used.
#[derive(Debug, Clone)]
pub struct DateState {
    tz: Tz,
    first: SlotState,
    second: SlotState,
    dates_valid: bool,
}

impl DateState {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            first: SlotState::default(),
            second: SlotState::default(),
            dates_valid: false,
        }
    }

    /// Parse `raw` into `slot` and return the slot's new validity.
    pub fn set_candidate(&mut self, slot: Slot, raw: &str) -> Validity {
        let tz = self.tz;
        let state = self.slot_mut(slot);
        match DateValue::parse(raw, tz) {
            Ok(value) => {
                state.value = Some(value);
                state.validity = Validity::Valid;
            }
            Err(err) => {
                debug!(%slot, error = %err, "candidate rejected");
                state.validity = Validity::Invalid;
            }
        }
        let validity = state.validity;
        self.dates_valid = self.first.validity.is_valid() && self.second.validity.is_valid();
        validity
    }

    /// True iff both slots hold a valid date.
    pub fn is_valid(&self) -> bool {
        self.dates_valid
    }

    pub fn validity(&self, slot: Slot) -> Validity {
        self.slot(slot).validity
    }

    /// The slot's date, only while its latest parse succeeded.
    pub fn date(&self, slot: Slot) -> Option<DateValue> {
        let state = self.slot(slot);
        state.validity.is_valid().then_some(state.value).flatten()
    }

    /// Both dates, only when the state as a whole is valid.
    pub fn dates(&self) -> Option<(DateValue, DateValue)> {
        if !self.dates_valid {
            return None;
        }
        Some((self.first.value?, self.second.value?))
    }

    /// The second input accepts edits only once the first date is valid.
    pub fn second_input_enabled(&self) -> bool {
        self.first.validity.is_valid()
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    fn slot(&self, slot: Slot) -> &SlotState {
        match slot {
            Slot::First => &self.first,
            Slot::Second => &self.second,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut SlotState {
        match slot {
            Slot::First => &mut self.first,
            Slot::Second => &mut self.second,
        }
    }
}
