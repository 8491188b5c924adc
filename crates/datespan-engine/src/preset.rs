//! Named offsets that fill in the second date from the first.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::date::DateValue;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Seven calendar days later.
    Week,
    /// One calendar month later, with day-of-month roll-over.
    Month,
}

impl FromStr for Preset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Preset::Week),
            "month" => Ok(Preset::Month),
            _ => Err(EngineError::InvalidPreset(format!("'{}'", s.trim()))),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Preset::Week => "week",
            Preset::Month => "month",
        })
    }
}

/// Compute the second date for `preset` from an already validated `base`.
///
/// No validation happens here: callers only pass a first date whose slot
/// is valid. Month arithmetic rolls over instead of clamping:
///
/// ```
/// use chrono_tz::Tz;
/// use datespan_engine::{resolve_preset, DateValue, Preset};
///
/// let base = DateValue::parse("2023-01-31", Tz::UTC).unwrap();
/// let next = resolve_preset(&base, Preset::Month).unwrap();
/// assert_eq!(next.to_string(), "2023-03-03");
/// ```
pub fn resolve_preset(base: &DateValue, preset: Preset) -> Result<DateValue> {
    match preset {
        Preset::Week => base.shift_days(7),
        Preset::Month => base.shift_months_rolling(1),
    }
}
