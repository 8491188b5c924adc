//! Weekday-filtered day counting between two dates.
//!
//! [`evaluate`] walks forward one calendar day at a time from the first
//! date (exclusive) up to the second (inclusive), counts the days whose
//! weekday is in a [`DayFilter`], and scales the count by the per-day
//! multiplier of a [`DurationUnit`].
//!
//! The scaling answers "if every qualifying day were worth one day of this
//! unit, what is the total": 3 work days in hours is 72, regardless of the
//! time-of-day of either input.

use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date::DateValue;
use crate::error::{EngineError, Result};

// ── DayFilter ───────────────────────────────────────────────────────────────

/// Which weekdays count toward the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayFilter {
    #[default]
    All,
    /// Monday through Friday.
    Work,
    /// Saturday and Sunday.
    Weekends,
}

impl DayFilter {
    /// Weekday indices in the filter, 0 = Sunday through 6 = Saturday.
    pub fn weekdays(self) -> &'static [u32] {
        match self {
            DayFilter::All => &[0, 1, 2, 3, 4, 5, 6],
            DayFilter::Work => &[1, 2, 3, 4, 5],
            DayFilter::Weekends => &[6, 0],
        }
    }

    pub fn includes(self, weekday: Weekday) -> bool {
        self.weekdays().contains(&weekday.num_days_from_sunday())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayFilter::All => "all",
            DayFilter::Work => "work",
            DayFilter::Weekends => "weekends",
        }
    }
}

impl FromStr for DayFilter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DayFilter::All),
            "work" => Ok(DayFilter::Work),
            "weekends" => Ok(DayFilter::Weekends),
            _ => Err(EngineError::InvalidDayFilter(format!("'{}'", s.trim()))),
        }
    }
}

impl std::fmt::Display for DayFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DurationUnit ────────────────────────────────────────────────────────────

/// The unit a result is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    #[default]
    Days,
}

impl DurationUnit {
    /// How many of this unit fit in one day.
    pub fn per_day(self) -> u64 {
        match self {
            DurationUnit::Seconds => 60 * 60 * 24,
            DurationUnit::Minutes => 60 * 24,
            DurationUnit::Hours => 24,
            DurationUnit::Days => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DurationUnit::Seconds => "seconds",
            DurationUnit::Minutes => "minutes",
            DurationUnit::Hours => "hours",
            DurationUnit::Days => "days",
        }
    }
}

impl FromStr for DurationUnit {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seconds" => Ok(DurationUnit::Seconds),
            "minutes" => Ok(DurationUnit::Minutes),
            "hours" => Ok(DurationUnit::Hours),
            "days" => Ok(DurationUnit::Days),
            _ => Err(EngineError::InvalidUnit(format!("'{}'", s.trim()))),
        }
    }
}

impl std::fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── evaluate ────────────────────────────────────────────────────────────────

/// The outcome of one range evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeResult {
    /// Qualifying days between the two dates.
    pub count: u64,
    /// `count` scaled by the unit's per-day multiplier.
    pub value: u64,
    pub filter: DayFilter,
    pub unit: DurationUnit,
    /// Human-readable entry, as stored in the result log.
    pub message: String,
}

/// Count the days in `(first, second]` whose weekday is in `filter`.
///
/// # Errors
///
/// Returns [`EngineError::SecondDateBeforeFirst`] if `first` is after
/// `second`. Callers are expected to check ordering before calling; the
/// check here makes sure a reversed range never produces a number.
///
/// # Examples
///
/// ```
/// use chrono_tz::Tz;
/// use datespan_engine::{evaluate, DateValue, DayFilter, DurationUnit};
///
/// let first = DateValue::parse("2023-01-01", Tz::UTC).unwrap();
/// let second = DateValue::parse("2023-01-08", Tz::UTC).unwrap();
/// let result = evaluate(&first, &second, DayFilter::Work, DurationUnit::Hours).unwrap();
/// assert_eq!(result.count, 5);
/// assert_eq!(result.value, 120);
/// assert_eq!(result.message, "Difference between dates in hours is: 120");
/// ```
pub fn evaluate(
    first: &DateValue,
    second: &DateValue,
    filter: DayFilter,
    unit: DurationUnit,
) -> Result<RangeResult> {
    if first > second {
        return Err(EngineError::SecondDateBeforeFirst);
    }

    let mut cursor = *first;
    let mut count: u64 = 0;
    while cursor < *second {
        cursor = cursor.shift_days(1)?;
        if filter.includes(cursor.weekday()) {
            count += 1;
        }
    }

    let value = count * unit.per_day();
    debug!(%first, %second, %filter, %unit, count, value, "evaluated range");

    Ok(RangeResult {
        count,
        value,
        filter,
        unit,
        message: format_message(unit, value),
    })
}

/// The log entry text for a result.
pub fn format_message(unit: DurationUnit, value: u64) -> String {
    format!("Difference between dates in {unit} is: {value}")
}

// ── Tests ───────────────────────────────────────────────────────────────────
