//! Validated calendar dates parsed from user text.
//!
//! A [`DateValue`] is an instant anchored at local midnight in an IANA
//! timezone. It can only be built from text that forms a real calendar
//! date; anything else is an [`EngineError::InvalidDate`], never a sentinel.
//!
//! # Accepted text
//!
//! Three numeric components joined by one separator (`.`, `-` or `/`):
//!
//! - `2023-06-01`, `2023.06.01`: year first when the first component has 4 digits
//! - `6.1.2023`, `06/01/2023`, `6.1.23`: otherwise month, day, year
//!
//! Two-digit years pivot at 50: `00`–`49` → 2000s, `50`–`99` → 1900s.

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Weekday};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// Separators accepted between date components.
pub const SEPARATORS: [char; 3] = ['.', '-', '/'];

/// Longest gap searched when local midnight falls inside a DST transition.
const MAX_GAP_MINUTES: i64 = 180;

/// A validated point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateValue(DateTime<Tz>);

impl DateValue {
    /// Parse `raw` as a calendar date at local midnight in `tz`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDate`] if the text is not one of the
    /// accepted shapes or names a date that does not exist (e.g. Feb 30).
    ///
    /// Typed text is strict: a day past the end of its month is rejected
    /// rather than rolled into the next month, so a typo is flagged on the
    /// input instead of silently counting from another date. Roll-over only
    /// happens in date arithmetic ([`shift_months_rolling`](Self::shift_months_rolling)).
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_tz::Tz;
    /// use datespan_engine::DateValue;
    ///
    /// let date = DateValue::parse("6.1.2023", Tz::UTC).unwrap();
    /// assert_eq!(date.format_display('.'), "6.1.2023");
    /// assert!(DateValue::parse("2.30.2023", Tz::UTC).is_err());
    /// ```
    pub fn parse(raw: &str, tz: Tz) -> Result<Self> {
        let date = parse_calendar_date(raw)
            .ok_or_else(|| EngineError::InvalidDate(format!("'{}'", raw.trim())))?;
        Self::from_local(date.and_time(chrono::NaiveTime::MIN), tz)
    }

    /// Build a value from a calendar date at local midnight in `tz`.
    pub fn from_date(date: NaiveDate, tz: Tz) -> Result<Self> {
        Self::from_local(date.and_time(chrono::NaiveTime::MIN), tz)
    }

    fn from_local(naive: NaiveDateTime, tz: Tz) -> Result<Self> {
        resolve_local(naive, tz)
            .map(DateValue)
            .ok_or_else(|| EngineError::InvalidDate(format!("'{naive}' does not exist in {tz}")))
    }

    /// The underlying instant in its timezone.
    pub fn instant(&self) -> DateTime<Tz> {
        self.0
    }

    /// Milliseconds since the Unix epoch.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn timezone(&self) -> Tz {
        self.0.timezone()
    }

    /// The calendar date as seen in the value's timezone.
    pub fn local_date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Step `days` calendar days, keeping the wall-clock time.
    ///
    /// Calendar stepping, not `days * 86400` seconds: across a DST change
    /// the result is still the same local time of day.
    pub fn shift_days(&self, days: i64) -> Result<Self> {
        let naive = self.0.naive_local();
        let shifted = naive
            .checked_add_signed(chrono::Duration::days(days))
            .ok_or_else(|| EngineError::InvalidDate(format!("'{naive}' + {days} days overflows")))?;
        Self::from_local(shifted, self.timezone())
    }

    /// Step `months` calendar months with day-of-month roll-over.
    ///
    /// The day of month is kept and any overflow spills into the following
    /// month, so Jan 31 + 1 month is Mar 3 (or Mar 2 in a leap year).
    pub fn shift_months_rolling(&self, months: u32) -> Result<Self> {
        let naive = self.0.naive_local();
        let month0 = naive.month0() + months;
        let year = naive.year() + (month0 / 12) as i32;
        let overflow = || EngineError::InvalidDate(format!("'{naive}' + {months} months overflows"));

        let first = NaiveDate::from_ymd_opt(year, month0 % 12 + 1, 1).ok_or_else(overflow)?;
        let date = first
            .checked_add_signed(chrono::Duration::days(i64::from(naive.day()) - 1))
            .ok_or_else(overflow)?;
        Self::from_local(date.and_time(naive.time()), self.timezone())
    }

    /// Format as `month sep day sep year`, one-based month, no zero padding.
    pub fn format_display(&self, sep: char) -> String {
        let d = self.local_date();
        format!("{}{sep}{}{sep}{}", d.month(), d.day(), d.year())
    }
}

impl std::fmt::Display for DateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.local_date().format("%Y-%m-%d"))
    }
}

// ── Internal helpers ────────────────────────────────────────────────────────

/// Map a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Nonexistent
/// times (DST spring-forward) move forward to the first local time that exists.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => (1..=MAX_GAP_MINUTES / 15).find_map(|step| {
            let later = naive.checked_add_signed(chrono::Duration::minutes(step * 15))?;
            tz.from_local_datetime(&later).earliest()
        }),
    }
}

/// Parse the accepted date shapes into a calendar date.
fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let sep = s.chars().find(|c| !c.is_ascii_digit())?;
    if !SEPARATORS.contains(&sep) {
        return None;
    }

    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let (year, month, day) = if parts[0].len() == 4 {
        (parts[0].parse().ok()?, parts[1], parts[2])
    } else {
        (expand_year(parts[2])?, parts[0], parts[1])
    };

    if month.len() > 2 || day.len() > 2 {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

/// Four-digit years pass through; two-digit years pivot at 50.
fn expand_year(s: &str) -> Option<i32> {
    let n: i32 = s.parse().ok()?;
    match s.len() {
        4 => Some(n),
        2 if n < 50 => Some(2000 + n),
        2 => Some(1900 + n),
        _ => None,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_dashes() {
        let date = DateValue::parse("2023-01-01", Tz::UTC).unwrap();
        assert_eq!(date.local_date(), ymd(2023, 1, 1));
        assert_eq!(date.epoch_millis(), 1_672_531_200_000);
    }

    #[test]
    fn test_parse_year_first_with_dots() {
        let date = DateValue::parse("2023.06.01", Tz::UTC).unwrap();
        assert_eq!(date.local_date(), ymd(2023, 6, 1));
    }

    #[test]
    fn test_parse_month_first() {
        let date = DateValue::parse("06.08.2023", Tz::UTC).unwrap();
        assert_eq!(date.local_date(), ymd(2023, 6, 8));

        let unpadded = DateValue::parse("6.8.2023", Tz::UTC).unwrap();
        assert_eq!(unpadded, date);
    }

    #[test]
    fn test_parse_slashes() {
        let date = DateValue::parse("12/25/2024", Tz::UTC).unwrap();
        assert_eq!(date.local_date(), ymd(2024, 12, 25));
    }

    #[test]
    fn test_parse_two_digit_year_pivot() {
        assert_eq!(
            DateValue::parse("1.2.23", Tz::UTC).unwrap().local_date(),
            ymd(2023, 1, 2)
        );
        assert_eq!(
            DateValue::parse("1.2.87", Tz::UTC).unwrap().local_date(),
            ymd(1987, 1, 2)
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(DateValue::parse("  2023-01-01 ", Tz::UTC).is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in [
            "",
            "hello",
            "2023",
            "2023-01",
            "2023-01-01-01",
            "2023-01.01",
            "2023 01 01",
            "1..2023",
            "123.1.2023",
            "1.1.202",
        ] {
            let err = DateValue::parse(raw, Tz::UTC).unwrap_err();
            assert!(matches!(err, EngineError::InvalidDate(_)), "{raw:?}: {err}");
        }
    }

    #[test]
    fn test_parse_rejects_nonexistent_dates() {
        assert!(DateValue::parse("2.30.2023", Tz::UTC).is_err());
        assert!(DateValue::parse("13.01.2023", Tz::UTC).is_err());
        assert!(DateValue::parse("2023-02-29", Tz::UTC).is_err());
        assert!(DateValue::parse("2024-02-29", Tz::UTC).is_ok());
    }

    #[test]
    fn test_parse_anchors_local_midnight() {
        let date = DateValue::parse("2023-01-01", Tz::America__New_York).unwrap();
        // Midnight EST is 05:00 UTC
        assert_eq!(date.epoch_millis(), 1_672_549_200_000);
        assert_eq!(date.instant().naive_local().time(), chrono::NaiveTime::MIN);
    }

    #[test]
    fn test_midnight_in_dst_gap_moves_forward() {
        // Santiago springs forward at local midnight on 2023-09-03
        let date = DateValue::parse("2023-09-03", Tz::America__Santiago).unwrap();
        assert_eq!(date.local_date(), ymd(2023, 9, 3));
        assert_eq!(
            date.instant().naive_local().time(),
            chrono::NaiveTime::from_hms_opt(1, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_ordering_is_by_instant() {
        let a = DateValue::parse("2023-05-01", Tz::UTC).unwrap();
        let b = DateValue::parse("2023-05-10", Tz::UTC).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_shift_days_keeps_wall_clock_across_dst() {
        // US spring forward on 2023-03-12
        let start = DateValue::parse("2023-03-11", Tz::America__New_York).unwrap();
        let next = start.shift_days(1).unwrap();
        assert_eq!(next.local_date(), ymd(2023, 3, 12));
        assert_eq!(next.instant().naive_local().time(), chrono::NaiveTime::MIN);
        let after = next.shift_days(1).unwrap();
        // The 12th is only 23 hours long
        assert_eq!(after.epoch_millis() - next.epoch_millis(), 23 * 3_600_000);
    }

    #[test]
    fn test_shift_months_rolls_over() {
        let base = DateValue::parse("2023-01-31", Tz::UTC).unwrap();
        assert_eq!(
            base.shift_months_rolling(1).unwrap().local_date(),
            ymd(2023, 3, 3)
        );

        let leap = DateValue::parse("2024-01-31", Tz::UTC).unwrap();
        assert_eq!(
            leap.shift_months_rolling(1).unwrap().local_date(),
            ymd(2024, 3, 2)
        );
    }

    #[test]
    fn test_shift_months_crosses_year() {
        let base = DateValue::parse("2023-12-15", Tz::UTC).unwrap();
        assert_eq!(
            base.shift_months_rolling(1).unwrap().local_date(),
            ymd(2024, 1, 15)
        );
    }

    #[test]
    fn test_format_display_unpadded() {
        let date = DateValue::parse("2023-06-08", Tz::UTC).unwrap();
        assert_eq!(date.format_display('.'), "6.8.2023");
        assert_eq!(date.format_display('/'), "6/8/2023");
        assert_eq!(date.to_string(), "2023-06-08");
    }

    #[test]
    fn test_formatted_output_parses_back() {
        let date = DateValue::parse("2023-11-30", Tz::Europe__Berlin).unwrap();
        let text = date.format_display('.');
        assert_eq!(DateValue::parse(&text, Tz::Europe__Berlin).unwrap(), date);
    }
}
