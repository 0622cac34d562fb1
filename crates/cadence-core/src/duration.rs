//! Calendar-relative durations in the `PnYnMnDTnHnMnS` encoding.
//!
//! A [`Duration`] keeps each component optional: `P0D` and the empty
//! duration are different values, and the empty duration formats as `""`
//! rather than `"P"`. Converting to an absolute span needs a reference
//! instant because years, months, and days are not fixed-length.
//!
//! # Lenient parsing
//!
//! [`Duration::parse`] never fails. It scans `<digits><unit>` tokens within
//! the date half and the time half (split on the first `T`) and discards
//! anything else. This masks malformed input: `P5M` is five *months* even if
//! the author meant minutes, and a unit given twice keeps the last value.
//! Both cases are logged at `warn`. Use [`Duration::parse_strict`] when the
//! text must be well-formed.

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, Timelike};
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Serialize};

use crate::calendar::days_in_month;
use crate::errors::DurationError;

/// Days in any 400-year Gregorian cycle.
const DAYS_PER_CYCLE: i64 = 146_097;

/// A calendar-relative span of time. Absent components are `None`.
///
/// Serialized as its `PnYnMnDTnHnMnS` text; deserialization is strict, and
/// the empty string reads back as the empty duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Duration {
    pub years: Option<u32>,
    pub months: Option<u32>,
    pub days: Option<u32>,
    pub hours: Option<u32>,
    pub minutes: Option<u32>,
    pub seconds: Option<u32>,
}

/// The two halves of the encoding. `M` means months in the date half and
/// minutes in the time half.
#[derive(Debug, Clone, Copy)]
enum Half {
    Date,
    Time,
}

impl Half {
    const fn units(self) -> [char; 3] {
        match self {
            Self::Date => ['Y', 'M', 'D'],
            Self::Time => ['H', 'M', 'S'],
        }
    }

    fn rank(self, unit: u8) -> Option<usize> {
        self.units().iter().position(|u| *u == char::from(unit))
    }

    fn slot(self, duration: &mut Duration, rank: usize) -> &mut Option<u32> {
        match (self, rank) {
            (Self::Date, 0) => &mut duration.years,
            (Self::Date, 1) => &mut duration.months,
            (Self::Date, _) => &mut duration.days,
            (Self::Time, 0) => &mut duration.hours,
            (Self::Time, 1) => &mut duration.minutes,
            (Self::Time, _) => &mut duration.seconds,
        }
    }
}

impl Duration {
    /// A duration of `minutes` minutes (`PTnM`).
    #[must_use]
    pub const fn from_minutes(minutes: u32) -> Self {
        Self {
            years: None,
            months: None,
            days: None,
            hours: None,
            minutes: Some(minutes),
            seconds: None,
        }
    }

    /// A duration of `seconds` seconds (`PTnS`).
    #[must_use]
    pub const fn from_seconds(seconds: u32) -> Self {
        Self {
            years: None,
            months: None,
            days: None,
            hours: None,
            minutes: None,
            seconds: Some(seconds),
        }
    }

    /// True when every component is absent.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.years.is_none()
            && self.months.is_none()
            && self.days.is_none()
            && self.hours.is_none()
            && self.minutes.is_none()
            && self.seconds.is_none()
    }

    /// True when every component is absent or zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.components().iter().all(|c| c.unwrap_or(0) == 0)
    }

    const fn components(&self) -> [Option<u32>; 6] {
        [
            self.years,
            self.months,
            self.days,
            self.hours,
            self.minutes,
            self.seconds,
        ]
    }

    const fn has_time(&self) -> bool {
        self.hours.is_some() || self.minutes.is_some() || self.seconds.is_some()
    }

    /// Parse leniently. Never fails; text without a leading `P` yields the
    /// empty duration.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut duration = Self::default();
        let trimmed = text.trim();
        let Some(body) = trimmed.strip_prefix('P') else {
            if !trimmed.is_empty() {
                tracing::warn!(text, "duration lacks 'P' designator; treating as empty");
            }
            return duration;
        };

        let (date, time) = body.split_once('T').unwrap_or((body, ""));
        let mut discarded = scan_lenient(Half::Date, date, &mut duration, text);
        discarded |= scan_lenient(Half::Time, time, &mut duration, text);
        if discarded {
            tracing::warn!(text, parsed = %duration, "duration contained unrecognized text");
        }
        duration
    }

    /// Parse with the strict grammar: `P`, then date components in `Y M D`
    /// order, then optionally `T` and time components in `H M S` order, each
    /// unit at most once and at least one component overall.
    ///
    /// # Errors
    ///
    /// Returns a [`DurationError`] describing the first violation.
    pub fn parse_strict(text: &str) -> Result<Self, DurationError> {
        let body = text
            .strip_prefix('P')
            .ok_or_else(|| DurationError::MissingDesignator(text.to_string()))?;

        let mut duration = Self::default();
        let (date, time) = match body.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (body, None),
        };

        let date_count = scan_strict(Half::Date, date, 1, &mut duration, text)?;
        let time_count = match time {
            Some(time) => {
                let count = scan_strict(Half::Time, time, date.len() + 2, &mut duration, text)?;
                if count == 0 {
                    return Err(DurationError::Empty(text.to_string()));
                }
                count
            }
            None => 0,
        };

        if date_count + time_count == 0 {
            return Err(DurationError::Empty(text.to_string()));
        }
        Ok(duration)
    }

    /// Render as `P<Y>Y<M>M<D>DT<H>H<M>M<S>S`, omitting absent components
    /// and the `T` when no time component is present. The empty duration
    /// renders as `""`.
    #[must_use]
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Seconds between `reference` and `reference + self`.
    ///
    /// Components are added field-wise, seconds/minutes/hours carry upward,
    /// surplus days are consumed month by month starting at the reference
    /// month, and the month count carries into years with an exact multiple
    /// of 12 kept as December of the previous year. Saturates at `i64::MAX`
    /// if the result leaves chrono's calendar range.
    #[must_use]
    pub fn to_seconds(&self, reference: NaiveDateTime) -> i64 {
        let reference = reference.with_nanosecond(0).unwrap_or(reference);
        let field = |value: Option<u32>| i64::from(value.unwrap_or(0));

        let mut year = i64::from(reference.year()) + field(self.years);
        let mut month = i64::from(reference.month()) + field(self.months);
        let mut day = i64::from(reference.day()) + field(self.days);
        let mut hour = i64::from(reference.hour()) + field(self.hours);
        let mut minute = i64::from(reference.minute()) + field(self.minutes);
        let mut second = i64::from(reference.second()) + field(self.seconds);

        (second, minute) = carry(second, minute, 60);
        (minute, hour) = carry(minute, hour, 60);
        (hour, day) = carry(hour, day, 24);

        let (spilled_day, months_spanned, years_spanned) =
            spill_days(day, reference.month(), i64::from(reference.year()));
        day = spilled_day;
        month += months_spanned;
        year += years_spanned;
        (month, year) = carry_months(month, year);

        match assemble(year, month, day, hour, minute, second) {
            Some(future) => future.signed_duration_since(reference).num_seconds(),
            None => {
                tracing::warn!(duration = %self, %reference, "duration leaves the representable calendar range; saturating");
                i64::MAX
            }
        }
    }

    /// Whole minutes between `reference` and `reference + self` (truncating).
    #[must_use]
    pub fn to_minutes(&self, reference: NaiveDateTime) -> i64 {
        self.to_seconds(reference) / 60
    }

    /// [`to_seconds`](Self::to_seconds) measured from the local clock.
    #[must_use]
    pub fn to_seconds_from_now(&self) -> i64 {
        self.to_seconds(Local::now().naive_local())
    }

    /// [`to_minutes`](Self::to_minutes) measured from the local clock.
    #[must_use]
    pub fn to_minutes_from_now(&self) -> i64 {
        self.to_minutes(Local::now().naive_local())
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_absent() {
            return Ok(());
        }
        f.write_str("P")?;
        for (value, unit) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if let Some(value) = value {
                write!(f, "{value}{unit}")?;
            }
        }
        if self.has_time() {
            f.write_str("T")?;
            for (value, unit) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if let Some(value) = value {
                    write!(f, "{value}{unit}")?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<Duration> for String {
    fn from(duration: Duration) -> Self {
        duration.format()
    }
}

impl TryFrom<String> for Duration {
    type Error = DurationError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        if text.is_empty() {
            Ok(Self::default())
        } else {
            Self::parse_strict(&text)
        }
    }
}

impl JsonSchema for Duration {
    fn schema_name() -> Cow<'static, str> {
        "Duration".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "description": "Calendar duration as PnYnMnDTnHnMnS, or empty for none",
            "pattern": "^(P(\\d+Y)?(\\d+M)?(\\d+D)?(T(\\d+H)?(\\d+M)?(\\d+S)?)?)?$"
        })
    }
}

/// Scan `<digits><unit>` tokens, skipping anything else. Returns whether any
/// text was discarded.
fn scan_lenient(half: Half, part: &str, out: &mut Duration, source: &str) -> bool {
    let bytes = part.as_bytes();
    let mut discarded = false;
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            discarded = true;
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let Some(rank) = bytes.get(i).and_then(|unit| half.rank(*unit)) else {
            discarded = true;
            continue;
        };
        i += 1;

        let digits = &part[start..i - 1];
        let Ok(value) = digits.parse::<u32>() else {
            tracing::warn!(text = source, digits, "duration component overflows; ignored");
            discarded = true;
            continue;
        };
        tracing::trace!(unit = %half.units()[rank], value, "duration token");
        if half.slot(out, rank).replace(value).is_some() {
            tracing::warn!(
                text = source,
                unit = %half.units()[rank],
                "duration repeats a unit; keeping the last value"
            );
        }
    }
    discarded
}

/// Scan one half under the strict grammar. Returns the number of components.
fn scan_strict(
    half: Half,
    part: &str,
    offset: usize,
    out: &mut Duration,
    source: &str,
) -> Result<usize, DurationError> {
    let bytes = part.as_bytes();
    let unrecognized = |at: usize| DurationError::Unrecognized {
        text: source.to_string(),
        position: offset + at,
    };
    let mut next_rank = 0;
    let mut count = 0;
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return Err(unrecognized(i));
        }
        let unit = *bytes.get(i).ok_or_else(|| unrecognized(i))?;
        let rank = half.rank(unit).ok_or_else(|| unrecognized(i))?;
        let value = part[start..i]
            .parse::<u32>()
            .map_err(|_| DurationError::Overflow {
                text: source.to_string(),
            })?;

        let slot = half.slot(out, rank);
        if slot.is_some() {
            return Err(DurationError::DuplicateUnit {
                text: source.to_string(),
                unit: char::from(unit),
            });
        }
        if rank < next_rank {
            return Err(DurationError::OutOfOrder {
                text: source.to_string(),
                unit: char::from(unit),
            });
        }
        *slot = Some(value);
        next_rank = rank + 1;
        count += 1;
        i += 1;
    }
    Ok(count)
}

/// Move whole multiples of `base` from `low` into `high`.
const fn carry(low: i64, high: i64, base: i64) -> (i64, i64) {
    (low.rem_euclid(base), high + low.div_euclid(base))
}

/// Consume surplus days month by month starting at (`month`, `year`).
/// Returns the remaining day-of-month and how many months and years were
/// crossed.
fn spill_days(days: i64, month: u32, year: i64) -> (i64, i64, i64) {
    let mut remaining = days;
    let mut current_month = month;
    let mut current_year = year;
    let mut day = days;

    // Every 400-year cycle has the same length regardless of starting month.
    if remaining > DAYS_PER_CYCLE {
        let cycles = (remaining - 1) / DAYS_PER_CYCLE;
        remaining -= cycles * DAYS_PER_CYCLE;
        current_year += cycles * 400;
        day = remaining;
    }

    loop {
        remaining -= i64::from(days_in_month(current_month, current_year));
        if remaining <= 0 {
            break;
        }
        current_month += 1;
        if current_month > 12 {
            current_month = 1;
            current_year += 1;
        }
        day = remaining;
    }

    (
        day,
        i64::from(current_month) - i64::from(month),
        current_year - year,
    )
}

/// Fold a 1-based month count into years. A count that is an exact
/// multiple of 12 stays at month 12 with one year less of carry.
const fn carry_months(month: i64, year: i64) -> (i64, i64) {
    let mut years = month.div_euclid(12);
    let mut month = month.rem_euclid(12);
    if years > 0 && month == 0 {
        month = 12;
        years -= 1;
    }
    (month, year + years)
}

/// Build the target instant. The day may exceed the month's length (up to
/// 31) and rolls forward into the next month.
fn assemble(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
) -> Option<NaiveDateTime> {
    let first = NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        1,
    )?;
    first
        .checked_add_days(Days::new(u64::try_from(day - 1).ok()?))?
        .and_hms_opt(
            u32::try_from(hour).ok()?,
            u32::try_from(minute).ok()?,
            u32::try_from(second).ok()?,
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn full(y: u32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Duration {
        Duration {
            years: Some(y),
            months: Some(mo),
            days: Some(d),
            hours: Some(h),
            minutes: Some(mi),
            seconds: Some(s),
        }
    }

    // --- parse ---

    #[test]
    fn parses_date_part() {
        let d = Duration::parse("P10Y10M10D");
        assert_eq!(d.years, Some(10));
        assert_eq!(d.months, Some(10));
        assert_eq!(d.days, Some(10));
        assert!(!d.has_time());
    }

    #[test]
    fn parses_time_part() {
        let d = Duration::parse("PT10H10M10S");
        assert_eq!(
            d,
            Duration {
                hours: Some(10),
                minutes: Some(10),
                seconds: Some(10),
                ..Duration::default()
            }
        );
    }

    #[test]
    fn parses_date_and_time() {
        assert_eq!(Duration::parse("P10Y10M10DT10H10M10S"), full(10, 10, 10, 10, 10, 10));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("10M")]
    #[case("garbage")]
    #[case("P")]
    #[case("PT")]
    fn untokenizable_text_is_empty(#[case] text: &str) {
        assert!(Duration::parse(text).is_absent());
    }

    #[test]
    fn lenient_parser_ignores_stray_text() {
        let d = Duration::parse("P1Yx2Q3DT4Hzz");
        assert_eq!(d.years, Some(1));
        assert_eq!(d.days, Some(3));
        assert_eq!(d.hours, Some(4));
        assert_eq!(d.months, None);
    }

    #[test]
    fn lenient_parser_keeps_last_duplicate() {
        assert_eq!(Duration::parse("P1D2D").days, Some(2));
    }

    #[test]
    fn lenient_parser_accepts_any_unit_order() {
        assert_eq!(Duration::parse("P3D1Y"), Duration::parse("P1Y3D"));
    }

    #[test]
    fn m_without_t_is_months() {
        let d = Duration::parse("P5M");
        assert_eq!(d.months, Some(5));
        assert_eq!(d.minutes, None);
    }

    #[test]
    fn zero_components_are_present() {
        let d = Duration::parse("P0D");
        assert_eq!(d.days, Some(0));
        assert!(!d.is_absent());
        assert!(d.is_zero());
    }

    #[test]
    fn overflowing_component_is_ignored() {
        let d = Duration::parse("PT99999999999M5S");
        assert_eq!(d.minutes, None);
        assert_eq!(d.seconds, Some(5));
    }

    // --- parse_strict ---

    #[test]
    fn strict_accepts_canonical_text() {
        assert_eq!(
            Duration::parse_strict("P10Y10M10DT10H10M10S").unwrap(),
            full(10, 10, 10, 10, 10, 10)
        );
        assert_eq!(Duration::parse_strict("PT5M").unwrap(), Duration::from_minutes(5));
    }

    #[test]
    fn strict_rejects_missing_designator() {
        assert_eq!(
            Duration::parse_strict("T5M"),
            Err(DurationError::MissingDesignator("T5M".into()))
        );
    }

    #[rstest]
    #[case("P")]
    #[case("PT")]
    #[case("P1DT")]
    fn strict_rejects_empty_halves(#[case] text: &str) {
        assert_eq!(
            Duration::parse_strict(text),
            Err(DurationError::Empty(text.into()))
        );
    }

    #[test]
    fn strict_rejects_duplicates_and_disorder() {
        assert_eq!(
            Duration::parse_strict("P1D2D"),
            Err(DurationError::DuplicateUnit {
                text: "P1D2D".into(),
                unit: 'D'
            })
        );
        assert_eq!(
            Duration::parse_strict("P3D1Y"),
            Err(DurationError::OutOfOrder {
                text: "P3D1Y".into(),
                unit: 'Y'
            })
        );
    }

    #[test]
    fn strict_reports_position_of_stray_text() {
        assert_eq!(
            Duration::parse_strict("P1Yx"),
            Err(DurationError::Unrecognized {
                text: "P1Yx".into(),
                position: 3
            })
        );
        assert_eq!(
            Duration::parse_strict("P1DT5X"),
            Err(DurationError::Unrecognized {
                text: "P1DT5X".into(),
                position: 5
            })
        );
    }

    #[test]
    fn strict_rejects_overflow() {
        assert!(matches!(
            Duration::parse_strict("PT99999999999M"),
            Err(DurationError::Overflow { .. })
        ));
    }

    // --- format ---

    #[rstest]
    #[case(full(10, 10, 10, 10, 10, 10), "P10Y10M10DT10H10M10S")]
    #[case(Duration::from_minutes(2), "PT2M")]
    #[case(Duration::from_seconds(90), "PT90S")]
    #[case(Duration { days: Some(3), ..Duration::default() }, "P3D")]
    #[case(Duration { years: Some(1), seconds: Some(4), ..Duration::default() }, "P1YT4S")]
    #[case(Duration::default(), "")]
    fn formats(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(duration.format(), expected);
    }

    #[test]
    fn format_then_parse_is_identity() {
        let samples = [
            full(0, 0, 0, 0, 0, 0),
            full(999, 999, 999, 999, 999, 999),
            Duration { months: Some(24), ..Duration::default() },
            Duration { hours: Some(1), seconds: Some(7), ..Duration::default() },
            Duration { years: Some(3), minutes: Some(0), ..Duration::default() },
            Duration::from_minutes(1),
        ];
        for sample in samples {
            assert_eq!(Duration::parse(&sample.format()), sample, "{sample}");
            assert_eq!(Duration::parse_strict(&sample.format()).unwrap(), sample);
        }
    }

    // --- arithmetic ---

    #[rstest]
    #[case(at(2004, 1, 1))]
    #[case(at(2003, 1, 1))]
    fn legacy_fixture_values(#[case] reference: NaiveDateTime) {
        assert_eq!(Duration::parse("P10Y10M10D").to_seconds(reference), 342_748_800);
        assert_eq!(Duration::parse("PT10H10M10S").to_seconds(reference), 36_610);
        assert_eq!(
            Duration::parse("P10Y10M10DT10H10M10S").to_seconds(reference),
            342_785_410
        );
        assert_eq!(Duration::parse("P10Y10M10D").to_minutes(reference), 5_712_480);
        assert_eq!(Duration::parse("PT10H10M10S").to_minutes(reference), 610);
        assert_eq!(
            Duration::parse("P10Y10M10DT10H10M10S").to_minutes(reference),
            5_713_090
        );
    }

    #[test]
    fn empty_duration_is_zero_seconds() {
        assert_eq!(Duration::parse("").to_seconds(at(2004, 1, 1)), 0);
        assert_eq!(Duration::default().to_minutes(at(2004, 1, 1)), 0);
    }

    #[test]
    fn one_month_tracks_february_length() {
        let p1m = Duration::parse("P1M");
        assert_eq!(p1m.to_seconds(at(2004, 2, 1)), 29 * 86_400);
        assert_eq!(p1m.to_seconds(at(2003, 2, 1)), 28 * 86_400);
    }

    #[test]
    fn month_multiples_of_twelve() {
        let reference = at(2003, 1, 1);
        assert_eq!(Duration::parse("P12M").to_seconds(reference), 365 * 86_400);
        assert_eq!(Duration::parse("P24M").to_seconds(reference), (365 + 366) * 86_400);
        assert_eq!(
            Duration::parse("P1Y12M").to_seconds(reference),
            Duration::parse("P24M").to_seconds(reference)
        );
    }

    #[test]
    fn month_count_landing_on_december_keeps_the_year() {
        // 12 + 12 months from December lands on December of the next year,
        // not month 0 two years on.
        let reference = at(2003, 12, 1);
        assert_eq!(Duration::parse("P12M").to_seconds(reference), 366 * 86_400);
        assert_eq!(Duration::parse("P24M").to_seconds(reference), (366 + 365) * 86_400);
        assert_eq!(Duration::parse("P0M").to_seconds(reference), 0);
    }

    #[test]
    fn carry_months_tie_break() {
        assert_eq!(carry_months(12, 2003), (12, 2003));
        assert_eq!(carry_months(24, 2003), (12, 2004));
        assert_eq!(carry_months(13, 2003), (1, 2004));
        assert_eq!(carry_months(25, 2003), (1, 2005));
    }

    #[test]
    fn surplus_days_spill_across_months() {
        // Jan 1 + 61 days -> Mar 3 in a common year, Mar 2 in a leap year.
        assert_eq!(Duration::parse("P61D").to_seconds(at(2003, 1, 1)), 61 * 86_400);
        assert_eq!(Duration::parse("P61D").to_seconds(at(2004, 1, 1)), 61 * 86_400);
        assert_eq!(spill_days(62, 1, 2003), (3, 2, 0));
        assert_eq!(spill_days(31, 1, 2003), (31, 0, 0));
        assert_eq!(spill_days(40, 12, 2003), (9, -11, 1));
    }

    #[test]
    fn day_beyond_month_end_rolls_forward() {
        // Jan 31 + 1 month is "Feb 31", which rolls to Mar 3 (Mar 2 in a leap year).
        assert_eq!(Duration::parse("P1M").to_seconds(at(2003, 1, 31)), 31 * 86_400);
        assert_eq!(Duration::parse("P1M").to_seconds(at(2004, 1, 31)), 31 * 86_400);
    }

    #[test]
    fn time_components_carry() {
        let reference = at(2004, 1, 1);
        assert_eq!(Duration::parse("PT90M").to_seconds(reference), 5_400);
        assert_eq!(Duration::parse("PT25H").to_seconds(reference), 25 * 3_600);
        assert_eq!(Duration::parse("PT61S").to_minutes(reference), 1);
    }

    #[test]
    fn large_day_counts_are_bounded() {
        let reference = at(2004, 1, 1);
        let days = Duration {
            days: Some(1_000_000),
            ..Duration::default()
        };
        assert_eq!(days.to_seconds(reference), 1_000_000 * 86_400);
    }

    #[test]
    fn out_of_range_saturates() {
        let huge = Duration {
            years: Some(u32::MAX),
            ..Duration::default()
        };
        assert_eq!(huge.to_seconds(at(2004, 1, 1)), i64::MAX);
    }

    #[test]
    fn non_empty_durations_are_positive() {
        let reference = at(2004, 3, 15);
        for text in ["P1Y", "P1M", "P1D", "PT1H", "PT1M", "PT1S", "P2Y3M4DT5H6M7S"] {
            assert!(Duration::parse(text).to_seconds(reference) > 0, "{text}");
        }
    }

    #[test]
    fn subsecond_reference_is_truncated() {
        let reference = at(2004, 1, 1).with_nanosecond(999_999_999).unwrap();
        assert_eq!(Duration::from_seconds(1).to_seconds(reference), 1);
    }

    #[test]
    fn from_now_uses_the_local_clock() {
        let clock_only = Duration::parse("PT10H10M10S");
        assert_eq!(clock_only.to_minutes_from_now(), 610);
        assert_eq!(clock_only.to_seconds_from_now(), 36_610);
        assert!(Duration::parse("P1Y").to_minutes_from_now() >= 365 * 24 * 60);
    }

    // --- serde ---

    #[test]
    fn serializes_as_text() {
        let duration = Duration::parse("P1DT2H");
        assert_eq!(serde_json::to_value(duration).unwrap(), serde_json::json!("P1DT2H"));
        assert_eq!(
            serde_json::to_value(Duration::default()).unwrap(),
            serde_json::json!("")
        );

        let back: Duration = serde_json::from_value(serde_json::json!("P1DT2H")).unwrap();
        assert_eq!(back, duration);
        let empty: Duration = serde_json::from_value(serde_json::json!("")).unwrap();
        assert!(empty.is_absent());
    }

    #[test]
    fn deserialization_is_strict() {
        for text in ["5 minutes", "PT5M5M", "T5M"] {
            let result = serde_json::from_value::<Duration>(serde_json::json!(text));
            assert!(result.is_err(), "{text}");
        }
        assert!(serde_json::from_value::<Duration>(serde_json::json!({ "minutes": 5 })).is_err());
    }
}
