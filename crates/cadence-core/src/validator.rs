//! Classify and check a raw descriptor, producing a [`TriggerDescriptor`].
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. classify `trigger_type`
//! 2. `start_year`, `start_month`, `start_day`, `start_hour`, `start_minute`
//!    present and forming a real date-time; end date absent, all zero, or real
//! 3. the kind's required fields present, bit-sets non-empty
//! 4. no keys from another kind's payload (and, optionally, no unknown keys)
//! 5. duration fields read, with non-positive or zero values treated as unset
//!
//! The raw map is never modified and nothing is returned on failure.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::descriptor::{Repetition, TriggerDescriptor, TriggerPayload};
use crate::errors::TriggerError;
use crate::flags::{DaysOfMonth, DaysOfWeek, FlagSet, MonthsOfYear, WeeksOfMonth};
use crate::kind::{COMMON_FIELDS, SessionStateChange, TriggerKind, classify};
use crate::raw::{Fields, RawDescriptor, kind_value};

const START_FIELDS: [&str; 5] = [
    "start_year",
    "start_month",
    "start_day",
    "start_hour",
    "start_minute",
];
const END_FIELDS: [&str; 3] = ["end_year", "end_month", "end_day"];

/// Knobs for the checks that legacy callers do not expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Raise `EndBeforeStart` when the end date precedes the start date.
    pub reject_end_before_start: bool,
    /// Parse duration strings with [`Duration::parse_strict`](crate::Duration::parse_strict).
    pub strict_durations: bool,
    /// Raise `UnknownField` for keys that no trigger kind defines.
    pub reject_unknown_fields: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            reject_end_before_start: false,
            strict_durations: false,
            reject_unknown_fields: true,
        }
    }
}

/// Validates raw descriptors under a fixed set of [`ValidationOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    #[must_use]
    pub const fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> ValidationOptions {
        self.options
    }

    /// Build the canonical descriptor for `raw`.
    ///
    /// # Errors
    ///
    /// The first failed check, as a [`TriggerError`] naming the field.
    pub fn validate(&self, raw: &RawDescriptor) -> Result<TriggerDescriptor, TriggerError> {
        let kind = classify(kind_value(raw))?;
        let fields = Fields::from_raw(raw)?;

        let start = read_start(&fields)?;
        let end = read_end(&fields)?;
        let payload = self.read_payload(kind, &fields)?;
        self.check_keys(kind, &fields)?;

        let strict = self.options.strict_durations;
        let random_delay = fields.duration("random_minutes_interval", strict)?;
        let repetition = Repetition {
            interval: fields.duration("minutes_interval", strict)?,
            duration: fields.duration("minutes_duration", strict)?,
            stop_at_duration_end: fields.bool("stop_at_duration_end")?.unwrap_or(false),
        }
        .normalized();

        let reject_end = self.options.reject_end_before_start;
        if let Some(end) = end.filter(|end| reject_end && *end < start.date()) {
            return Err(TriggerError::EndBeforeStart {
                start: start.format("%Y-%m-%dT%H:%M").to_string(),
                end: end.to_string(),
            });
        }

        tracing::debug!(%kind, fields = fields.len(), "validated trigger");
        Ok(TriggerDescriptor {
            start,
            end,
            random_delay,
            repetition,
            payload,
        })
    }

    fn read_payload(&self, kind: TriggerKind, fields: &Fields) -> Result<TriggerPayload, TriggerError> {
        let strict = self.options.strict_durations;
        let payload = match kind {
            TriggerKind::Once => TriggerPayload::Once,
            TriggerKind::Daily => TriggerPayload::Daily {
                days_interval: interval(fields, "days_interval")?,
            },
            TriggerKind::Weekly => TriggerPayload::Weekly {
                days_of_week: required_bits::<DaysOfWeek>(kind, fields, "days_of_week")?,
                weeks_interval: interval(fields, "weeks_interval")?,
            },
            TriggerKind::MonthlyByDate => TriggerPayload::MonthlyByDate {
                months: required_bits::<MonthsOfYear>(kind, fields, "months")?,
                days_of_month: required_bits::<DaysOfMonth>(kind, fields, "days_of_month")?,
                run_on_last_day_of_month: fields.bool("run_on_last_day_of_month")?.unwrap_or(false),
            },
            TriggerKind::MonthlyByDayOfWeek => TriggerPayload::MonthlyByDayOfWeek {
                months: required_bits::<MonthsOfYear>(kind, fields, "months")?,
                days_of_week: required_bits::<DaysOfWeek>(kind, fields, "days_of_week")?,
                weeks_of_month: required_bits::<WeeksOfMonth>(kind, fields, "weeks_of_month")?,
                run_on_last_week_of_month: fields
                    .bool("run_on_last_week_of_month")?
                    .unwrap_or(false),
            },
            TriggerKind::AtLogon => TriggerPayload::AtLogon {
                delay: fields.duration("delay_duration", strict)?,
                user_id: fields.string("user_id")?,
            },
            TriggerKind::AtSystemStart => TriggerPayload::AtSystemStart {
                delay: fields.duration("delay_duration", strict)?,
            },
            TriggerKind::OnIdle => TriggerPayload::OnIdle {
                execution_time_limit: fields.duration("execution_time_limit", strict)?,
            },
            TriggerKind::OnSessionStateChange => TriggerPayload::OnSessionStateChange {
                state_change: state_change(fields)?,
                delay: fields.duration("delay_duration", strict)?,
                user_id: fields.string("user_id")?,
            },
        };
        Ok(payload)
    }

    /// Reject keys owned by another kind, then keys owned by none.
    fn check_keys(&self, kind: TriggerKind, fields: &Fields) -> Result<(), TriggerError> {
        let schema = kind.schema();
        for key in fields.keys() {
            if COMMON_FIELDS.contains(&key) || schema.allows(key) {
                continue;
            }
            if TriggerKind::ALL.iter().any(|other| other.schema().allows(key)) {
                return Err(TriggerError::UnexpectedField {
                    field: key.to_string(),
                    kind: kind.label(),
                });
            }
            if self.options.reject_unknown_fields {
                return Err(TriggerError::UnknownField(key.to_string()));
            }
            tracing::warn!(%kind, key, "ignoring unknown trigger field");
        }
        Ok(())
    }
}

/// Validate `raw` with default options.
///
/// # Errors
///
/// See [`Validator::validate`].
pub fn validate(raw: &RawDescriptor) -> Result<TriggerDescriptor, TriggerError> {
    Validator::default().validate(raw)
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

fn ranged(fields: &Fields, key: &str, low: i64, high: i64) -> Result<Option<u32>, TriggerError> {
    let Some(value) = fields.int(key)? else {
        return Ok(None);
    };
    if !(low..=high).contains(&value) {
        return Err(TriggerError::invalid(
            key,
            format!("{value} is outside {low}..={high}"),
        ));
    }
    u32::try_from(value)
        .map(Some)
        .map_err(|_| TriggerError::invalid(key, format!("{value} is out of range")))
}

fn date(year: u32, month: u32, day: u32, field: &str) -> Result<NaiveDate, TriggerError> {
    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(|| {
            TriggerError::invalid(
                field,
                format!("{year:04}-{month:02}-{day:02} is not a calendar date"),
            )
        })
}

fn read_start(fields: &Fields) -> Result<NaiveDateTime, TriggerError> {
    let bounds = [(1, 9999), (1, 12), (1, 31), (0, 23), (0, 59)];
    let mut parts = [0_u32; 5];
    for ((key, (low, high)), slot) in START_FIELDS.iter().zip(bounds).zip(&mut parts) {
        *slot = ranged(fields, key, low, high)?
            .ok_or_else(|| TriggerError::MissingField((*key).to_string()))?;
    }
    let [year, month, day, hour, minute] = parts;
    date(year, month, day, "start_day")?
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| {
            TriggerError::invalid("start_hour", format!("{hour:02}:{minute:02} is not a time of day"))
        })
}

/// An absent or all-zero end date means "no end boundary".
fn read_end(fields: &Fields) -> Result<Option<NaiveDate>, TriggerError> {
    let parts = END_FIELDS
        .iter()
        .map(|key| fields.int(key))
        .collect::<Result<Vec<_>, _>>()?;
    if parts.iter().all(|part| matches!(part, None | Some(0))) {
        return Ok(None);
    }
    if let Some(missing) = END_FIELDS
        .iter()
        .zip(&parts)
        .find_map(|(key, part)| part.is_none().then_some(*key))
    {
        return Err(TriggerError::MissingField(missing.to_string()));
    }

    let year = ranged(fields, "end_year", 1, 9999)?;
    let month = ranged(fields, "end_month", 1, 12)?;
    let day = ranged(fields, "end_day", 1, 31)?;
    match (year, month, day) {
        (Some(year), Some(month), Some(day)) => date(year, month, day, "end_day").map(Some),
        _ => Ok(None),
    }
}

fn required_bits<F: FlagSet>(
    kind: TriggerKind,
    fields: &Fields,
    key: &str,
) -> Result<F, TriggerError> {
    fields
        .bits::<F>(key)?
        .filter(|bits| *bits != F::default())
        .ok_or_else(|| TriggerError::EmptyBitSet {
            field: key.to_string(),
            kind: kind.label(),
        })
}

/// Interval counts default to 1 when absent or non-positive.
fn interval(fields: &Fields, key: &str) -> Result<u32, TriggerError> {
    match fields.int(key)? {
        Some(value) if value > 0 => u32::try_from(value)
            .map_err(|_| TriggerError::invalid(key, format!("{value} is out of range"))),
        _ => Ok(1),
    }
}

fn state_change(fields: &Fields) -> Result<SessionStateChange, TriggerError> {
    let key = "state_change";
    let Some(value) = fields.get(key) else {
        return Err(TriggerError::MissingField(key.to_string()));
    };
    match value {
        serde_json::Value::String(name) => name
            .parse()
            .map_err(|reason: String| TriggerError::invalid(key, reason)),
        _ => {
            let code = fields.int(key)?.unwrap_or_default();
            u32::try_from(code)
                .ok()
                .and_then(SessionStateChange::from_code)
                .ok_or_else(|| TriggerError::invalid(key, format!("unknown state change code {code}")))
        }
    }
}
