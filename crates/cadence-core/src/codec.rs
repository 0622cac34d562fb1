//! Conversion between [`TriggerDescriptor`] and its wire representation.
//!
//! [`WireTrigger`] is the external shape exchanged with the task store:
//! boundaries as fixed-width strings, durations as duration strings, bit-sets
//! as integer masks. Decoding goes back through the validator so stored data
//! meets the same invariants as caller input.
//!
//! [`to_raw`] produces the flat legacy read-back map instead, with durations
//! as minute counts relative to a reference instant.

use chrono::{Datelike, NaiveDateTime, Timelike};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::descriptor::{Repetition, TriggerDescriptor, TriggerPayload};
use crate::duration::Duration;
use crate::errors::TriggerError;
use crate::flags::FlagSet;
use crate::raw::RawDescriptor;
use crate::validator::Validator;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A trigger as stored or exchanged. Kind-specific fields are `None` unless
/// they belong to `trigger_type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WireTrigger {
    /// Stable kind code (see [`TriggerKind::code`](crate::kind::TriggerKind::code)).
    pub trigger_type: u32,
    /// `YYYY-MM-DDTHH:MM:00`.
    pub start_boundary: String,
    /// `YYYY-MM-DDT00:00:00`; omitted when the trigger has no end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_boundary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition: Option<WireRepetition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months_of_year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_of_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_on_last_day_of_month: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_on_last_week_of_month: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Session state code (see [`SessionStateChange::code`](crate::kind::SessionStateChange::code)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_change: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_limit: Option<String>,
}

/// Wire form of [`Repetition`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WireRepetition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub stop_at_duration_end: bool,
}

/// Date and time parts of a boundary string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

fn format_duration(duration: Option<Duration>) -> Option<String> {
    duration.map(|d| d.format()).filter(|text| !text.is_empty())
}

/// The wire form of `descriptor`.
#[must_use]
pub fn encode(descriptor: &TriggerDescriptor) -> WireTrigger {
    let mut wire = WireTrigger {
        trigger_type: descriptor.kind().code(),
        start_boundary: descriptor.start_boundary(),
        end_boundary: descriptor.end_boundary(),
        random_delay: format_duration(descriptor.random_delay),
        repetition: descriptor.repetition.map(|repetition| WireRepetition {
            interval: format_duration(repetition.interval),
            duration: format_duration(repetition.duration),
            stop_at_duration_end: repetition.stop_at_duration_end,
        }),
        ..WireTrigger::default()
    };

    match &descriptor.payload {
        TriggerPayload::Once => {}
        TriggerPayload::Daily { days_interval } => wire.days_interval = Some(*days_interval),
        TriggerPayload::Weekly {
            weeks_interval,
            days_of_week,
        } => {
            wire.weeks_interval = Some(*weeks_interval);
            wire.days_of_week = Some(days_of_week.bits());
        }
        TriggerPayload::MonthlyByDate {
            months,
            days_of_month,
            run_on_last_day_of_month,
        } => {
            wire.months_of_year = Some(months.bits());
            wire.days_of_month = Some(days_of_month.bits());
            wire.run_on_last_day_of_month = Some(*run_on_last_day_of_month);
        }
        TriggerPayload::MonthlyByDayOfWeek {
            months,
            days_of_week,
            weeks_of_month,
            run_on_last_week_of_month,
        } => {
            wire.months_of_year = Some(months.bits());
            wire.days_of_week = Some(days_of_week.bits());
            wire.weeks_of_month = Some(weeks_of_month.bits());
            wire.run_on_last_week_of_month = Some(*run_on_last_week_of_month);
        }
        TriggerPayload::AtLogon { delay, user_id } => {
            wire.delay = format_duration(*delay);
            wire.user_id.clone_from(user_id);
        }
        TriggerPayload::AtSystemStart { delay } => wire.delay = format_duration(*delay),
        TriggerPayload::OnIdle {
            execution_time_limit,
        } => wire.execution_time_limit = format_duration(*execution_time_limit),
        TriggerPayload::OnSessionStateChange {
            state_change,
            delay,
            user_id,
        } => {
            wire.state_change = Some(state_change.code());
            wire.delay = format_duration(*delay);
            wire.user_id.clone_from(user_id);
        }
    }

    tracing::debug!(kind = %descriptor.kind(), start = %wire.start_boundary, "encoded trigger");
    wire
}

/// One-line summary in the legacy `Starting <start boundary>` form.
///
/// The `Display` impl of [`TriggerDescriptor`] gives a richer sentence.
#[must_use]
pub fn describe(descriptor: &TriggerDescriptor) -> String {
    format!("Starting {}", descriptor.start_boundary())
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Scan `YYYY-MM-DDTHH:MM`, optionally followed by `:00`, by position.
///
/// Boundaries carry whole minutes, so any other seconds suffix is malformed.
/// Only the shape is checked here; calendar validity is the validator's job.
///
/// # Errors
///
/// `MalformedBoundary` if any byte is not where the shape requires it.
pub fn parse_boundary(text: &str) -> Result<Boundary, TriggerError> {
    const SHAPE: &[u8; 19] = b"dddd-dd-ddTdd:dd:00";

    let bytes = text.as_bytes();
    if bytes.len() != 16 && bytes.len() != 19 {
        return Err(TriggerError::MalformedBoundary(text.to_string()));
    }
    let matches = bytes.iter().zip(SHAPE).all(|(byte, expected)| match expected {
        b'd' => byte.is_ascii_digit(),
        literal => byte == literal,
    });
    if !matches {
        return Err(TriggerError::MalformedBoundary(text.to_string()));
    }

    let number = |range: std::ops::Range<usize>| {
        bytes[range]
            .iter()
            .fold(0, |acc, digit| acc * 10 + u32::from(digit - b'0'))
    };
    Ok(Boundary {
        year: number(0..4),
        month: number(5..7),
        day: number(8..10),
        hour: number(11..13),
        minute: number(14..16),
    })
}

/// Rebuild and validate a descriptor from its wire form with default options.
///
/// # Errors
///
/// `MalformedBoundary` for a badly shaped boundary, otherwise any error the
/// validator raises.
pub fn decode(wire: &WireTrigger) -> Result<TriggerDescriptor, TriggerError> {
    decode_with(wire, &Validator::default())
}

/// [`decode`] under a specific validator.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_with(wire: &WireTrigger, validator: &Validator) -> Result<TriggerDescriptor, TriggerError> {
    let raw = wire_to_raw(wire)?;
    let descriptor = validator.validate(&raw)?;
    tracing::debug!(kind = %descriptor.kind(), start = %wire.start_boundary, "decoded trigger");
    Ok(descriptor)
}

fn wire_to_raw(wire: &WireTrigger) -> Result<RawDescriptor, TriggerError> {
    let mut raw = RawDescriptor::new();
    let mut put = |key: &str, value: Option<Value>| {
        if let Some(value) = value {
            raw.insert(key.to_string(), value);
        }
    };

    put("trigger_type", Some(json!(wire.trigger_type)));
    let start = parse_boundary(&wire.start_boundary)?;
    put("start_year", Some(json!(start.year)));
    put("start_month", Some(json!(start.month)));
    put("start_day", Some(json!(start.day)));
    put("start_hour", Some(json!(start.hour)));
    put("start_minute", Some(json!(start.minute)));

    if let Some(end) = wire.end_boundary.as_deref().filter(|end| !end.is_empty()) {
        let end = parse_boundary(end)?;
        put("end_year", Some(json!(end.year)));
        put("end_month", Some(json!(end.month)));
        put("end_day", Some(json!(end.day)));
    }

    put("random_minutes_interval", wire.random_delay.clone().map(Value::String));
    if let Some(repetition) = &wire.repetition {
        put("minutes_interval", repetition.interval.clone().map(Value::String));
        put("minutes_duration", repetition.duration.clone().map(Value::String));
        put("stop_at_duration_end", Some(json!(repetition.stop_at_duration_end)));
    }

    put("days_interval", wire.days_interval.map(|v| json!(v)));
    put("weeks_interval", wire.weeks_interval.map(|v| json!(v)));
    put("days_of_week", wire.days_of_week.map(|v| json!(v)));
    put("months", wire.months_of_year.map(|v| json!(v)));
    put("days_of_month", wire.days_of_month.map(|v| json!(v)));
    put("weeks_of_month", wire.weeks_of_month.map(|v| json!(v)));
    put("run_on_last_day_of_month", wire.run_on_last_day_of_month.map(Value::Bool));
    put("run_on_last_week_of_month", wire.run_on_last_week_of_month.map(Value::Bool));
    put("delay_duration", wire.delay.clone().map(Value::String));
    put("user_id", wire.user_id.clone().map(Value::String));
    put("state_change", wire.state_change.map(|v| json!(v)));
    put("execution_time_limit", wire.execution_time_limit.clone().map(Value::String));
    Ok(raw)
}

// ---------------------------------------------------------------------------
// Legacy read-back
// ---------------------------------------------------------------------------

/// The flat legacy map for `descriptor`: `start_*`/`end_*` integers,
/// bit-sets as masks, and durations as whole minutes measured from
/// `reference`. Durations shorter than a minute are omitted.
#[must_use]
pub fn to_raw(descriptor: &TriggerDescriptor, reference: NaiveDateTime) -> RawDescriptor {
    let mut raw = RawDescriptor::new();
    let minutes = |duration: Option<Duration>| {
        duration
            .map(|d| d.to_minutes(reference))
            .filter(|minutes| *minutes > 0)
            .map(|minutes| json!(minutes))
    };
    let mut put = |key: &str, value: Option<Value>| {
        if let Some(value) = value {
            raw.insert(key.to_string(), value);
        }
    };

    let start = descriptor.start;
    put("trigger_type", Some(json!(descriptor.kind().code())));
    put("start_year", Some(json!(start.year())));
    put("start_month", Some(json!(start.month())));
    put("start_day", Some(json!(start.day())));
    put("start_hour", Some(json!(start.hour())));
    put("start_minute", Some(json!(start.minute())));
    if let Some(end) = descriptor.end {
        put("end_year", Some(json!(end.year())));
        put("end_month", Some(json!(end.month())));
        put("end_day", Some(json!(end.day())));
    }

    put("random_minutes_interval", minutes(descriptor.random_delay));
    if let Some(Repetition {
        interval,
        duration,
        stop_at_duration_end,
    }) = descriptor.repetition
    {
        put("minutes_interval", minutes(interval));
        put("minutes_duration", minutes(duration));
        put("stop_at_duration_end", Some(json!(stop_at_duration_end)));
    }

    match &descriptor.payload {
        TriggerPayload::Once => {}
        TriggerPayload::Daily { days_interval } => put("days_interval", Some(json!(days_interval))),
        TriggerPayload::Weekly {
            weeks_interval,
            days_of_week,
        } => {
            put("weeks_interval", Some(json!(weeks_interval)));
            put("days_of_week", Some(json!(days_of_week.mask())));
        }
        TriggerPayload::MonthlyByDate {
            months,
            days_of_month,
            run_on_last_day_of_month,
        } => {
            put("months", Some(json!(months.mask())));
            put("days_of_month", Some(json!(days_of_month.mask())));
            put("run_on_last_day_of_month", Some(json!(run_on_last_day_of_month)));
        }
        TriggerPayload::MonthlyByDayOfWeek {
            months,
            days_of_week,
            weeks_of_month,
            run_on_last_week_of_month,
        } => {
            put("months", Some(json!(months.mask())));
            put("days_of_week", Some(json!(days_of_week.mask())));
            put("weeks_of_month", Some(json!(weeks_of_month.mask())));
            put("run_on_last_week_of_month", Some(json!(run_on_last_week_of_month)));
        }
        TriggerPayload::AtLogon { delay, user_id } => {
            put("delay_duration", minutes(*delay));
            put("user_id", user_id.clone().map(Value::String));
        }
        TriggerPayload::AtSystemStart { delay } => put("delay_duration", minutes(*delay)),
        TriggerPayload::OnIdle {
            execution_time_limit,
        } => put("execution_time_limit", minutes(*execution_time_limit)),
        TriggerPayload::OnSessionStateChange {
            state_change,
            delay,
            user_id,
        } => {
            put("state_change", Some(json!(state_change.code())));
            put("delay_duration", minutes(*delay));
            put("user_id", user_id.clone().map(Value::String));
        }
    }
    raw
}
