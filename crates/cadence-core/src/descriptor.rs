//! The canonical, validated form of a trigger.
//!
//! A [`TriggerDescriptor`] is only ever produced by the validator (or by
//! decoding, which re-runs the validator), so every instance holds a valid
//! start, an end that is either absent or a real date, and exactly one
//! kind-specific payload.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::duration::Duration;
use crate::flags::{DaysOfMonth, DaysOfWeek, MonthsOfYear, WeeksOfMonth};
use crate::kind::{SessionStateChange, TriggerKind};

/// `strftime` pattern of a start boundary on the wire.
pub const START_BOUNDARY_FORMAT: &str = "%Y-%m-%dT%H:%M:00";
/// `strftime` pattern of an end boundary on the wire.
pub const END_BOUNDARY_FORMAT: &str = "%Y-%m-%dT00:00:00";

// ---------------------------------------------------------------------------
// TriggerDescriptor
// ---------------------------------------------------------------------------

/// One trigger: common boundaries plus a kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TriggerDescriptor {
    /// First activation. Minute precision; seconds are always zero.
    pub start: NaiveDateTime,
    /// Last day on which the trigger may fire. `None` means no end boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    /// Upper bound of a random delay added to each activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_delay: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition: Option<Repetition>,
    pub payload: TriggerPayload,
}

impl TriggerDescriptor {
    #[must_use]
    pub const fn kind(&self) -> TriggerKind {
        self.payload.kind()
    }

    /// The start as `YYYY-MM-DDTHH:MM:00`.
    #[must_use]
    pub fn start_boundary(&self) -> String {
        self.start.format(START_BOUNDARY_FORMAT).to_string()
    }

    /// The end as `YYYY-MM-DDT00:00:00`, or `None` when unbounded.
    #[must_use]
    pub fn end_boundary(&self) -> Option<String> {
        self.end
            .map(|end| end.format(END_BOUNDARY_FORMAT).to_string())
    }
}

/// Re-fire the trigger every `interval` for `duration` after each activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Repetition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    /// Stop a running instance when the repetition duration ends.
    #[serde(default)]
    pub stop_at_duration_end: bool,
}

impl Repetition {
    /// `None` when nothing is set, so "no repetition" has one representation.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        if self == Self::default() {
            None
        } else {
            Some(self)
        }
    }
}

// ---------------------------------------------------------------------------
// TriggerPayload
// ---------------------------------------------------------------------------

/// Fields that belong to exactly one trigger kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerPayload {
    Once,
    Daily {
        days_interval: u32,
    },
    Weekly {
        weeks_interval: u32,
        days_of_week: DaysOfWeek,
    },
    MonthlyByDate {
        months: MonthsOfYear,
        days_of_month: DaysOfMonth,
        #[serde(default)]
        run_on_last_day_of_month: bool,
    },
    MonthlyByDayOfWeek {
        months: MonthsOfYear,
        days_of_week: DaysOfWeek,
        weeks_of_month: WeeksOfMonth,
        #[serde(default)]
        run_on_last_week_of_month: bool,
    },
    AtLogon {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delay: Option<Duration>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    AtSystemStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delay: Option<Duration>,
    },
    OnIdle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_time_limit: Option<Duration>,
    },
    OnSessionStateChange {
        state_change: SessionStateChange,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delay: Option<Duration>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
}

impl TriggerPayload {
    #[must_use]
    pub const fn kind(&self) -> TriggerKind {
        match self {
            Self::Once => TriggerKind::Once,
            Self::Daily { .. } => TriggerKind::Daily,
            Self::Weekly { .. } => TriggerKind::Weekly,
            Self::MonthlyByDate { .. } => TriggerKind::MonthlyByDate,
            Self::MonthlyByDayOfWeek { .. } => TriggerKind::MonthlyByDayOfWeek,
            Self::AtLogon { .. } => TriggerKind::AtLogon,
            Self::AtSystemStart { .. } => TriggerKind::AtSystemStart,
            Self::OnIdle { .. } => TriggerKind::OnIdle,
            Self::OnSessionStateChange { .. } => TriggerKind::OnSessionStateChange,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

fn every(f: &mut fmt::Formatter<'_>, count: u32, unit: &str) -> fmt::Result {
    if count == 1 {
        write!(f, "Every {unit}")
    } else {
        write!(f, "Every {count} {unit}s")
    }
}

fn user(f: &mut fmt::Formatter<'_>, user_id: Option<&str>) -> fmt::Result {
    match user_id {
        Some(user_id) => write!(f, " of {user_id}"),
        None => f.write_str(" of any user"),
    }
}

fn after(f: &mut fmt::Formatter<'_>, delay: Option<&Duration>) -> fmt::Result {
    match delay {
        Some(delay) => write!(f, " after {delay}"),
        None => Ok(()),
    }
}

impl fmt::Display for TriggerDescriptor {
    /// e.g. `Every 2 weeks on Sunday, Monday at 07:14, starting 2015-04-11T07:14:00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self.start.format("%H:%M");
        match &self.payload {
            TriggerPayload::Once => write!(f, "Once at {at}")?,
            TriggerPayload::Daily { days_interval } => {
                every(f, *days_interval, "day")?;
                write!(f, " at {at}")?;
            }
            TriggerPayload::Weekly {
                weeks_interval,
                days_of_week,
            } => {
                every(f, *weeks_interval, "week")?;
                write!(f, " on {days_of_week} at {at}")?;
            }
            TriggerPayload::MonthlyByDate {
                months,
                days_of_month,
                run_on_last_day_of_month,
            } => {
                write!(f, "On day {days_of_month}")?;
                if *run_on_last_day_of_month && !days_of_month.contains(DaysOfMonth::LAST) {
                    f.write_str(", last")?;
                }
                write!(f, " of {months} at {at}")?;
            }
            TriggerPayload::MonthlyByDayOfWeek {
                months,
                days_of_week,
                weeks_of_month,
                run_on_last_week_of_month,
            } => {
                write!(f, "On the {weeks_of_month}")?;
                if *run_on_last_week_of_month && !weeks_of_month.contains(WeeksOfMonth::LAST) {
                    f.write_str(", last")?;
                }
                write!(f, " {days_of_week} of {months} at {at}")?;
            }
            TriggerPayload::AtLogon { delay, user_id } => {
                f.write_str("At logon")?;
                user(f, user_id.as_deref())?;
                after(f, delay.as_ref())?;
            }
            TriggerPayload::AtSystemStart { delay } => {
                f.write_str("At system start")?;
                after(f, delay.as_ref())?;
            }
            TriggerPayload::OnIdle {
                execution_time_limit,
            } => {
                f.write_str("On idle")?;
                if let Some(limit) = execution_time_limit {
                    write!(f, " for at most {limit}")?;
                }
            }
            TriggerPayload::OnSessionStateChange {
                state_change,
                delay,
                user_id,
            } => {
                write!(f, "On {state_change}")?;
                user(f, user_id.as_deref())?;
                after(f, delay.as_ref())?;
            }
        }

        if let Some(delay) = self.random_delay.filter(|_| self.kind().is_time_based()) {
            write!(f, ", randomly delayed up to {delay}")?;
        }
        if let Some(interval) = self.repetition.and_then(|r| r.interval) {
            write!(f, ", repeating every {interval}")?;
            if let Some(duration) = self.repetition.and_then(|r| r.duration) {
                write!(f, " for {duration}")?;
            }
        }
        write!(f, ", starting {}", self.start_boundary())?;
        if let Some(end) = self.end {
            write!(f, ", ending {end}")?;
        }
        Ok(())
    }
}
