//! The closed set of trigger kinds and their field schema.
//!
//! Wire codes are stable and must not change: `1..=6`, `8`, `9`, `11`.
//! Codes `7` and `10` are reserved and classify as unknown.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::TriggerError;

// ---------------------------------------------------------------------------
// TriggerKind
// ---------------------------------------------------------------------------

/// A schedule-trigger variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Once,
    Daily,
    Weekly,
    MonthlyByDate,
    MonthlyByDayOfWeek,
    AtLogon,
    AtSystemStart,
    OnIdle,
    OnSessionStateChange,
}

/// Field schema for one trigger kind. Keys are canonical raw-descriptor keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSchema {
    pub kind: TriggerKind,
    pub code: u32,
    pub label: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl KindSchema {
    /// Whether `key` is part of this kind's payload.
    #[must_use]
    pub fn allows(&self, key: &str) -> bool {
        self.required.contains(&key) || self.optional.contains(&key)
    }
}

/// Keys every kind accepts.
pub const COMMON_FIELDS: &[&str] = &[
    "trigger_type",
    "start_year",
    "start_month",
    "start_day",
    "start_hour",
    "start_minute",
    "end_year",
    "end_month",
    "end_day",
    "random_minutes_interval",
    "minutes_interval",
    "minutes_duration",
    "stop_at_duration_end",
];

static SCHEMAS: [KindSchema; 9] = [
    KindSchema {
        kind: TriggerKind::Once,
        code: 1,
        label: "one-time",
        required: &[],
        optional: &["once"],
    },
    KindSchema {
        kind: TriggerKind::Daily,
        code: 2,
        label: "daily",
        required: &[],
        optional: &["days_interval"],
    },
    KindSchema {
        kind: TriggerKind::Weekly,
        code: 3,
        label: "weekly",
        required: &["days_of_week"],
        optional: &["weeks_interval"],
    },
    KindSchema {
        kind: TriggerKind::MonthlyByDate,
        code: 4,
        label: "monthly (by date)",
        required: &["months", "days_of_month"],
        optional: &["run_on_last_day_of_month"],
    },
    KindSchema {
        kind: TriggerKind::MonthlyByDayOfWeek,
        code: 5,
        label: "monthly (by day of week)",
        required: &["months", "days_of_week", "weeks_of_month"],
        optional: &["run_on_last_week_of_month"],
    },
    KindSchema {
        kind: TriggerKind::OnIdle,
        code: 6,
        label: "on idle",
        required: &[],
        optional: &["execution_time_limit"],
    },
    KindSchema {
        kind: TriggerKind::AtSystemStart,
        code: 8,
        label: "at system start",
        required: &[],
        optional: &["delay_duration"],
    },
    KindSchema {
        kind: TriggerKind::AtLogon,
        code: 9,
        label: "at logon",
        required: &[],
        optional: &["delay_duration", "user_id"],
    },
    KindSchema {
        kind: TriggerKind::OnSessionStateChange,
        code: 11,
        label: "on session state change",
        required: &["state_change"],
        optional: &["delay_duration", "user_id"],
    },
];

impl TriggerKind {
    pub const ALL: [Self; 9] = [
        Self::Once,
        Self::Daily,
        Self::Weekly,
        Self::MonthlyByDate,
        Self::MonthlyByDayOfWeek,
        Self::AtLogon,
        Self::AtSystemStart,
        Self::OnIdle,
        Self::OnSessionStateChange,
    ];

    #[must_use]
    pub fn schema(self) -> &'static KindSchema {
        let index = match self {
            Self::Once => 0,
            Self::Daily => 1,
            Self::Weekly => 2,
            Self::MonthlyByDate => 3,
            Self::MonthlyByDayOfWeek => 4,
            Self::OnIdle => 5,
            Self::AtSystemStart => 6,
            Self::AtLogon => 7,
            Self::OnSessionStateChange => 8,
        };
        &SCHEMAS[index]
    }

    /// Stable wire code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Once => 1,
            Self::Daily => 2,
            Self::Weekly => 3,
            Self::MonthlyByDate => 4,
            Self::MonthlyByDayOfWeek => 5,
            Self::OnIdle => 6,
            Self::AtSystemStart => 8,
            Self::AtLogon => 9,
            Self::OnSessionStateChange => 11,
        }
    }

    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        SCHEMAS
            .iter()
            .find(|schema| schema.code == code)
            .map(|schema| schema.kind)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::MonthlyByDate => "monthly_by_date",
            Self::MonthlyByDayOfWeek => "monthly_by_day_of_week",
            Self::AtLogon => "at_logon",
            Self::AtSystemStart => "at_system_start",
            Self::OnIdle => "on_idle",
            Self::OnSessionStateChange => "on_session_state_change",
        }
    }

    /// Human-readable label used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        self.schema().label
    }

    /// Whether the kind fires on a calendar schedule rather than an event.
    #[must_use]
    pub const fn is_time_based(self) -> bool {
        matches!(
            self,
            Self::Once | Self::Daily | Self::Weekly | Self::MonthlyByDate | Self::MonthlyByDayOfWeek
        )
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerKind {
    type Err = TriggerError;

    /// Accepts the snake_case name, the legacy constant spelling
    /// (`MONTHLYDOW`, `AT_SYSTEMSTART`), or a numeric wire code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u32>() {
            return Self::from_code(code)
                .ok_or_else(|| TriggerError::UnknownTriggerKind(trimmed.to_string()));
        }

        let folded: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let kind = match folded.as_str() {
            "once" | "onetime" => Self::Once,
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthlybydate" | "monthlydate" | "monthly" => Self::MonthlyByDate,
            "monthlybydayofweek" | "monthlydow" => Self::MonthlyByDayOfWeek,
            "atlogon" | "logon" => Self::AtLogon,
            "atsystemstart" | "systemstart" | "boot" => Self::AtSystemStart,
            "onidle" | "idle" => Self::OnIdle,
            "onsessionstatechange" | "sessionstatechange" => Self::OnSessionStateChange,
            _ => return Err(TriggerError::UnknownTriggerKind(trimmed.to_string())),
        };
        Ok(kind)
    }
}

/// Resolve a raw `trigger_type` value (wire code or name) to a kind.
///
/// # Errors
///
/// Returns `TriggerError::UnknownTriggerKind` when the value is null, of the
/// wrong type, or not in the closed set.
pub fn classify(value: &Value) -> Result<TriggerKind, TriggerError> {
    let kind = match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|code| u32::try_from(code).ok())
            .and_then(TriggerKind::from_code)
            .ok_or_else(|| TriggerError::UnknownTriggerKind(number.to_string())),
        Value::String(name) => name.parse(),
        Value::Null => Err(TriggerError::UnknownTriggerKind("<absent>".to_string())),
        other => Err(TriggerError::UnknownTriggerKind(other.to_string())),
    }?;
    tracing::debug!(%kind, code = kind.code(), "classified trigger");
    Ok(kind)
}

// ---------------------------------------------------------------------------
// SessionStateChange
// ---------------------------------------------------------------------------

/// The session event an `OnSessionStateChange` trigger fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStateChange {
    ConsoleConnect,
    ConsoleDisconnect,
    RemoteConnect,
    RemoteDisconnect,
    SessionLock,
    SessionUnlock,
}

impl SessionStateChange {
    pub const ALL: [Self; 6] = [
        Self::ConsoleConnect,
        Self::ConsoleDisconnect,
        Self::RemoteConnect,
        Self::RemoteDisconnect,
        Self::SessionLock,
        Self::SessionUnlock,
    ];

    /// Stable wire code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::ConsoleConnect => 1,
            Self::ConsoleDisconnect => 2,
            Self::RemoteConnect => 3,
            Self::RemoteDisconnect => 4,
            Self::SessionLock => 7,
            Self::SessionUnlock => 8,
        }
    }

    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|change| change.code() == code)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConsoleConnect => "console_connect",
            Self::ConsoleDisconnect => "console_disconnect",
            Self::RemoteConnect => "remote_connect",
            Self::RemoteDisconnect => "remote_disconnect",
            Self::SessionLock => "session_lock",
            Self::SessionUnlock => "session_unlock",
        }
    }

    const fn phrase(self) -> &'static str {
        match self {
            Self::ConsoleConnect => "console connect",
            Self::ConsoleDisconnect => "console disconnect",
            Self::RemoteConnect => "remote connect",
            Self::RemoteDisconnect => "remote disconnect",
            Self::SessionLock => "session lock",
            Self::SessionUnlock => "session unlock",
        }
    }
}

impl fmt::Display for SessionStateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

impl FromStr for SessionStateChange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u32>() {
            return Self::from_code(code).ok_or_else(|| format!("unknown state change code {code}"));
        }
        let normalized = trimmed.to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|change| change.as_str() == normalized)
            .ok_or_else(|| format!("unknown state change {trimmed:?}"))
    }
}
