//! # cadence-core
//!
//! Calendar durations and schedule-trigger descriptors for Cadence.
//!
//! This crate is pure and synchronous; nothing here touches the clock except
//! the `*_from_now` duration helpers:
//! - [`Duration`]: `PnYnMnDTnHnMnS` parsing, formatting, and calendar-aware
//!   conversion to seconds/minutes from a reference instant
//! - [`TriggerKind`]: the closed set of trigger kinds with stable wire codes
//!   and per-kind field schema
//! - Bit-set newtypes for weekdays, months, days and weeks of the month
//! - [`Validator`]: raw key/value descriptor to [`TriggerDescriptor`]
//! - [`codec`]: wire encode/decode, legacy read-back, and summaries

pub mod calendar;
pub mod codec;
pub mod descriptor;
pub mod duration;
pub mod errors;
pub mod flags;
pub mod kind;
pub mod raw;
pub mod validator;

pub use codec::{WireRepetition, WireTrigger, decode, describe, encode, to_raw};
pub use descriptor::{Repetition, TriggerDescriptor, TriggerPayload};
pub use duration::Duration;
pub use errors::{DurationError, TriggerError};
pub use flags::{DaysOfMonth, DaysOfWeek, FlagSet, MonthsOfYear, WeeksOfMonth};
pub use kind::{SessionStateChange, TriggerKind, classify};
pub use raw::RawDescriptor;
pub use validator::{ValidationOptions, Validator, validate};
