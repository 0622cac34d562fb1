//! Reading untyped raw descriptors.
//!
//! Callers build triggers as loose key/value maps. Kind-specific keys may sit
//! flat or under a nested `type` map, integers may arrive as numeric strings,
//! bit-sets as masks or names, and durations as minute counts or duration
//! strings. [`Fields`] flattens all of that into canonical keys and offers
//! typed readers whose errors name the offending key.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::duration::Duration;
use crate::errors::TriggerError;
use crate::flags::FlagSet;

/// An untyped trigger as supplied by a caller or read back by [`to_raw`](crate::codec::to_raw).
pub type RawDescriptor = Map<String, Value>;

/// Key under which legacy callers nest the kind-specific fields.
const NESTED_KEY: &str = "type";

/// Legacy spellings and their canonical keys.
const ALIASES: &[(&str, &str)] = &[
    ("days", "days_of_month"),
    ("weeks", "weeks_of_month"),
    ("delay", "delay_duration"),
    ("random_delay", "random_minutes_interval"),
];

fn canonical_key(key: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |(_, canonical)| *canonical)
}

/// The `trigger_type` value of `raw`, flat or nested under `type`, read
/// without checking any other key. Absent reads as `null`.
#[must_use]
pub fn kind_value(raw: &RawDescriptor) -> &Value {
    static ABSENT: Value = Value::Null;
    raw.get("trigger_type")
        .filter(|value| !value.is_null())
        .or_else(|| match raw.get(NESTED_KEY) {
            Some(Value::Object(nested)) => nested.get("trigger_type"),
            _ => None,
        })
        .unwrap_or(&ABSENT)
}

/// A raw descriptor flattened to canonical keys. Null values count as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    values: BTreeMap<String, Value>,
}

impl Fields {
    /// Flatten `raw`, lifting the nested `type` map and resolving aliases.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if `type` is not a map, or if one canonical key is
    /// supplied more than once (flat and nested, or under an alias).
    pub fn from_raw(raw: &RawDescriptor) -> Result<Self, TriggerError> {
        let mut fields = Self::default();
        for (key, value) in raw {
            if key == NESTED_KEY {
                let Value::Object(nested) = value else {
                    return Err(TriggerError::invalid(NESTED_KEY, "expected a map of kind fields"));
                };
                for (inner, value) in nested {
                    fields.insert(inner, value)?;
                }
            } else {
                fields.insert(key, value)?;
            }
        }
        Ok(fields)
    }

    fn insert(&mut self, key: &str, value: &Value) -> Result<(), TriggerError> {
        let canonical = canonical_key(key);
        if value.is_null() {
            return Ok(());
        }
        if self.values.contains_key(canonical) {
            return Err(TriggerError::invalid(canonical, "given more than once"));
        }
        self.values.insert(canonical.to_string(), value.clone());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Present keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// An integer given as a JSON number or a numeric string.
    pub fn int(&self, key: &str) -> Result<Option<i64>, TriggerError> {
        self.get(key).map(|value| int_value(key, value)).transpose()
    }

    pub fn bool(&self, key: &str) -> Result<Option<bool>, TriggerError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let flag = match value {
            Value::Bool(flag) => *flag,
            Value::Number(n) if n.as_u64() == Some(0) => false,
            Value::Number(n) if n.as_u64() == Some(1) => true,
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(TriggerError::invalid(key, format!("{text:?} is not a boolean"))),
            },
            other => return Err(TriggerError::invalid(key, format!("{other} is not a boolean"))),
        };
        Ok(Some(flag))
    }

    /// A string; numbers are accepted and rendered as text.
    pub fn string(&self, key: &str) -> Result<Option<String>, TriggerError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(TriggerError::invalid(key, format!("{other} is not a string"))),
        }
    }

    /// A bit-set given as a mask, a flag name, a comma-separated list, or an
    /// array of names and masks. Multiple entries are OR-ed together.
    pub fn bits<F: FlagSet>(&self, key: &str) -> Result<Option<F>, TriggerError> {
        self.get(key).map(|value| bits_value(key, value)).transpose()
    }

    /// A duration given as a minute count, a numeric string of minutes, or a
    /// duration string. Non-positive counts and all-zero durations read as
    /// absent. With `strict`, duration strings must satisfy
    /// [`Duration::parse_strict`].
    pub fn duration(&self, key: &str, strict: bool) -> Result<Option<Duration>, TriggerError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let duration = match value {
            Value::Number(_) => minutes(key, int_value(key, value)?)?,
            Value::String(text) => {
                let text = text.trim();
                if let Ok(count) = text.parse::<i64>() {
                    minutes(key, count)?
                } else if strict {
                    Some(Duration::parse_strict(text).map_err(|source| {
                        TriggerError::MalformedDuration {
                            field: key.to_string(),
                            source,
                        }
                    })?)
                } else {
                    Some(Duration::parse(text))
                }
            }
            other => {
                return Err(TriggerError::invalid(key, format!("{other} is not a duration")));
            }
        };
        Ok(duration.filter(|d| !d.is_zero()))
    }
}

fn int_value(key: &str, value: &Value) -> Result<i64, TriggerError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| TriggerError::invalid(key, format!("{n} is not an integer"))),
        Value::String(text) => text
            .trim()
            .parse()
            .map_err(|_| TriggerError::invalid(key, format!("{text:?} is not an integer"))),
        other => Err(TriggerError::invalid(key, format!("{other} is not an integer"))),
    }
}

fn minutes(key: &str, count: i64) -> Result<Option<Duration>, TriggerError> {
    if count <= 0 {
        return Ok(None);
    }
    u32::try_from(count)
        .map(|count| Some(Duration::from_minutes(count)))
        .map_err(|_| TriggerError::invalid(key, format!("{count} minutes is out of range")))
}

fn bits_value<F: FlagSet>(key: &str, value: &Value) -> Result<F, TriggerError> {
    match value {
        Value::Number(n) => {
            let mask = n
                .as_u64()
                .ok_or_else(|| TriggerError::invalid(key, format!("{n} is not a mask")))?;
            mask_value(key, mask)
        }
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .try_fold(F::default(), |acc, token| -> Result<F, TriggerError> {
                Ok(acc | token_value::<F>(key, token)?)
            }),
        Value::Array(items) => items
            .iter()
            .try_fold(F::default(), |acc, item| -> Result<F, TriggerError> {
                Ok(acc | bits_value::<F>(key, item)?)
            }),
        other => Err(TriggerError::invalid(
            key,
            format!("{other} is not a {} set", F::NOUN),
        )),
    }
}

fn token_value<F: FlagSet>(key: &str, token: &str) -> Result<F, TriggerError> {
    if let Ok(mask) = token.parse::<u64>() {
        return mask_value(key, mask);
    }
    F::lookup(token)
        .ok_or_else(|| TriggerError::invalid(key, format!("unknown {} {token:?}", F::NOUN)))
}

fn mask_value<F: FlagSet>(key: &str, mask: u64) -> Result<F, TriggerError> {
    F::from_mask(mask).ok_or_else(|| {
        TriggerError::invalid(key, format!("mask {mask:#x} sets bits outside the {} domain", F::NOUN))
    })
}
