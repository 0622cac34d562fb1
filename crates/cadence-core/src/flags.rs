//! Bit-set fields: days of week, months of year, days of month, weeks of month.
//!
//! Flag values are stable and match the external representation
//! (Sunday = `0x1` ... Saturday = `0x40`, January = `0x1` ... December =
//! `0x800`, first week = `0x1` ... last week = `0x10`, day 1 = `0x1` ...
//! day 31 = `0x4000_0000`, last day = `0x8000_0000`).

use std::fmt;
use std::ops::BitOr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Shared surface of the bit-set newtypes, for reading loosely typed input.
pub trait FlagSet: Copy + Default + PartialEq + BitOr<Output = Self> + fmt::Display {
    /// What a single flag names, used in error messages.
    const NOUN: &'static str;

    /// Wrap a mask, rejecting bits outside the domain.
    fn from_mask(mask: u64) -> Option<Self>;

    fn mask(self) -> u64;

    /// See the inherent `from_name`.
    fn lookup(name: &str) -> Option<Self>;
}

/// Generates a transparent bit-set newtype with named flag constants, a
/// lookup table of `(flag, key, label)`, and the usual set operations.
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty, $noun:literal) {
            $( $konst:ident = $bit:literal => ($key:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
        )]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            $( pub const $konst: Self = Self($bit); )+

            /// Every defined flag.
            pub const ALL: Self = Self(0 $( | $bit )+);

            const TABLE: &'static [(Self, &'static str, &'static str)] =
                &[ $( (Self::$konst, $key, $label) ),+ ];

            #[must_use]
            pub const fn empty() -> Self {
                Self(0)
            }

            #[must_use]
            pub const fn bits(self) -> $repr {
                self.0
            }

            /// Wrap a raw mask. Returns `None` if it sets bits outside the domain.
            #[must_use]
            pub const fn from_bits(bits: $repr) -> Option<Self> {
                if bits & !Self::ALL.0 == 0 {
                    Some(Self(bits))
                } else {
                    None
                }
            }

            #[must_use]
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            #[must_use]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            #[must_use]
            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Look up a single flag by key (`"sunday"`, `"march"`, `"last"`,
            /// `"17"`), case-insensitively. Keys of three or more letters also
            /// match by prefix (`"sun"`, `"mar"`).
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                let wanted = name.trim().to_ascii_lowercase();
                Self::TABLE
                    .iter()
                    .find(|(_, key, _)| {
                        *key == wanted
                            || (wanted.len() >= 3 && key.len() > 3 && key.starts_with(&wanted))
                    })
                    .map(|(flag, _, _)| *flag)
            }

            /// Display labels of the flags that are set, in flag order.
            #[must_use]
            pub fn labels(self) -> Vec<&'static str> {
                Self::TABLE
                    .iter()
                    .filter(|(flag, _, _)| self.contains(*flag))
                    .map(|(_, _, label)| *label)
                    .collect()
            }
        }

        impl FlagSet for $name {
            const NOUN: &'static str = $noun;

            fn from_mask(mask: u64) -> Option<Self> {
                <$repr>::try_from(mask).ok().and_then(Self::from_bits)
            }

            fn mask(self) -> u64 {
                u64::from(self.0)
            }

            fn lookup(name: &str) -> Option<Self> {
                Self::from_name(name)
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.labels().join(", "))
            }
        }
    };
}

flag_set! {
    /// Days of the week, Sunday = bit 0.
    DaysOfWeek(u8, "weekday") {
        SUNDAY = 0x01 => ("sunday", "Sunday"),
        MONDAY = 0x02 => ("monday", "Monday"),
        TUESDAY = 0x04 => ("tuesday", "Tuesday"),
        WEDNESDAY = 0x08 => ("wednesday", "Wednesday"),
        THURSDAY = 0x10 => ("thursday", "Thursday"),
        FRIDAY = 0x20 => ("friday", "Friday"),
        SATURDAY = 0x40 => ("saturday", "Saturday"),
    }
}

flag_set! {
    /// Months of the year, January = bit 0.
    MonthsOfYear(u16, "month") {
        JANUARY = 0x001 => ("january", "January"),
        FEBRUARY = 0x002 => ("february", "February"),
        MARCH = 0x004 => ("march", "March"),
        APRIL = 0x008 => ("april", "April"),
        MAY = 0x010 => ("may", "May"),
        JUNE = 0x020 => ("june", "June"),
        JULY = 0x040 => ("july", "July"),
        AUGUST = 0x080 => ("august", "August"),
        SEPTEMBER = 0x100 => ("september", "September"),
        OCTOBER = 0x200 => ("october", "October"),
        NOVEMBER = 0x400 => ("november", "November"),
        DECEMBER = 0x800 => ("december", "December"),
    }
}

flag_set! {
    /// Weeks of the month; bit 4 is the last seven days of the month.
    WeeksOfMonth(u8, "week of month") {
        FIRST = 0x01 => ("first", "first"),
        SECOND = 0x02 => ("second", "second"),
        THIRD = 0x04 => ("third", "third"),
        FOURTH = 0x08 => ("fourth", "fourth"),
        LAST = 0x10 => ("last", "last"),
    }
}

flag_set! {
    /// Days of the month, day 1 = bit 0; bit 31 is the last day of the month.
    DaysOfMonth(u32, "day of month") {
        DAY_1 = 0x0000_0001 => ("1", "1"),
        DAY_2 = 0x0000_0002 => ("2", "2"),
        DAY_3 = 0x0000_0004 => ("3", "3"),
        DAY_4 = 0x0000_0008 => ("4", "4"),
        DAY_5 = 0x0000_0010 => ("5", "5"),
        DAY_6 = 0x0000_0020 => ("6", "6"),
        DAY_7 = 0x0000_0040 => ("7", "7"),
        DAY_8 = 0x0000_0080 => ("8", "8"),
        DAY_9 = 0x0000_0100 => ("9", "9"),
        DAY_10 = 0x0000_0200 => ("10", "10"),
        DAY_11 = 0x0000_0400 => ("11", "11"),
        DAY_12 = 0x0000_0800 => ("12", "12"),
        DAY_13 = 0x0000_1000 => ("13", "13"),
        DAY_14 = 0x0000_2000 => ("14", "14"),
        DAY_15 = 0x0000_4000 => ("15", "15"),
        DAY_16 = 0x0000_8000 => ("16", "16"),
        DAY_17 = 0x0001_0000 => ("17", "17"),
        DAY_18 = 0x0002_0000 => ("18", "18"),
        DAY_19 = 0x0004_0000 => ("19", "19"),
        DAY_20 = 0x0008_0000 => ("20", "20"),
        DAY_21 = 0x0010_0000 => ("21", "21"),
        DAY_22 = 0x0020_0000 => ("22", "22"),
        DAY_23 = 0x0040_0000 => ("23", "23"),
        DAY_24 = 0x0080_0000 => ("24", "24"),
        DAY_25 = 0x0100_0000 => ("25", "25"),
        DAY_26 = 0x0200_0000 => ("26", "26"),
        DAY_27 = 0x0400_0000 => ("27", "27"),
        DAY_28 = 0x0800_0000 => ("28", "28"),
        DAY_29 = 0x1000_0000 => ("29", "29"),
        DAY_30 = 0x2000_0000 => ("30", "30"),
        DAY_31 = 0x4000_0000 => ("31", "31"),
        LAST = 0x8000_0000 => ("last", "last"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn flag_values_are_stable() {
        assert_eq!(DaysOfWeek::SUNDAY.bits(), 0x1);
        assert_eq!(DaysOfWeek::SATURDAY.bits(), 0x40);
        assert_eq!(MonthsOfYear::JANUARY.bits(), 0x1);
        assert_eq!(MonthsOfYear::DECEMBER.bits(), 0x800);
        assert_eq!(WeeksOfMonth::FIRST.bits(), 0x1);
        assert_eq!(WeeksOfMonth::LAST.bits(), 0x10);
        assert_eq!(DaysOfMonth::DAY_1.bits(), 0x1);
        assert_eq!(DaysOfMonth::LAST.bits(), 0x8000_0000);
    }

    #[test]
    fn all_covers_the_domain() {
        assert_eq!(DaysOfWeek::ALL.bits(), 0x7f);
        assert_eq!(MonthsOfYear::ALL.bits(), 0xfff);
        assert_eq!(WeeksOfMonth::ALL.bits(), 0x1f);
        assert_eq!(DaysOfMonth::ALL.bits(), u32::MAX);
    }

    #[test]
    fn from_bits_rejects_foreign_bits() {
        assert!(DaysOfWeek::from_bits(0x80).is_none());
        assert!(MonthsOfYear::from_bits(0x1000).is_none());
        assert!(WeeksOfMonth::from_bits(0x20).is_none());
        assert_eq!(DaysOfWeek::from_bits(0x41), Some(DaysOfWeek::SUNDAY | DaysOfWeek::SATURDAY));
    }

    #[rstest]
    #[case("sunday", Some(DaysOfWeek::SUNDAY))]
    #[case("Sun", Some(DaysOfWeek::SUNDAY))]
    #[case(" THURSDAY ", Some(DaysOfWeek::THURSDAY))]
    #[case("thu", Some(DaysOfWeek::THURSDAY))]
    #[case("t", None)]
    #[case("funday", None)]
    fn weekday_names(#[case] name: &str, #[case] expected: Option<DaysOfWeek>) {
        assert_eq!(DaysOfWeek::from_name(name), expected);
    }

    #[test]
    fn month_and_week_names() {
        assert_eq!(MonthsOfYear::from_name("mar"), Some(MonthsOfYear::MARCH));
        assert_eq!(MonthsOfYear::from_name("may"), Some(MonthsOfYear::MAY));
        assert_eq!(MonthsOfYear::from_name("ma"), None);
        assert_eq!(WeeksOfMonth::from_name("last"), Some(WeeksOfMonth::LAST));
        assert_eq!(DaysOfMonth::from_name("17"), Some(DaysOfMonth::DAY_17));
        assert_eq!(DaysOfMonth::from_name("last"), Some(DaysOfMonth::LAST));
        assert_eq!(DaysOfMonth::from_name("32"), None);
    }

    #[test]
    fn names_and_display_follow_flag_order() {
        let days = DaysOfWeek::SATURDAY | DaysOfWeek::MONDAY;
        assert_eq!(days.labels(), vec!["Monday", "Saturday"]);
        assert_eq!(days.to_string(), "Monday, Saturday");
        assert_eq!(DaysOfWeek::empty().to_string(), "");
    }

    #[test]
    fn flag_set_masks() {
        assert_eq!(DaysOfWeek::from_mask(0x7f), Some(DaysOfWeek::ALL));
        assert_eq!(DaysOfWeek::from_mask(0x100), None);
        assert_eq!(DaysOfMonth::from_mask(1 << 32), None);
        assert_eq!(MonthsOfYear::DECEMBER.mask(), 0x800);
        assert_eq!(<WeeksOfMonth as FlagSet>::lookup("fourth"), Some(WeeksOfMonth::FOURTH));
    }

    #[test]
    fn serializes_as_plain_mask() {
        let months = MonthsOfYear::JANUARY | MonthsOfYear::MARCH;
        assert_eq!(serde_json::to_value(months).unwrap(), serde_json::json!(5));
        let back: MonthsOfYear = serde_json::from_value(serde_json::json!(5)).unwrap();
        assert_eq!(back, months);
    }
}
