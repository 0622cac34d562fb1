//! Gregorian calendar helpers used by duration arithmetic.

/// Days per month in a common year, indexed by month number (index 0 unused).
const DAYS_IN_MONTH: [u32; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Gregorian leap-year rule: divisible by 4 and not by 100, unless also by 400.
#[must_use]
pub const fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`. Returns 0 for months outside 1-12.
#[must_use]
pub const fn days_in_month(month: u32, year: i64) -> u32 {
    if month == 2 && is_leap_year(year) {
        29
    } else if month >= 1 && month <= 12 {
        DAYS_IN_MONTH[month as usize]
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2000, true)]
    #[case(2004, true)]
    #[case(1900, false)]
    #[case(2001, false)]
    #[case(2100, false)]
    #[case(2400, true)]
    fn leap_years(#[case] year: i64, #[case] expected: bool) {
        assert_eq!(is_leap_year(year), expected);
    }

    #[rstest]
    #[case(1, 2000, 31)]
    #[case(2, 2000, 29)]
    #[case(11, 2000, 30)]
    #[case(1, 2003, 31)]
    #[case(2, 2003, 28)]
    #[case(11, 2003, 30)]
    #[case(2, 1900, 28)]
    fn month_lengths(#[case] month: u32, #[case] year: i64, #[case] expected: u32) {
        assert_eq!(days_in_month(month, year), expected);
    }

    #[test]
    fn out_of_range_month_has_no_days() {
        assert_eq!(days_in_month(0, 2003), 0);
        assert_eq!(days_in_month(13, 2003), 0);
    }
}
