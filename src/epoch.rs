//! Epoch-millisecond date arithmetic.
//!
//! Composition accepts out-of-range fields and rolls them over (month 12 is
//! January of the next year, date 0 is the last day of the previous month),
//! matching native date-constructor behavior. All arithmetic is in the UTC
//! frame; zone handling lives elsewhere.

pub(crate) const MS_PER_SECOND: i64 = 1000;
pub(crate) const MS_PER_MINUTE: i64 = 60_000;
pub(crate) const MS_PER_HOUR: i64 = 3_600_000;
pub(crate) const MS_PER_DAY: i64 = 86_400_000;

/// Largest representable distance from the epoch, in milliseconds
/// (100 million days either side, the native Date range).
const MAX_EPOCH_MS: i64 = 8_640_000_000_000_000;

fn is_leap_year(y: i64) -> bool {
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

/// Days from 1970-01-01 to January 1 of `year`. Negative before 1970.
fn days_to_year(year: i64) -> i64 {
    365 * (year - 1970) + (year - 1969).div_euclid(4) - (year - 1901).div_euclid(100)
        + (year - 1601).div_euclid(400)
}

/// First day-of-year of each month in a non-leap year.
const MONTH_STARTS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Days from 1970-01-01 to the given (possibly out-of-range) calendar day.
/// `months` is zero-based and may exceed 11; `date` is 1-based and may be 0
/// or past the end of the month.
fn days_from_fields(years: i64, months: i64, date: i64) -> i64 {
    let year = years + months.div_euclid(12);
    let month = months.rem_euclid(12);
    let leap = (is_leap_year(year) && month >= 2) as i64;
    days_to_year(year) + MONTH_STARTS[month as usize] + leap + date - 1
}

/// Compose epoch milliseconds from decomposed fields. NaN when the result
/// falls outside the representable range.
pub(crate) fn compose(
    years: i64,
    months: i64,
    date: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    millis: i64,
) -> f64 {
    let days = days_from_fields(years, months, date) as i128;
    let time =
        (hours * MS_PER_HOUR + minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis) as i128;
    let total = days * MS_PER_DAY as i128 + time;
    if total.unsigned_abs() > MAX_EPOCH_MS as u128 {
        return f64::NAN;
    }
    total as i64 as f64
}

/// Clamp an epoch value to the representable range: NaN for anything
/// non-finite or beyond it, the truncated integral value otherwise.
pub(crate) fn clip(t: f64) -> f64 {
    if !t.is_finite() || t.abs() > MAX_EPOCH_MS as f64 {
        return f64::NAN;
    }
    t.trunc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_day_zero() {
        assert_eq!(compose(1970, 0, 1, 0, 0, 0, 0), 0.0);
    }

    #[test]
    fn known_instant() {
        // 2024-06-12T23:59:59.000Z
        assert_eq!(compose(2024, 5, 12, 23, 59, 59, 0), 1718236799000.0);
    }

    #[test]
    fn pre_epoch_years_use_floored_division() {
        // 1900-01-01T00:00:00Z; truncating division instead of floored
        // would land a day off here.
        assert_eq!(compose(1900, 0, 1, 0, 0, 0, 0), -2208988800000.0);
    }

    #[test]
    fn month_overflow_rolls_into_next_year() {
        assert_eq!(compose(2023, 12, 1, 0, 0, 0, 0), compose(2024, 0, 1, 0, 0, 0, 0));
    }

    #[test]
    fn date_zero_rolls_back_a_day() {
        assert_eq!(
            compose(2024, 2, 0, 0, 0, 0, 0),
            compose(2024, 1, 29, 0, 0, 0, 0)
        );
    }

    #[test]
    fn out_of_range_is_nan() {
        assert!(compose(300_000, 0, 1, 0, 0, 0, 0).is_nan());
        assert!(clip(8.65e15).is_nan());
        assert!(clip(f64::NAN).is_nan());
        assert_eq!(clip(12.9), 12.0);
    }
}
