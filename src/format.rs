//! Rendering epoch values and decomposed instants back into strings.
//!
//! Formatting mirrors the parser's contract: invalid values come back as
//! `None`, never as an error, because several call sites use the return
//! value as a validity probe before falling back to "set to current time".

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};

use crate::epoch;
use crate::pattern::{
    self, MONTHS_LONG, MONTHS_SHORT, PatternToken, WEEKDAYS_LONG, WEEKDAYS_SHORT,
};
use crate::types::TimeInstant;

/// Wall-clock fields in some zone, ready for token rendering.
struct ClockFields {
    year: i32,
    month0: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    millis: u32,
    weekday0: u32, // 0 = Sunday
}

impl ClockFields {
    fn of<Tz: TimeZone>(dt: &DateTime<Tz>) -> ClockFields {
        ClockFields {
            year: dt.year(),
            month0: dt.month0(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            millis: dt.timestamp_subsec_millis(),
            weekday0: dt.weekday().num_days_from_sunday(),
        }
    }
}

/// Render a decomposed instant with the given pattern (either dialect).
/// The fields are normalized through epoch composition first, so
/// out-of-range fields roll over instead of printing verbatim. `None`
/// when the fields do not compose to a representable instant.
pub fn format_instant(instant: &TimeInstant, pattern: &str) -> Option<String> {
    let ms = epoch::clip(instant.to_epoch_ms());
    if ms.is_nan() {
        return None;
    }
    let dt = DateTime::<Utc>::from_timestamp_millis(ms as i64)?;
    let canonical = pattern::to_canonical_pattern(pattern);
    Some(render(&pattern::tokenize(&canonical), &ClockFields::of(&dt)))
}

/// Render an epoch-millisecond value as local wall-clock time. With
/// `auto_fix` the pattern goes through dialect translation first, for
/// callers holding alternate-dialect patterns. `None` for NaN or anything
/// outside the representable range.
pub fn format(value_ms: f64, pattern: &str, auto_fix: bool) -> Option<String> {
    let ms = epoch::clip(value_ms);
    if ms.is_nan() {
        return None;
    }
    let pat = if auto_fix {
        pattern::to_canonical_pattern(pattern)
    } else {
        pattern.to_string()
    };
    let dt = Local.timestamp_millis_opt(ms as i64).single()?;
    Some(render(&pattern::tokenize(&pat), &ClockFields::of(&dt)))
}

/// Render an epoch-millisecond value as the wall clock observed in the
/// named IANA zone. The pattern is used as-is; this path already expects
/// canonical tokens. `None` for an unknown zone id or invalid value.
pub fn format_in_time_zone(value_ms: f64, zone_id: &str, pattern: &str) -> Option<String> {
    let ms = epoch::clip(value_ms);
    if ms.is_nan() {
        return None;
    }
    let tz: chrono_tz::Tz = zone_id.parse().ok()?;
    let dt = tz.timestamp_millis_opt(ms as i64).single()?;
    Some(render(&pattern::tokenize(pattern), &ClockFields::of(&dt)))
}

/// Render an absolute duration: the value is elapsed milliseconds since
/// the zero epoch, rendered in UTC terms so the result is zone-agnostic.
/// Negative or non-finite input renders as the zero duration. Stateless;
/// a visible countdown re-invokes this on every tick.
pub fn format_duration(milliseconds: f64, pattern: &str) -> String {
    let ms = epoch::clip(milliseconds.max(0.0));
    let ms = if ms.is_nan() { 0.0 } else { ms };
    // default is the zero epoch, for the sliver of the clip range past
    // what chrono represents
    let dt = DateTime::<Utc>::from_timestamp_millis(ms as i64).unwrap_or_default();
    render(&pattern::tokenize(pattern), &ClockFields::of(&dt))
}

/// Format "now" with the given pattern (either dialect), local wall clock.
/// Seeds default values for empty date fields.
pub fn current_time_in_format(pattern: &str) -> String {
    let canonical = pattern::to_canonical_pattern(pattern);
    render(
        &pattern::tokenize(&canonical),
        &ClockFields::of(&Local::now()),
    )
}

fn render(tokens: &[PatternToken], f: &ClockFields) -> String {
    use PatternToken::*;
    use std::fmt::Write;

    let hour12 = (f.hour + 11) % 12 + 1;
    let mut out = String::new();
    for token in tokens {
        // infallible writes into a String
        let _ = match token {
            Year4 => write!(out, "{:04}", f.year),
            Year2 => write!(out, "{:02}", f.year.rem_euclid(100)),
            Year => write!(out, "{}", f.year),
            MonthLong => write!(out, "{}", MONTHS_LONG[f.month0 as usize]),
            MonthShort => write!(out, "{}", MONTHS_SHORT[f.month0 as usize]),
            Month2 => write!(out, "{:02}", f.month0 + 1),
            Month => write!(out, "{}", f.month0 + 1),
            Day2 => write!(out, "{:02}", f.day),
            Day => write!(out, "{}", f.day),
            Hour24_2 => write!(out, "{:02}", f.hour),
            Hour24 => write!(out, "{}", f.hour),
            Hour12_2 => write!(out, "{hour12:02}"),
            Hour12 => write!(out, "{hour12}"),
            Minute2 => write!(out, "{:02}", f.minute),
            Minute => write!(out, "{}", f.minute),
            Second2 => write!(out, "{:02}", f.second),
            Second => write!(out, "{}", f.second),
            Millis3 => write!(out, "{:03}", f.millis),
            Millis => write!(out, "{}", f.millis),
            // the marker always renders upper-case, whichever token case
            // the pattern used; the case split only matters for parsing
            MeridiemUpper | MeridiemLower => {
                write!(out, "{}", if f.hour < 12 { "AM" } else { "PM" })
            }
            WeekdayLong => write!(out, "{}", WEEKDAYS_LONG[f.weekday0 as usize]),
            WeekdayShort => write!(out, "{}", WEEKDAYS_SHORT[f.weekday0 as usize]),
            Literal(c) => {
                out.push(*c);
                Ok(())
            }
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn instant_renders_in_either_dialect() {
        let t = TimeInstant {
            years: 2024,
            months: 5,
            date: 12,
            hours: 23,
            minutes: 59,
            seconds: 59,
            milliseconds: 0,
        };
        assert_eq!(
            format_instant(&t, "yyyy-MM-dd HH:mm:ss").as_deref(),
            Some("2024-06-12 23:59:59")
        );
        assert_eq!(
            format_instant(&t, "YYYY-MM-DD HH:mm:ss").as_deref(),
            Some("2024-06-12 23:59:59")
        );
    }

    #[test]
    fn meridiem_always_renders_upper_case() {
        let t = parse("2024-06-12 11:59:59 pm", "yyyy-MM-dd hh:mm:ss a").unwrap();
        assert_eq!(
            format_instant(&t, "hh:mm:ss a YYYY-MM-DD").as_deref(),
            Some("11:59:59 PM 2024-06-12")
        );
    }

    #[test]
    fn parse_format_round_trip_is_idempotent() {
        let pattern = "YYYY-MM-DD HH:mm:ss";
        let original = "2023-01-05 07:08:09";
        let once = format_instant(&parse(original, pattern).unwrap(), pattern).unwrap();
        let twice = format_instant(&parse(&once, pattern).unwrap(), pattern).unwrap();
        assert_eq!(once, original);
        assert_eq!(twice, once);
    }

    #[test]
    fn format_rejects_nan() {
        assert_eq!(format(f64::NAN, "YYYY-MM-DD", true), None);
        assert_eq!(format(f64::INFINITY, "YYYY-MM-DD", true), None);
    }

    #[test]
    fn format_in_time_zone_renders_target_wall_clock() {
        // 2024-01-15T12:00:00Z is 07:00 in New York (EST, UTC-5)
        let ms = 1705320000000.0;
        assert_eq!(
            format_in_time_zone(ms, "America/New_York", "YYYY-MM-DD HH:mm").as_deref(),
            Some("2024-01-15 07:00")
        );
        assert_eq!(format_in_time_zone(ms, "Not/AZone", "HH:mm"), None);
    }

    #[test]
    fn duration_is_utc_and_deterministic() {
        assert_eq!(format_duration(1697468075673.0, "H:mm:ss"), "14:54:35");
        assert_eq!(format_duration(90_000.0, "mm:ss"), "01:30");
        assert_eq!(format_duration(f64::NAN, "mm:ss"), "00:00");
        assert_eq!(format_duration(-5000.0, "mm:ss"), "00:00");
    }

    #[test]
    fn current_time_renders_requested_shape() {
        let s = current_time_in_format("yyyy");
        assert_eq!(s.len(), 4);
        assert!(s.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn month_and_weekday_names_render() {
        let t = TimeInstant {
            years: 2024,
            months: 5,
            date: 12,
            ..TimeInstant::default()
        };
        // 2024-06-12 is a Wednesday
        assert_eq!(
            format_instant(&t, "EEE, MMM D").as_deref(),
            Some("Wed, Jun 12")
        );
        assert_eq!(
            format_instant(&t, "EEEE, MMMM D").as_deref(),
            Some("Wednesday, June 12")
        );
    }
}
