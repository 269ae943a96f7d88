//! Pattern-driven parsing of user-entered date/time strings.
//!
//! Parsing never errors: the callers are live-typing form fields where
//! intermediate keystrokes are expected to be invalid, so every failure
//! degrades to `None`. The attempt order is fixed: strict parse against the
//! canonical pattern (meridiem patterns in two case variants first), then
//! the alternative pattern if one was supplied, then a free-form recognizer
//! as the last resort.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use crate::pattern::{
    self, MONTHS_LONG, MONTHS_SHORT, PatternToken, WEEKDAYS_LONG, WEEKDAYS_SHORT,
};
use crate::types::TimeInstant;

/// Parse `value` against `format`. `None` for blank input or when every
/// attempt fails.
pub fn parse(value: &str, format: &str) -> Option<TimeInstant> {
    parse_with_alternative(value, format, None)
}

/// As [`parse`], retrying with `alternative` before the free-form fallback.
pub fn parse_with_alternative(
    value: &str,
    format: &str,
    alternative: Option<&str>,
) -> Option<TimeInstant> {
    if value.trim().is_empty() {
        return None;
    }
    if let Some(t) = parse_structured(value, format) {
        return Some(t);
    }
    if let Some(alt) = alternative {
        if let Some(t) = parse_structured(value, alt) {
            debug!(format = alt, "parsed with alternative format");
            return Some(t);
        }
    }
    let t = parse_freeform(value);
    if t.is_some() {
        debug!(value, "structured parse failed, free-form recognizer hit");
    }
    t
}

/// Translate to the canonical dialect and run the strict parse. Meridiem
/// patterns are tried upper-case first, then lower-case: the marker match
/// is case-sensitive but user input commonly is not.
fn parse_structured(value: &str, format: &str) -> Option<TimeInstant> {
    let canonical = pattern::to_canonical_pattern(format);
    if pattern::has_meridiem(&canonical) {
        let upper = pattern::with_upper_meridiem(&canonical);
        if let Some(t) = parse_strict(value, &pattern::tokenize(&upper)) {
            return Some(t);
        }
        let lower = pattern::with_lower_meridiem(&canonical);
        if let Some(t) = parse_strict(value, &pattern::tokenize(&lower)) {
            return Some(t);
        }
    }
    parse_strict(value, &pattern::tokenize(&canonical))
}

struct Cursor<'a> {
    chars: &'a [char],
    pos: usize,
}

impl Cursor<'_> {
    /// Consume between `min` and `max` ASCII digits, returning their value.
    fn take_digits(&mut self, min: usize, max: usize) -> Option<u32> {
        let start = self.pos;
        while self.pos < self.chars.len()
            && self.pos - start < max
            && self.chars[self.pos].is_ascii_digit()
        {
            self.pos += 1;
        }
        if self.pos - start < min {
            self.pos = start;
            return None;
        }
        self.chars[start..self.pos]
            .iter()
            .try_fold(0u32, |acc, c| {
                acc.checked_mul(10)?.checked_add(c.to_digit(10)?)
            })
    }

    fn take_char(&mut self, expected: char) -> bool {
        if self.chars.get(self.pos) == Some(&expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume an ASCII-alphabetic run and return its index in `names`
    /// (case-insensitive, whole-run match).
    fn take_name(&mut self, names: &[&str]) -> Option<usize> {
        let start = self.pos;
        while self.pos < self.chars.len() && self.chars[self.pos].is_ascii_alphabetic() {
            self.pos += 1;
        }
        let run: String = self.chars[start..self.pos].iter().collect();
        match names.iter().position(|n| n.eq_ignore_ascii_case(&run)) {
            Some(i) => Some(i),
            None => {
                self.pos = start;
                None
            }
        }
    }

    /// Consume one of `options` matched exactly, case-sensitive. The
    /// meridiem markers go through here: case tolerance comes from the
    /// pattern-variant ladder, not from the match itself.
    fn take_exact(&mut self, options: &[&str]) -> Option<usize> {
        for (i, opt) in options.iter().enumerate() {
            let opt_chars: Vec<char> = opt.chars().collect();
            if self.chars[self.pos..].starts_with(&opt_chars) {
                self.pos += opt_chars.len();
                return Some(i);
            }
        }
        None
    }

    fn at_end(&self) -> bool {
        self.pos == self.chars.len()
    }
}

#[derive(Default)]
struct RawFields {
    year: Option<i32>,
    month0: Option<u32>,
    date: Option<u32>,
    hour24: Option<u32>,
    hour12: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    millis: Option<u32>,
    pm: Option<bool>,
}

/// Match `value` against the full token sequence. The whole input must be
/// consumed; trailing text or a missing token fails the parse, so a
/// truncated keystroke never half-matches.
fn parse_strict(value: &str, tokens: &[PatternToken]) -> Option<TimeInstant> {
    use PatternToken::*;

    let chars: Vec<char> = value.chars().collect();
    let mut cur = Cursor {
        chars: &chars,
        pos: 0,
    };
    let mut f = RawFields::default();

    for token in tokens {
        match token {
            Year4 => f.year = Some(cur.take_digits(4, 4)? as i32),
            Year => f.year = Some(cur.take_digits(1, 4)? as i32),
            Year2 => {
                // two-digit years pivot at 69, the usual library cutoff
                let y = cur.take_digits(2, 2)?;
                f.year = Some(if y < 69 { 2000 + y } else { 1900 + y } as i32);
            }
            Month2 => f.month0 = Some(checked(cur.take_digits(2, 2)?, 1, 12)? - 1),
            Month => f.month0 = Some(checked(cur.take_digits(1, 2)?, 1, 12)? - 1),
            MonthShort => f.month0 = Some(cur.take_name(&MONTHS_SHORT)? as u32),
            MonthLong => f.month0 = Some(cur.take_name(&MONTHS_LONG)? as u32),
            Day2 => f.date = Some(checked(cur.take_digits(2, 2)?, 1, 31)?),
            Day => f.date = Some(checked(cur.take_digits(1, 2)?, 1, 31)?),
            Hour24_2 => f.hour24 = Some(checked(cur.take_digits(2, 2)?, 0, 23)?),
            Hour24 => f.hour24 = Some(checked(cur.take_digits(1, 2)?, 0, 23)?),
            Hour12_2 => f.hour12 = Some(checked(cur.take_digits(2, 2)?, 1, 12)?),
            Hour12 => f.hour12 = Some(checked(cur.take_digits(1, 2)?, 1, 12)?),
            Minute2 => f.minute = Some(checked(cur.take_digits(2, 2)?, 0, 59)?),
            Minute => f.minute = Some(checked(cur.take_digits(1, 2)?, 0, 59)?),
            Second2 => f.second = Some(checked(cur.take_digits(2, 2)?, 0, 59)?),
            Second => f.second = Some(checked(cur.take_digits(1, 2)?, 0, 59)?),
            Millis3 => f.millis = Some(cur.take_digits(3, 3)?),
            Millis => f.millis = Some(cur.take_digits(1, 3)?),
            MeridiemUpper => f.pm = Some(cur.take_exact(&["AM", "PM"])? == 1),
            MeridiemLower => f.pm = Some(cur.take_exact(&["am", "pm"])? == 1),
            WeekdayShort => {
                cur.take_name(&WEEKDAYS_SHORT)?;
            }
            WeekdayLong => {
                cur.take_name(&WEEKDAYS_LONG)?;
            }
            Literal(c) => {
                if !cur.take_char(*c) {
                    return None;
                }
            }
        }
    }
    if !cur.at_end() {
        return None;
    }

    let hours = match (f.hour24, f.hour12) {
        (Some(h), _) => h,
        (None, Some(h12)) => (h12 % 12) + if f.pm == Some(true) { 12 } else { 0 },
        (None, None) => 0,
    };
    Some(TimeInstant {
        years: f.year.unwrap_or(0),
        months: f.month0.unwrap_or(0),
        date: f.date.unwrap_or(0),
        hours,
        minutes: f.minute.unwrap_or(0),
        seconds: f.second.unwrap_or(0),
        milliseconds: f.millis.unwrap_or(0),
    })
}

fn checked(v: u32, min: u32, max: u32) -> Option<u32> {
    (min..=max).contains(&v).then_some(v)
}

fn instant_from_naive(dt: NaiveDateTime) -> TimeInstant {
    TimeInstant {
        years: dt.year(),
        months: dt.month0(),
        date: dt.day(),
        hours: dt.hour(),
        minutes: dt.minute(),
        seconds: dt.second(),
        milliseconds: dt.and_utc().timestamp_subsec_millis(),
    }
}

/// Best-effort recognizer for input no declared pattern matched: RFC 3339,
/// then a short list of ISO and slash-date shapes. Offset-carrying input
/// keeps its written wall clock. Anything else is unrecognized.
fn parse_freeform(value: &str) -> Option<TimeInstant> {
    let s = value.trim();

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(instant_from_naive(dt.naive_local()));
    }

    const DATETIME_SHAPES: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for shape in DATETIME_SHAPES {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, shape) {
            return Some(instant_from_naive(dt));
        }
    }

    const DATE_SHAPES: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
    for shape in DATE_SHAPES {
        if let Ok(d) = NaiveDate::parse_from_str(s, shape) {
            return Some(TimeInstant {
                years: d.year(),
                months: d.month0(),
                date: d.day(),
                ..TimeInstant::default()
            });
        }
    }

    None
}
