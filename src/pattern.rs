//! Pattern dialect translation and tokenization.
//!
//! Two dialects arrive from callers: the canonical one (`Y` year, `D` day,
//! `M` month, `A`/`a` meridiem) and an alternate one using lower-case `y`
//! and `d`. Translation maps the alternate into the canonical dialect;
//! nothing is validated, malformed patterns pass through and misrender
//! later instead of failing here.

/// Normalize a pattern to the canonical dialect: `y` becomes `Y`, `d`
/// becomes `D`. Everything else is untouched.
pub fn to_canonical_pattern(pattern: &str) -> String {
    pattern
        .chars()
        .map(|c| match c {
            'y' => 'Y',
            'd' => 'D',
            _ => c,
        })
        .collect()
}

/// Whether the pattern carries an AM/PM marker in either case. Meridiem
/// matching is case-sensitive downstream, so patterns with a marker get
/// parsed in two case variants.
pub fn has_meridiem(pattern: &str) -> bool {
    pattern.contains('a') || pattern.contains('A')
}

/// The pattern with every meridiem token upper-cased (`a` -> `A`).
pub fn with_upper_meridiem(pattern: &str) -> String {
    pattern.replace('a', "A")
}

/// The pattern with every meridiem token lower-cased (`A` -> `a`).
pub fn with_lower_meridiem(pattern: &str) -> String {
    pattern.replace('A', "a")
}

/// English month and weekday names for the name-valued tokens. Shared by
/// the parser (matching) and the formatter (rendering).
pub(crate) const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
pub(crate) const MONTHS_LONG: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
pub(crate) const WEEKDAYS_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
pub(crate) const WEEKDAYS_LONG: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternToken {
    Year4,          // YYYY
    Year2,          // YY
    Year,           // Y
    MonthLong,      // MMMM
    MonthShort,     // MMM
    Month2,         // MM
    Month,          // M
    Day2,           // DD
    Day,            // D
    Hour24_2,       // HH
    Hour24,         // H
    Hour12_2,       // hh
    Hour12,         // h
    Minute2,        // mm
    Minute,         // m
    Second2,        // ss
    Second,         // s
    Millis3,        // SSS
    Millis,         // S
    MeridiemUpper,  // A, matches/renders AM/PM
    MeridiemLower,  // a, matches/renders am/pm
    WeekdayLong,    // EEEE
    WeekdayShort,   // E..EEE
    Literal(char),
}

/// Scan a canonical pattern into tokens, longest run first. Characters
/// outside the token alphabet are literals; so are lower-case `y`/`d` from
/// callers that skipped translation.
pub fn tokenize(pattern: &str) -> Vec<PatternToken> {
    use PatternToken::*;

    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }
        let token = match c {
            'Y' => Some(match run {
                1 => Year,
                2 => Year2,
                _ => Year4,
            }),
            'M' => Some(match run {
                1 => Month,
                2 => Month2,
                3 => MonthShort,
                _ => MonthLong,
            }),
            'D' => Some(if run == 1 { Day } else { Day2 }),
            'H' => Some(if run == 1 { Hour24 } else { Hour24_2 }),
            'h' => Some(if run == 1 { Hour12 } else { Hour12_2 }),
            'm' => Some(if run == 1 { Minute } else { Minute2 }),
            's' => Some(if run == 1 { Second } else { Second2 }),
            'S' => Some(if run < 3 { Millis } else { Millis3 }),
            'A' => Some(MeridiemUpper),
            'a' => Some(MeridiemLower),
            'E' => Some(if run >= 4 { WeekdayLong } else { WeekdayShort }),
            _ => None,
        };
        match token {
            Some(t) => {
                tokens.push(t);
                i += run;
            }
            None => {
                for _ in 0..run {
                    tokens.push(Literal(c));
                }
                i += run;
            }
        }
    }
    tokens
}
