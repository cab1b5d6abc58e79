//! Date and time-of-day extraction from free-text DMG header lines.
//!
//! Header lines often carry several overlapping date/time expressions, e.g.
//!
//! ```text
//! JANUARY 17, 1994 04:31 PST              (ORIGIN(CIT): 01/17/94, 12:30:55.4 GMT)
//! ```
//!
//! Each extraction is an ordered list of candidate extractors; the first one
//! that yields a valid value wins. A numeric date or time inside an `ORIGIN`
//! annotation always takes precedence over the rest of the line.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use regex::Regex;

static ORIGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*ORIGIN(?:\([^)]*\))?\s*:\s*([^)]*)\)").expect("origin pattern")
});

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{2}|\d{4})\b").expect("numeric date pattern")
});

static SPELLED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(JANUARY|FEBRUARY|MARCH|APRIL|MAY|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER)\s+(\d{1,2}),?\s+(\d{4})\b",
    )
    .expect("spelled date pattern")
});

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2}):(\d{2}):(\d{2}(?:\.\d*)?)").expect("time pattern")
});

const MONTHS: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

type DateExtractor = fn(&str) -> Option<NaiveDate>;
type TimeExtractor = fn(&str) -> Option<TimeDelta>;

const DATE_EXTRACTORS: [DateExtractor; 3] = [origin_date, numeric_date, spelled_date];
const TIME_EXTRACTORS: [TimeExtractor; 2] = [origin_time, first_time];

/// Expand a two-digit year with a pivot at 50: `50..=99` maps to the 1900s,
/// `0..=49` to the 2000s. Years with more than two digits pass through.
pub fn expand_year(year: i32) -> i32 {
    match year {
        0..=49 => 2000 + year,
        50..=99 => 1900 + year,
        _ => year,
    }
}

/// Extract a calendar date from a header line.
///
/// Recognises `M/D/YY`, `M/D/YYYY` and `MONTH D, YYYY`. Returns `None` if
/// no valid date is present.
///
/// ```
/// use chrono::NaiveDate;
/// use dmg_rs::time::extract_date;
///
/// let line = "Uncorrected Accelerogram Data     Processed: 02/13/12, CGS";
/// assert_eq!(extract_date(line), NaiveDate::from_ymd_opt(2012, 2, 13));
/// ```
pub fn extract_date(line: &str) -> Option<NaiveDate> {
    DATE_EXTRACTORS.iter().find_map(|extract| extract(line))
}

/// Extract a time-of-day offset from midnight from a header line.
///
/// Recognises `H:MM:SS` with an optional fraction. Sub-second precision is
/// computed in floating point and truncated to microseconds, so `55.4`
/// seconds becomes 55 s + 399999 us.
pub fn extract_time(line: &str) -> Option<TimeDelta> {
    TIME_EXTRACTORS.iter().find_map(|extract| extract(line))
}

/// Combine a date and a time-of-day offset into a UTC timestamp.
pub fn combine(date: NaiveDate, offset: TimeDelta) -> Option<DateTime<Utc>> {
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(offset)
        .map(|dt| dt.and_utc())
}

fn origin_body(line: &str) -> Option<&str> {
    ORIGIN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn origin_date(line: &str) -> Option<NaiveDate> {
    origin_body(line).and_then(numeric_date)
}

fn origin_time(line: &str) -> Option<TimeDelta> {
    origin_body(line).and_then(first_time)
}

fn numeric_date(line: &str) -> Option<NaiveDate> {
    NUMERIC_DATE.captures_iter(line).find_map(|caps| {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(expand_year(year), month, day)
    })
}

fn spelled_date(line: &str) -> Option<NaiveDate> {
    SPELLED_DATE.captures_iter(line).find_map(|caps| {
        let name = caps[1].to_ascii_uppercase();
        let month = MONTHS.iter().position(|m| *m == name)? as u32 + 1;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn first_time(line: &str) -> Option<TimeDelta> {
    TIME_OF_DAY
        .captures_iter(line)
        .find_map(|caps| time_of_day(&caps[1], &caps[2], &caps[3]))
}

fn time_of_day(hour: &str, minute: &str, second: &str) -> Option<TimeDelta> {
    let hour: i64 = hour.parse().ok()?;
    let minute: i64 = minute.parse().ok()?;
    let second: f64 = second.parse().ok()?;
    if hour > 23 || minute > 59 || !(0.0..61.0).contains(&second) {
        return None;
    }
    let whole = second.trunc();
    // Truncation, not rounding: .4 s materialises as 399999 us.
    let micros = ((second - whole) * 1e6) as i64;
    Some(
        TimeDelta::hours(hour)
            + TimeDelta::minutes(minute)
            + TimeDelta::seconds(whole as i64)
            + TimeDelta::microseconds(micros),
    )
}
