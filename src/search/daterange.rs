//! Date range parsing for the search form.
//!
//! The form sends a single date or a hyphen-separated `start-end` range,
//! with either side optional. Sides are parsed with a loose human-date
//! parser, localized to the viewer's timezone, and end dates are advanced
//! to 23:59:59 so date-only end bounds cover the whole day. A side that
//! fails to parse produces a non-fatal warning and is dropped.

use chrono::{Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::store::{Bound, FieldMatch, Matcher};

/// Whether bounds compare full timestamps or calendar dates.
///
/// Conference date ranges are date-only and target `start_date`; talk
/// ranges target `start_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateGranularity {
    Timestamps,
    Dates,
}

impl DateGranularity {
    fn field(self) -> &'static str {
        match self {
            DateGranularity::Timestamps => "start_time",
            DateGranularity::Dates => "start_date",
        }
    }
}

/// Outcome of parsing a date range input.
#[derive(Debug, Clone, Default)]
pub struct ParsedRange {
    /// The range clause, absent when neither side parsed.
    pub clause: Option<FieldMatch>,
    /// User-visible warnings for sides that failed to parse.
    pub warnings: Vec<String>,
}

/// Parse a raw date range input in the viewer's timezone.
pub fn parse_range(raw: &str, tz: Tz, granularity: DateGranularity) -> ParsedRange {
    let mut result = ParsedRange::default();
    let raw = raw.trim();
    if raw.is_empty() {
        return result;
    }

    let (start_raw, end_raw) = split_range(raw);

    let mut gte = None;
    let mut lte = None;

    if !start_raw.is_empty() {
        match parse_loose(&start_raw) {
            Some(naive) => {
                gte = make_bound(naive, tz, granularity);
                if gte.is_none() {
                    result
                        .warnings
                        .push(format!("Could not parse start date {start_raw}."));
                }
            }
            None => result
                .warnings
                .push(format!("Could not parse start date {start_raw}.")),
        }
    }

    if !end_raw.is_empty() {
        match parse_loose(&end_raw) {
            Some(naive) => {
                // Inclusive of the whole end day.
                let advanced = naive + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59);
                lte = make_bound(advanced, tz, granularity);
                if lte.is_none() {
                    result
                        .warnings
                        .push(format!("Could not parse end date {end_raw}."));
                }
            }
            None => result
                .warnings
                .push(format!("Could not parse end date {end_raw}.")),
        }
    }

    if gte.is_some() || lte.is_some() {
        result.clause = Some(FieldMatch::new(
            granularity.field(),
            Matcher::Range { gte, lte },
        ));
    }
    result
}

fn make_bound(naive: NaiveDateTime, tz: Tz, granularity: DateGranularity) -> Option<Bound> {
    match granularity {
        DateGranularity::Dates => Some(Bound::Date(naive.date())),
        // A local time falling in a DST gap cannot be localized; the side
        // is dropped with a warning like any other unparseable input.
        DateGranularity::Timestamps => tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| Bound::Time(dt.with_timezone(&Utc))),
    }
}

/// Split a raw input into start and end sides.
///
/// Dates themselves may contain hyphens (ISO dates), so the split point is
/// the first hyphen where both sides are empty or parseable. An input that
/// parses as a whole is a single date covering one day. When no split
/// works, the first hyphen is used and each side reports its own warning.
fn split_range(raw: &str) -> (String, String) {
    if !raw.contains('-') || parse_loose(raw).is_some() {
        return (raw.to_string(), raw.to_string());
    }
    let side_ok = |s: &str| s.is_empty() || parse_loose(s).is_some();
    for (idx, ch) in raw.char_indices() {
        if ch != '-' {
            continue;
        }
        let left = raw[..idx].trim();
        let right = raw[idx + 1..].trim();
        if side_ok(left) && side_ok(right) {
            return (left.to_string(), right.to_string());
        }
    }
    match raw.split_once('-') {
        Some((left, right)) => (left.trim().to_string(), right.trim().to_string()),
        None => (raw.to_string(), raw.to_string()),
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a loose human date, date-only inputs landing at midnight.
fn parse_loose(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
