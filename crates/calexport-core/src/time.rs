//! Date normalization for calendar output.
//!
//! Field values arrive as free-form text. This module turns them into UTC
//! timestamps with a best-effort parser ([`parse_date`]) and renders them in
//! the `YYYYMMDDTHHMMSSZ` form shared by ICS documents and Google Calendar
//! URLs ([`format_utc_stamp`]).
//!
//! Text without an offset is read as UTC wall-clock time, so
//! `"2024-06-01 10:00:00"` becomes `20240601T100000Z`. Text that carries an
//! offset is converted to real UTC before rendering.
//!
//! Strict `chrono` formats are tried first; anything they reject goes through
//! `fuzzydate`, which reads phrases such as `"tomorrow 10:00"` or
//! `"next monday"`.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DateParseError;

/// `strftime` pattern of the rendered timestamp.
pub const UTC_STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Stamp produced for unparseable input under [`DateFallback::Epoch`].
pub const EPOCH_STAMP: &str = "19700101T000000Z";

/// Matches `@<unix seconds>`, or bare seconds of at least nine digits.
static UNIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@(-?\d+)|(\d{9,}))$").expect("Invalid unix timestamp regex")
});

/// Formats that carry an explicit UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

/// Date and time formats read as UTC wall-clock time.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%SZ",
    "%Y-%m-%d %H:%M:%S UTC",
    "%Y-%m-%d %H:%M UTC",
    "%Y%m%dT%H%M%SZ",
    "%Y%m%dT%H%M%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d %Y %H:%M",
];

/// Date-only formats, resolved to midnight UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%a %b %d %Y",
];

/// What to do with date text the parser cannot read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFallback {
    /// Report a [`DateParseError`].
    #[default]
    Reject,
    /// Render the Unix epoch (`19700101T000000Z`) and log a warning.
    Epoch,
}

/// A date supplied either as raw text or as an already resolved timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput<'a> {
    /// Raw field text, parsed on use.
    Text(&'a str),
    /// A timestamp that needs no parsing.
    Timestamp(DateTime<Utc>),
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for DateInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text.as_str())
    }
}

impl From<DateTime<Utc>> for DateInput<'_> {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Timestamp(dt)
    }
}

/// Renders dates as UTC stamps under a [`DateFallback`] policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateNormalizer {
    fallback: DateFallback,
}

impl DateNormalizer {
    /// Creates a normalizer with the given fallback policy.
    pub fn new(fallback: DateFallback) -> Self {
        Self { fallback }
    }

    /// Returns the fallback policy.
    pub fn fallback(&self) -> DateFallback {
        self.fallback
    }

    /// Renders `input` as `YYYYMMDDTHHMMSSZ`.
    ///
    /// Relative keywords (`now`, `today`, ...) resolve against the current
    /// time.
    pub fn stamp<'a>(&self, input: impl Into<DateInput<'a>>) -> Result<String, DateParseError> {
        self.stamp_at(input, Utc::now())
    }

    /// Renders `input` as `YYYYMMDDTHHMMSSZ`, resolving relative keywords
    /// against `now`.
    pub fn stamp_at<'a>(
        &self,
        input: impl Into<DateInput<'a>>,
        now: DateTime<Utc>,
    ) -> Result<String, DateParseError> {
        let dt = match input.into() {
            DateInput::Timestamp(dt) => dt,
            DateInput::Text(text) => match parse_date_at(text, now) {
                Ok(dt) => dt,
                Err(err) => match self.fallback {
                    DateFallback::Reject => return Err(err),
                    DateFallback::Epoch => {
                        warn!(input = %err.input, "Unparseable date, rendering epoch");
                        return Ok(EPOCH_STAMP.to_string());
                    }
                },
            },
        };
        Ok(format_utc_stamp(dt))
    }
}

/// Renders a timestamp as `YYYYMMDDTHHMMSSZ`.
pub fn format_utc_stamp(dt: DateTime<Utc>) -> String {
    dt.format(UTC_STAMP_FORMAT).to_string()
}

/// Parses free-form date text into a UTC timestamp.
///
/// See [`parse_date_at`] for the accepted forms.
pub fn parse_date(text: &str) -> Result<DateTime<Utc>, DateParseError> {
    parse_date_at(text, Utc::now())
}

/// Parses free-form date text, resolving relative keywords against `now`.
///
/// Accepted, in order of precedence:
/// - keywords `now`, `today`, `midnight`, `tomorrow`, `yesterday`
/// - `@<unix seconds>`
/// - RFC 3339, RFC 2822 and ISO-like forms with an offset
/// - ISO-like, compact (`20240601T100000`), US (`06/01/2024`) and
///   month-name forms without an offset, read as UTC
/// - the same families without a time, read as midnight UTC
/// - bare unix seconds (nine digits or more, so `20240601` stays a date)
/// - relative and spelled-out phrases understood by `fuzzydate`, resolved
///   against `now` and read as UTC
pub fn parse_date_at(text: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, DateParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::new(text));
    }

    let parsed = parse_keyword(trimmed, now)
        .or_else(|| parse_unix(trimmed, true))
        .or_else(|| parse_with_offset(trimmed))
        .or_else(|| parse_naive_datetime(trimmed))
        .or_else(|| parse_date_only(trimmed))
        .or_else(|| parse_unix(trimmed, false))
        .or_else(|| parse_fuzzy(trimmed, now));

    match parsed {
        Some(dt) => {
            debug!(input = trimmed, parsed = %dt, "Parsed date");
            Ok(dt)
        }
        None => Err(DateParseError::new(text)),
    }
}

fn parse_keyword(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let midnight = now.date_naive().and_hms_opt(0, 0, 0)?.and_utc();
    match text.to_ascii_lowercase().as_str() {
        "now" => Some(now),
        "today" | "midnight" => Some(midnight),
        "tomorrow" => Some(midnight + Duration::days(1)),
        "yesterday" => Some(midnight - Duration::days(1)),
        _ => None,
    }
}

/// `prefixed` selects the `@` form; the bare form runs after the date-only
/// formats.
fn parse_unix(text: &str, prefixed: bool) -> Option<DateTime<Utc>> {
    let caps = UNIX_REGEX.captures(text)?;
    let secs: i64 = caps.get(if prefixed { 1 } else { 2 })?.as_str().parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}

fn parse_with_offset(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive_datetime(text: &str) -> Option<DateTime<Utc>> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_date_only(text: &str) -> Option<DateTime<Utc>> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_fuzzy(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    fuzzydate::parse_relative_to(&text.to_lowercase(), now.naive_utc())
        .ok()
        .map(|naive| naive.and_utc())
}
