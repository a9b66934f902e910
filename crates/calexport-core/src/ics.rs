//! ICS document generation.
//!
//! Produces a single-event iCalendar (RFC 5545) document from
//! [`EventFields`]. Lines are joined with CRLF and the document carries no
//! trailing line break.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::DateParseError;
use crate::event::EventFields;
use crate::time::{DateFallback, DateNormalizer};

/// Default product identifier, rendered as `PRODID:-//<id>//EN`.
pub const DEFAULT_PRODUCT_ID: &str = "calexport//Event Calendar Export";

/// MIME type of the generated documents.
pub const ICS_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Characters replaced in download filenames.
static FILENAME_UNSAFE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("Invalid filename regex"));

/// Formats [`EventFields`] as an ICS document.
#[derive(Debug, Clone)]
pub struct IcsFormatter {
    product_id: String,
    dates: DateNormalizer,
}

impl Default for IcsFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_ID, DateFallback::default())
    }
}

impl IcsFormatter {
    /// Creates a formatter with the given product id and date policy.
    pub fn new(product_id: impl Into<String>, fallback: DateFallback) -> Self {
        Self {
            product_id: product_id.into(),
            dates: DateNormalizer::new(fallback),
        }
    }

    /// Returns the product identifier.
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Renders a complete VCALENDAR document for one event.
    ///
    /// `DTEND`, `LOCATION` and `DESCRIPTION` are emitted only when the
    /// corresponding field is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`DateParseError`] when a date cannot be read and the
    /// formatter's fallback is [`DateFallback::Reject`].
    pub fn format(&self, fields: &EventFields) -> Result<String, DateParseError> {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:-//{}//EN", self.product_id),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", fields.uid),
            format!("SUMMARY:{}", escape_text(&fields.title)),
            format!("DTSTART:{}", self.format_ics_date(&fields.start)?),
        ];

        if let Some(end) = fields.end() {
            lines.push(format!("DTEND:{}", self.format_ics_date(end)?));
        }
        if let Some(location) = fields.location() {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(description) = fields.description() {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }

        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());

        debug!(uid = %fields.uid, lines = lines.len(), "Formatted ICS document");
        Ok(lines.join("\r\n"))
    }

    /// Renders date text as an ICS UTC timestamp.
    ///
    /// # Errors
    ///
    /// See [`IcsFormatter::format`].
    pub fn format_ics_date(&self, date: &str) -> Result<String, DateParseError> {
        self.dates.stamp(date)
    }
}

/// Escapes text for an ICS property value.
///
/// Line breaks (`\r\n`, `\n`, `\r`) become the two characters `\n`; `,`,
/// `;` and `\` are backslash-escaped. Backslashes introduced by escaping are
/// never escaped again.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`.
///
/// Replacement is one-for-one; runs of underscores are not collapsed.
pub fn sanitize_filename(title: &str) -> String {
    FILENAME_UNSAFE_REGEX.replace_all(title, "_").into_owned()
}

/// Returns the download filename for an event title.
pub fn ics_filename(title: &str) -> String {
    format!("{}.ics", sanitize_filename(title))
}
