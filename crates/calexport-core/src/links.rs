//! Calendar link generation.
//!
//! [`CalendarLinkBuilder`] turns one record's resolved fields into the two
//! export links shown next to it:
//! - a relative URL to the ICS download endpoint, carrying the configured
//!   *field names* so the endpoint can resolve values itself
//! - a Google Calendar quick-add URL carrying the field *values*
//!
//! # Example
//!
//! ```
//! use calexport_core::{CalendarLinkBuilder, EventFields, LinkOptions, RecordRef};
//!
//! let builder = CalendarLinkBuilder::default();
//! let options = LinkOptions::new("field_start", "field_end", "field_title");
//! let fields = EventFields::new("Team Sync", "2024-06-01 10:00", "abc-123")
//!     .with_end("2024-06-01 11:00");
//!
//! let links = builder.build_links(&fields, &options, RecordRef::new("node", "42"));
//! assert_eq!(
//!     links.ics_url.as_deref(),
//!     Some("/calendar-export/ics/node/42?start=field_start&end=field_end")
//! );
//! assert!(links.google_url.unwrap().contains("dates=20240601T100000Z%2F20240601T110000Z"));
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::error::DateParseError;
use crate::event::{EventFields, Record, RecordRef};
use crate::options::LinkOptions;
use crate::time::{DateFallback, DateInput, DateNormalizer};

/// Google Calendar event template endpoint.
pub const GOOGLE_CALENDAR_RENDER_URL: &str = "https://calendar.google.com/calendar/render";

/// Default route prefix of the ICS download endpoint.
pub const DEFAULT_ICS_ROUTE: &str = "/calendar-export/ics";

/// The links rendered for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedLinks {
    /// Relative URL of the ICS download, when enabled.
    pub ics_url: Option<String>,
    /// Google Calendar quick-add URL, when enabled and buildable.
    pub google_url: Option<String>,
    /// Whether the ICS link is enabled.
    pub show_ics: bool,
    /// Whether the Google Calendar link is enabled.
    pub show_google: bool,
    /// Text of the ICS link.
    pub ics_text: String,
    /// Text of the Google Calendar link.
    pub google_text: String,
}

impl RenderedLinks {
    /// Returns `true` if no link will be displayed.
    pub fn is_empty(&self) -> bool {
        !(self.show_ics && self.ics_url.is_some()) && !(self.show_google && self.google_url.is_some())
    }
}

/// Builds ICS download and Google Calendar links.
#[derive(Debug, Clone)]
pub struct CalendarLinkBuilder {
    ics_route: String,
    dates: DateNormalizer,
}

impl Default for CalendarLinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ICS_ROUTE, DateFallback::default())
    }
}

impl CalendarLinkBuilder {
    /// Creates a builder for the given download route and date policy.
    pub fn new(ics_route: impl Into<String>, fallback: DateFallback) -> Self {
        let ics_route = ics_route.into();
        Self {
            ics_route: ics_route.trim_end_matches('/').to_string(),
            dates: DateNormalizer::new(fallback),
        }
    }

    /// Returns the download route prefix.
    pub fn ics_route(&self) -> &str {
        &self.ics_route
    }

    /// Builds the links for one record from already resolved fields.
    ///
    /// A Google Calendar URL whose dates cannot be read is left out and
    /// logged; the ICS link does not depend on field values.
    pub fn build_links(
        &self,
        fields: &EventFields,
        options: &LinkOptions,
        record: RecordRef<'_>,
    ) -> RenderedLinks {
        let mut links = RenderedLinks {
            ics_url: None,
            google_url: None,
            show_ics: options.show_ics,
            show_google: options.show_google,
            ics_text: options.ics_link_text.clone(),
            google_text: options.google_link_text.clone(),
        };

        if options.show_ics {
            links.ics_url = Some(self.ics_download_url(options, record));
        }

        if options.show_google {
            match self.build_google_calendar_url(
                &fields.title,
                &fields.start,
                fields.end(),
                fields.location(),
                fields.description(),
            ) {
                Ok(url) => links.google_url = Some(url),
                Err(err) => warn!(
                    entity_type = record.entity_type,
                    entity_id = record.id,
                    error = %err,
                    "Skipping Google Calendar link"
                ),
            }
        }

        debug!(
            entity_type = record.entity_type,
            entity_id = record.id,
            ics = links.ics_url.is_some(),
            google = links.google_url.is_some(),
            "Built calendar links"
        );
        links
    }

    /// Resolves a record's fields through `options` and builds its links.
    pub fn build_links_for_record(&self, record: &Record, options: &LinkOptions) -> RenderedLinks {
        let fields = EventFields::resolve(record, options);
        self.build_links(&fields, options, record.record_ref())
    }

    /// Returns the relative download URL for a record.
    ///
    /// Query values are field names: `start`, `end`, then `location` and
    /// `description` when configured.
    pub fn ics_download_url(&self, options: &LinkOptions, record: RecordRef<'_>) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("start", &options.start_field);
        query.append_pair("end", &options.end_field);
        if let Some(location) = options.location_field() {
            query.append_pair("location", location);
        }
        if let Some(description) = options.description_field() {
            query.append_pair("description", description);
        }

        format!(
            "{}/{}/{}?{}",
            self.ics_route,
            urlencoding::encode(record.entity_type),
            urlencoding::encode(record.id),
            query.finish()
        )
    }

    /// Builds a Google Calendar quick-add URL.
    ///
    /// `location` and `details` are added only when non-empty. Like `text`,
    /// they are also dropped when the value is exactly `"0"`.
    ///
    /// A missing end renders the epoch only under [`DateFallback::Epoch`],
    /// which keeps the legacy output. [`DateFallback::Reject`] departs from
    /// it: the start time is reused, giving a zero-length event instead of
    /// one that ends in 1970.
    ///
    /// # Errors
    ///
    /// Returns [`DateParseError`] when a date cannot be read under
    /// [`DateFallback::Reject`].
    pub fn build_google_calendar_url(
        &self,
        title: &str,
        start: &str,
        end: Option<&str>,
        location: Option<&str>,
        description: Option<&str>,
    ) -> Result<String, DateParseError> {
        let start_stamp = self.format_google_calendar_date(start)?;
        let end_stamp = match end.filter(|e| !e.is_empty()) {
            Some(end) => self.format_google_calendar_date(end)?,
            None => match self.dates.fallback() {
                DateFallback::Epoch => self.format_google_calendar_date("")?,
                DateFallback::Reject => start_stamp.clone(),
            },
        };

        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("action", "TEMPLATE");
        if !is_falsy(title) {
            query.append_pair("text", title);
        }
        query.append_pair("dates", &format!("{}/{}", start_stamp, end_stamp));
        if let Some(location) = location.filter(|l| !is_falsy(l)) {
            query.append_pair("location", location);
        }
        if let Some(description) = description.filter(|d| !is_falsy(d)) {
            query.append_pair("details", description);
        }

        Ok(format!("{}?{}", GOOGLE_CALENDAR_RENDER_URL, query.finish()))
    }

    /// Renders a date for the `dates` parameter as `YYYYMMDDTHHMMSSZ`.
    ///
    /// # Errors
    ///
    /// See [`CalendarLinkBuilder::build_google_calendar_url`].
    pub fn format_google_calendar_date<'a>(
        &self,
        date: impl Into<DateInput<'a>>,
    ) -> Result<String, DateParseError> {
        self.dates.stamp(date)
    }
}

/// Values dropped from the Google Calendar query.
fn is_falsy(value: &str) -> bool {
    value.is_empty() || value == "0"
}
