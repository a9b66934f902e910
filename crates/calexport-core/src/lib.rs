//! Core types: event fields, link options, ICS formatting, calendar links

pub mod error;
pub mod event;
pub mod format;
pub mod ics;
pub mod links;
pub mod options;
pub mod time;
pub mod tracing;

pub use error::{DateParseError, FieldResolutionError, OptionsError};
pub use event::{EventFields, FieldNameCatalog, Record, RecordRef, RecordResolver};
pub use format::{LinkRow, LinkTable, html_escape, render_links_html};
pub use ics::{
    DEFAULT_PRODUCT_ID, ICS_CONTENT_TYPE, IcsFormatter, escape_text, ics_filename,
    sanitize_filename,
};
pub use links::{CalendarLinkBuilder, DEFAULT_ICS_ROUTE, RenderedLinks};
pub use options::LinkOptions;
pub use time::{DateFallback, DateInput, DateNormalizer, format_utc_stamp, parse_date};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
