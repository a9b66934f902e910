//! ICS export of a single record.
//!
//! Shared by the download endpoint and the `export` command: the caller
//! names which record fields hold the dates, location and description, and
//! the record's label and UUID become the title and `UID`.

use tracing::debug;

use calexport_core::{DateParseError, EventFields, IcsFormatter, Record, ics_filename};

/// Field names selected for an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    /// Field holding the start date.
    pub start: String,
    /// Field holding the end date.
    pub end: String,
    /// Field holding the location.
    pub location: Option<String>,
    /// Field holding the description.
    pub description: Option<String>,
}

impl FieldSelection {
    /// Creates a selection of the two required date fields.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            location: None,
            description: None,
        }
    }

    /// Builder: set the location field.
    pub fn with_location(mut self, field: Option<String>) -> Self {
        self.location = field.filter(|f| !f.is_empty());
        self
    }

    /// Builder: set the description field.
    pub fn with_description(mut self, field: Option<String>) -> Self {
        self.description = field.filter(|f| !f.is_empty());
        self
    }

    /// Resolves the selected fields on a record.
    ///
    /// Fields the record does not carry are logged and left empty.
    pub fn resolve(&self, record: &Record) -> EventFields {
        let optional = |field: &Option<String>| {
            field
                .as_deref()
                .map(|f| record.field_or_empty(f))
                .unwrap_or_default()
        };

        EventFields::new(
            record.label.clone(),
            record.field_or_empty(&self.start),
            record.uuid.clone(),
        )
        .with_end(record.field_or_empty(&self.end))
        .with_location(optional(&self.location))
        .with_description(optional(&self.description))
    }
}

/// A rendered ICS download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsExport {
    /// Sanitized filename, ending in `.ics`.
    pub filename: String,
    /// ICS document.
    pub body: String,
}

impl IcsExport {
    /// Returns the `Content-Disposition` header value.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Renders a record as an ICS download.
pub fn export_record(
    formatter: &IcsFormatter,
    record: &Record,
    selection: &FieldSelection,
) -> Result<IcsExport, DateParseError> {
    let fields = selection.resolve(record);
    let body = formatter.format(&fields)?;
    let filename = ics_filename(&record.label);

    debug!(
        entity_type = %record.entity_type,
        entity_id = %record.id,
        filename = %filename,
        "Exported record"
    );
    Ok(IcsExport { filename, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calexport_core::DateFallback;

    fn record() -> Record {
        Record::new("node", "42", "abc-123", "Team Sync!")
            .with_field("field_title", "ignored for downloads")
            .with_field("field_start", "2024-06-01 10:00")
            .with_field("field_end", "2024-06-01 11:00")
            .with_field("field_where", "Room 1")
            .with_field("body", "")
    }

    #[test]
    fn label_is_title_and_filename() {
        let export = export_record(
            &IcsFormatter::default(),
            &record(),
            &FieldSelection::new("field_start", "field_end"),
        )
        .unwrap();

        assert_eq!(export.filename, "Team_Sync_.ics");
        assert!(export.body.contains("SUMMARY:Team Sync!\r\n"));
        assert!(export.body.contains("UID:abc-123\r\n"));
        assert_eq!(
            export.content_disposition(),
            "attachment; filename=\"Team_Sync_.ics\""
        );
    }

    #[test]
    fn optional_fields_are_resolved() {
        let selection = FieldSelection::new("field_start", "field_end")
            .with_location(Some("field_where".to_string()))
            .with_description(Some("body".to_string()));
        let fields = selection.resolve(&record());

        assert_eq!(fields.location(), Some("Room 1"));
        assert_eq!(fields.description(), None);
    }

    #[test]
    fn empty_optional_selection_is_unset() {
        let selection = FieldSelection::new("a", "b").with_location(Some(String::new()));
        assert_eq!(selection.location, None);
    }

    #[test]
    fn unknown_end_field_omits_dtend() {
        let export = export_record(
            &IcsFormatter::default(),
            &record(),
            &FieldSelection::new("field_start", "field_gone"),
        )
        .unwrap();
        assert!(!export.body.contains("DTEND"));
    }

    #[test]
    fn unknown_start_field_is_a_date_error() {
        let result = export_record(
            &IcsFormatter::default(),
            &record(),
            &FieldSelection::new("field_gone", "field_end"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_start_field_is_epoch_under_epoch_fallback() {
        let formatter = IcsFormatter::new("x//y", DateFallback::Epoch);
        let export = export_record(
            &formatter,
            &record(),
            &FieldSelection::new("field_gone", "field_end"),
        )
        .unwrap();
        assert!(export.body.contains("DTSTART:19700101T000000Z"));
    }
}
