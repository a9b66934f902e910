//! Event-like records and the values resolved from them.
//!
//! - [`Record`]: a stored record with a label, a stable UUID and named fields
//! - [`RecordRef`]: the `(entity_type, id)` pair addressing a record
//! - [`EventFields`]: the calendar view of one record, after field mapping
//! - [`RecordResolver`] / [`FieldNameCatalog`]: capabilities supplied by the host

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FieldResolutionError;
use crate::options::LinkOptions;

/// Identifies a record by entity type and id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordRef<'a> {
    /// Entity type, e.g. `node`.
    pub entity_type: &'a str,
    /// Record id within the entity type.
    pub id: &'a str,
}

impl<'a> RecordRef<'a> {
    /// Creates a record reference.
    pub fn new(entity_type: &'a str, id: &'a str) -> Self {
        Self { entity_type, id }
    }
}

/// A stored record whose fields can be mapped onto calendar semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Entity type, e.g. `node`.
    pub entity_type: String,
    /// Record id within the entity type.
    pub id: String,
    /// Stable unique identifier, used as the ICS `UID`.
    pub uuid: String,
    /// Human-readable label, used as the downloaded event title.
    pub label: String,
    /// Field values keyed by field name.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Record {
    /// Creates a record without fields.
    pub fn new(
        entity_type: impl Into<String>,
        id: impl Into<String>,
        uuid: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            uuid: uuid.into(),
            label: label.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder method to add a field value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the reference addressing this record.
    pub fn record_ref(&self) -> RecordRef<'_> {
        RecordRef::new(&self.entity_type, &self.id)
    }

    /// Looks up a field value by name.
    pub fn field(&self, name: &str) -> Result<&str, FieldResolutionError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| FieldResolutionError {
                field: name.to_string(),
                entity_type: self.entity_type.clone(),
                entity_id: self.id.clone(),
            })
    }

    /// Looks up a field value, substituting an empty string when the field
    /// cannot be resolved.
    ///
    /// An empty `name` means "no field configured" and resolves silently.
    pub fn field_or_empty(&self, name: &str) -> String {
        if name.is_empty() {
            return String::new();
        }
        match self.field(name) {
            Ok(value) => value.to_string(),
            Err(err) => {
                warn!(error = %err, "Error getting field value");
                String::new()
            }
        }
    }
}

/// The calendar view of a single record.
///
/// `title` and `start` must be non-empty when links or ICS documents are
/// generated; empty optional fields are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFields {
    /// Event title.
    pub title: String,
    /// Raw start date text.
    pub start: String,
    /// Raw end date text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Event location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Event description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stable unique identifier of the source record.
    pub uid: String,
}

impl EventFields {
    /// Creates event fields with the required values.
    pub fn new(
        title: impl Into<String>,
        start: impl Into<String>,
        uid: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            start: start.into(),
            uid: uid.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the end date. Empty text clears it.
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = non_empty(end.into());
        self
    }

    /// Builder method to set the location. Empty text clears it.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_empty(location.into());
        self
    }

    /// Builder method to set the description. Empty text clears it.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    /// Resolves display values from a record using the configured mapping.
    ///
    /// The title comes from `options.title_field`. Unresolvable fields are
    /// logged and become empty.
    pub fn resolve(record: &Record, options: &LinkOptions) -> Self {
        Self::new(
            record.field_or_empty(&options.title_field),
            record.field_or_empty(&options.start_field),
            record.uuid.clone(),
        )
        .with_end(record.field_or_empty(&options.end_field))
        .with_location(record.field_or_empty(options.location_field.as_deref().unwrap_or("")))
        .with_description(
            record.field_or_empty(options.description_field.as_deref().unwrap_or("")),
        )
    }

    /// Returns the end date text, if any.
    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    /// Returns the location, if any.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Looks up records by entity type and id.
pub trait RecordResolver: Send + Sync {
    /// Returns the record, or `None` if it does not exist.
    fn get(&self, entity_type: &str, id: &str) -> Option<Record>;
}

/// Lists the field names available for mapping.
pub trait FieldNameCatalog {
    /// Returns every field name that can be mapped.
    fn list_fields(&self) -> Vec<String>;
}

impl FieldNameCatalog for Vec<String> {
    fn list_fields(&self) -> Vec<String> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        Record::new("node", "42", "abc-123", "Team Sync")
            .with_field("field_title", "Team Sync")
            .with_field("field_start", "2024-06-01 10:00")
            .with_field("field_end", "2024-06-01 11:00")
            .with_field("field_where", "Room 1")
    }

    fn sample_options() -> LinkOptions {
        LinkOptions::new("field_start", "field_end", "field_title")
    }

    mod record {
        use super::*;

        #[test]
        fn field_lookup() {
            let record = sample_record();
            assert_eq!(record.field("field_where").unwrap(), "Room 1");
        }

        #[test]
        fn missing_field_reports_context() {
            let record = sample_record();
            let err = record.field("field_missing").unwrap_err();
            assert_eq!(err.field, "field_missing");
            assert_eq!(err.entity_type, "node");
            assert_eq!(err.entity_id, "42");
        }

        #[test]
        fn missing_field_resolves_empty() {
            let record = sample_record();
            assert_eq!(record.field_or_empty("field_missing"), "");
            assert_eq!(record.field_or_empty(""), "");
        }

        #[test]
        fn record_ref_addresses_record() {
            let record = sample_record();
            assert_eq!(record.record_ref(), RecordRef::new("node", "42"));
        }

        #[test]
        fn deserializes_without_fields() {
            let json = r#"{"entity_type":"node","id":"1","uuid":"u","label":"L"}"#;
            let record: Record = serde_json::from_str(json).unwrap();
            assert!(record.fields.is_empty());
        }
    }

    mod event_fields {
        use super::*;

        #[test]
        fn empty_optionals_are_absent() {
            let fields = EventFields::new("T", "2024-06-01", "u")
                .with_end("")
                .with_location("")
                .with_description("");
            assert_eq!(fields.end(), None);
            assert_eq!(fields.location(), None);
            assert_eq!(fields.description(), None);
        }

        #[test]
        fn resolve_uses_mapping() {
            let options = sample_options().with_location_field("field_where");
            let fields = EventFields::resolve(&sample_record(), &options);
            assert_eq!(fields.title, "Team Sync");
            assert_eq!(fields.start, "2024-06-01 10:00");
            assert_eq!(fields.end(), Some("2024-06-01 11:00"));
            assert_eq!(fields.location(), Some("Room 1"));
            assert_eq!(fields.description(), None);
            assert_eq!(fields.uid, "abc-123");
        }

        #[test]
        fn resolve_substitutes_empty_for_unknown_fields() {
            let options = sample_options().with_description_field("field_gone");
            let fields = EventFields::resolve(&sample_record(), &options);
            assert_eq!(fields.description(), None);
        }

        #[test]
        fn serializes_without_absent_optionals() {
            let fields = EventFields::new("T", "2024-06-01", "u");
            let json = serde_json::to_value(&fields).unwrap();
            assert!(json.get("location").is_none());
            assert_eq!(json["title"], "T");
        }
    }

    #[test]
    fn vec_is_a_catalog() {
        let catalog = vec!["a".to_string(), "b".to_string()];
        assert_eq!(catalog.list_fields(), vec!["a", "b"]);
    }
}
