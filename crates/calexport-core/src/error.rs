//! Core error types.

use thiserror::Error;

/// Date text that could not be turned into a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable date: {input:?}")]
pub struct DateParseError {
    /// The raw text that failed to parse.
    pub input: String,
}

impl DateParseError {
    /// Creates a date parse error for the given input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// A configured field name that the record does not carry.
///
/// Never propagated past field resolution: the caller substitutes an empty
/// value and logs it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {field:?} cannot be resolved on {entity_type}/{entity_id}")]
pub struct FieldResolutionError {
    /// The field name that was requested.
    pub field: String,
    /// Entity type of the record.
    pub entity_type: String,
    /// Identifier of the record.
    pub entity_id: String,
}

/// Invalid link options, detected when the options are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// A required field mapping was left empty.
    #[error("required field mapping `{option}` is empty")]
    MissingField { option: &'static str },

    /// A field mapping names a field the catalog does not know.
    #[error("field mapping `{option}` refers to unknown field {field:?}")]
    UnknownField { option: &'static str, field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_parse_error_message_quotes_input() {
        let err = DateParseError::new("next blursday");
        assert_eq!(err.to_string(), "unparseable date: \"next blursday\"");
    }

    #[test]
    fn options_error_messages() {
        let err = OptionsError::MissingField {
            option: "start_field",
        };
        assert_eq!(err.to_string(), "required field mapping `start_field` is empty");

        let err = OptionsError::UnknownField {
            option: "location_field",
            field: "field_where".to_string(),
        };
        assert!(err.to_string().contains("field_where"));
    }
}
