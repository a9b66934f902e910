//! Admin-configured link options.
//!
//! [`LinkOptions`] maps calendar roles (start, end, title, location,
//! description) onto record field names and toggles the two link kinds.
//! Options are validated once, when they are loaded, with
//! [`LinkOptions::validate`].

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::event::FieldNameCatalog;

/// Default text of the ICS download link.
pub const DEFAULT_ICS_LINK_TEXT: &str = "Download ICS";

/// Default text of the Google Calendar link.
pub const DEFAULT_GOOGLE_LINK_TEXT: &str = "Add to Google Calendar";

/// Field mapping and display toggles for calendar links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkOptions {
    /// Field holding the event start date.
    pub start_field: String,
    /// Field holding the event end date.
    pub end_field: String,
    /// Field holding the event title.
    pub title_field: String,
    /// Field holding the event location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_field: Option<String>,
    /// Field holding the event description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_field: Option<String>,
    /// Whether to render the ICS download link.
    pub show_ics: bool,
    /// Whether to render the Google Calendar link.
    pub show_google: bool,
    /// Text of the ICS download link.
    pub ics_link_text: String,
    /// Text of the Google Calendar link.
    pub google_link_text: String,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            start_field: String::new(),
            end_field: String::new(),
            title_field: String::new(),
            location_field: None,
            description_field: None,
            show_ics: true,
            show_google: true,
            ics_link_text: DEFAULT_ICS_LINK_TEXT.to_string(),
            google_link_text: DEFAULT_GOOGLE_LINK_TEXT.to_string(),
        }
    }
}

impl LinkOptions {
    /// Creates options with the required field mapping and default toggles.
    pub fn new(
        start_field: impl Into<String>,
        end_field: impl Into<String>,
        title_field: impl Into<String>,
    ) -> Self {
        Self {
            start_field: start_field.into(),
            end_field: end_field.into(),
            title_field: title_field.into(),
            ..Default::default()
        }
    }

    /// Builder: set the location field.
    pub fn with_location_field(mut self, field: impl Into<String>) -> Self {
        self.location_field = Some(field.into());
        self
    }

    /// Builder: set the description field.
    pub fn with_description_field(mut self, field: impl Into<String>) -> Self {
        self.description_field = Some(field.into());
        self
    }

    /// Builder: toggle the ICS link.
    pub fn with_show_ics(mut self, show: bool) -> Self {
        self.show_ics = show;
        self
    }

    /// Builder: toggle the Google Calendar link.
    pub fn with_show_google(mut self, show: bool) -> Self {
        self.show_google = show;
        self
    }

    /// Builder: set both link texts.
    pub fn with_link_texts(
        mut self,
        ics_link_text: impl Into<String>,
        google_link_text: impl Into<String>,
    ) -> Self {
        self.ics_link_text = ics_link_text.into();
        self.google_link_text = google_link_text.into();
        self
    }

    /// Returns the configured location field, treating an empty name as unset.
    pub fn location_field(&self) -> Option<&str> {
        self.location_field.as_deref().filter(|f| !f.is_empty())
    }

    /// Returns the configured description field, treating an empty name as unset.
    pub fn description_field(&self) -> Option<&str> {
        self.description_field
            .as_deref()
            .filter(|f| !f.is_empty())
    }

    /// Checks that the required mappings are set and, when a catalog is
    /// given, that every mapped field exists.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in field order.
    pub fn validate<C>(&self, catalog: Option<&C>) -> Result<(), OptionsError>
    where
        C: FieldNameCatalog + ?Sized,
    {
        let required = [
            ("start_field", self.start_field.as_str()),
            ("end_field", self.end_field.as_str()),
            ("title_field", self.title_field.as_str()),
        ];
        for (option, field) in required {
            if field.is_empty() {
                return Err(OptionsError::MissingField { option });
            }
        }

        let Some(catalog) = catalog else {
            return Ok(());
        };
        let known = catalog.list_fields();

        let optional = [
            ("location_field", self.location_field()),
            ("description_field", self.description_field()),
        ];
        let mapped = required
            .into_iter()
            .chain(optional.into_iter().filter_map(|(o, f)| f.map(|f| (o, f))));

        for (option, field) in mapped {
            if !known.iter().any(|k| k == field) {
                return Err(OptionsError::UnknownField {
                    option,
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}
