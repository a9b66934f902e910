//! Server configuration.
//!
//! All settings live in a single `calexport.toml`, by default at
//! `~/.config/calexport/calexport.toml`:
//!
//! ```toml
//! bind = "127.0.0.1:8080"
//! records_path = "records.json"
//! date_fallback = "reject"
//! missing_fields_status = "not_found"
//!
//! [[views]]
//! name = "events"
//! entity_type = "node"
//! columns = ["field_title", "field_date"]
//!
//! [views.links]
//! start_field = "field_date"
//! end_field = "field_date_end"
//! title_field = "field_title"
//! location_field = "field_venue"
//! ```

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use calexport_core::{
    DEFAULT_ICS_ROUTE, DEFAULT_PRODUCT_ID, DateFallback, LinkOptions, TracingOutputFormat,
};

use crate::error::{ServerError, ServerResult};
use crate::store::RecordSource;

/// Status answered when `start` or `end` is missing from a download request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldsStatus {
    /// 404, the long-standing behaviour.
    #[default]
    NotFound,
    /// 400.
    BadRequest,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,

    /// JSON file holding the records to serve.
    pub records_path: PathBuf,

    /// Route prefix of the ICS download endpoint.
    pub ics_route: String,

    /// Product identifier written to `PRODID`.
    pub product_id: String,

    /// Handling of unparseable dates.
    pub date_fallback: DateFallback,

    /// Status for download requests without `start`/`end`.
    pub missing_fields_status: MissingFieldsStatus,

    /// Log output format of the server.
    pub log_format: TracingOutputFormat,

    /// Tabular views of records with calendar links.
    pub views: Vec<ViewConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            records_path: PathBuf::from("records.json"),
            ics_route: DEFAULT_ICS_ROUTE.to_string(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            date_fallback: DateFallback::default(),
            missing_fields_status: MissingFieldsStatus::default(),
            log_format: TracingOutputFormat::Json,
            views: Vec::new(),
        }
    }
}

/// A table of records of one entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// View name, used in `/views/{name}`.
    pub name: String,

    /// Entity type listed by the view.
    pub entity_type: String,

    /// Table caption.
    #[serde(default)]
    pub caption: Option<String>,

    /// Field names shown as columns before the links column.
    ///
    /// Defaults to the title and start fields.
    #[serde(default)]
    pub columns: Vec<String>,

    /// Header of the links column.
    #[serde(default = "default_links_header")]
    pub links_header: String,

    /// Field mapping and toggles of the calendar links.
    pub links: LinkOptions,
}

fn default_links_header() -> String {
    "Calendar".to_string()
}

impl ViewConfig {
    /// Creates a view with default columns.
    pub fn new(
        name: impl Into<String>,
        entity_type: impl Into<String>,
        links: LinkOptions,
    ) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            caption: None,
            columns: Vec::new(),
            links_header: default_links_header(),
            links,
        }
    }

    /// Builder: set the columns.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Returns the columns to render.
    pub fn columns(&self) -> Vec<String> {
        if self.columns.is_empty() {
            vec![self.links.title_field.clone(), self.links.start_field.clone()]
        } else {
            self.columns.clone()
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the default path, or defaults if the file
    /// does not exist.
    pub fn load() -> ServerResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|source| {
            ServerError::ConfigParse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        // Relative record paths are relative to the config file.
        if config.records_path.is_relative()
            && let Some(dir) = path.parent()
        {
            config.records_path = dir.join(&config.records_path);
        }
        Ok(config)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calexport")
            .join("calexport.toml")
    }

    /// Builder: set the bind address.
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Builder: set the records file.
    pub fn with_records_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.records_path = path.into();
        self
    }

    /// Builder: set the date fallback.
    pub fn with_date_fallback(mut self, fallback: DateFallback) -> Self {
        self.date_fallback = fallback;
        self
    }

    /// Builder: set the missing-fields status.
    pub fn with_missing_fields_status(mut self, status: MissingFieldsStatus) -> Self {
        self.missing_fields_status = status;
        self
    }

    /// Builder: add a view.
    pub fn with_view(mut self, view: ViewConfig) -> Self {
        self.views.push(view);
        self
    }

    /// Returns the view with the given name.
    pub fn view(&self, name: &str) -> Option<&ViewConfig> {
        self.views.iter().find(|v| v.name == name)
    }

    /// Checks the route, view names and view link options.
    ///
    /// Link options are checked against the fields present on the records
    /// of each view's entity type; types without records only get the
    /// required-mapping check.
    pub fn validate(&self, source: &dyn RecordSource) -> ServerResult<()> {
        if !self.ics_route.starts_with('/') || self.ics_route.contains(['{', '}', '?']) {
            return Err(ServerError::config(format!(
                "ics_route must be an absolute path, got {:?}",
                self.ics_route
            )));
        }

        let mut names = HashSet::new();
        for view in &self.views {
            if !names.insert(view.name.as_str()) {
                return Err(ServerError::config(format!(
                    "duplicate view name {:?}",
                    view.name
                )));
            }

            let known = source.field_names(&view.entity_type);
            let catalog = (!known.is_empty()).then_some(&known);
            view.links
                .validate(catalog)
                .map_err(|e| ServerError::view_options(&view.name, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use calexport_core::Record;

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            Record::new("node", "1", "u-1", "Team Sync")
                .with_field("field_title", "Team Sync")
                .with_field("field_date", "2024-06-01 10:00")
                .with_field("field_date_end", "2024-06-01 11:00"),
        ])
    }

    fn events_view() -> ViewConfig {
        ViewConfig::new(
            "events",
            "node",
            LinkOptions::new("field_date", "field_date_end", "field_title"),
        )
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(config.ics_route, "/calendar-export/ics");
        assert_eq!(config.date_fallback, DateFallback::Reject);
        assert_eq!(config.missing_fields_status, MissingFieldsStatus::NotFound);
        assert!(config.views.is_empty());
    }

    #[test]
    fn custom_config() {
        let config = ServerConfig::default()
            .with_bind(SocketAddr::from(([0, 0, 0, 0], 9000)))
            .with_records_path("/data/records.json")
            .with_date_fallback(DateFallback::Epoch)
            .with_missing_fields_status(MissingFieldsStatus::BadRequest)
            .with_view(events_view());

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.records_path, PathBuf::from("/data/records.json"));
        assert_eq!(config.date_fallback, DateFallback::Epoch);
        assert_eq!(config.missing_fields_status, MissingFieldsStatus::BadRequest);
        assert!(config.view("events").is_some());
        assert!(config.view("missing").is_none());
    }

    #[test]
    fn default_path_format() {
        let path = ServerConfig::default_path();
        assert!(path.ends_with("calexport/calexport.toml"));
    }

    mod loading {
        use super::*;

        #[test]
        fn parses_toml_with_views() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("calexport.toml");
            std::fs::write(
                &path,
                r#"
bind = "127.0.0.1:9090"
records_path = "data/records.json"
date_fallback = "epoch"
missing_fields_status = "bad_request"
log_format = "compact"

[[views]]
name = "events"
entity_type = "node"
caption = "Upcoming"

[views.links]
start_field = "field_date"
end_field = "field_date_end"
title_field = "field_title"
show_google = false
"#,
            )
            .unwrap();

            let config = ServerConfig::load_from(&path).unwrap();
            assert_eq!(config.bind.port(), 9090);
            assert_eq!(config.records_path, dir.path().join("data/records.json"));
            assert_eq!(config.date_fallback, DateFallback::Epoch);
            assert_eq!(config.missing_fields_status, MissingFieldsStatus::BadRequest);
            assert_eq!(config.log_format, TracingOutputFormat::Compact);

            let view = config.view("events").unwrap();
            assert_eq!(view.caption.as_deref(), Some("Upcoming"));
            assert_eq!(view.links_header, "Calendar");
            assert!(view.links.show_ics);
            assert!(!view.links.show_google);
            assert_eq!(view.columns(), vec!["field_title", "field_date"]);
        }

        #[test]
        fn absolute_records_path_is_kept() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("calexport.toml");
            std::fs::write(&path, "records_path = \"/srv/records.json\"\n").unwrap();

            let config = ServerConfig::load_from(&path).unwrap();
            assert_eq!(config.records_path, PathBuf::from("/srv/records.json"));
        }

        #[test]
        fn invalid_toml_reports_path() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("calexport.toml");
            std::fs::write(&path, "bind = 42\n").unwrap();

            let err = ServerConfig::load_from(&path).unwrap_err();
            assert!(matches!(err, ServerError::ConfigParse { .. }));
            assert!(err.to_string().contains("calexport.toml"));
        }

        #[test]
        fn missing_file_is_io_error() {
            let err = ServerConfig::load_from(Path::new("/nonexistent/calexport.toml"))
                .unwrap_err();
            assert!(matches!(err, ServerError::Io(_)));
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn accepts_known_fields() {
            let config = ServerConfig::default().with_view(events_view());
            assert!(config.validate(&store()).is_ok());
        }

        #[test]
        fn rejects_unknown_field() {
            let mut view = events_view();
            view.links = view.links.with_location_field("field_venue");
            let config = ServerConfig::default().with_view(view);

            let err = config.validate(&store()).unwrap_err();
            assert!(matches!(err, ServerError::ViewOptions { .. }));
        }

        #[test]
        fn types_without_records_skip_catalog_check() {
            let view = ViewConfig::new("talks", "talk", LinkOptions::new("a", "b", "c"));
            let config = ServerConfig::default().with_view(view);
            assert!(config.validate(&store()).is_ok());
        }

        #[test]
        fn rejects_missing_required_mapping() {
            let view = ViewConfig::new("talks", "talk", LinkOptions::new("a", "", "c"));
            let config = ServerConfig::default().with_view(view);
            assert!(config.validate(&store()).is_err());
        }

        #[test]
        fn rejects_duplicate_views() {
            let config = ServerConfig::default()
                .with_view(events_view())
                .with_view(events_view());
            let err = config.validate(&store()).unwrap_err();
            assert!(err.to_string().contains("duplicate view"));
        }

        #[test]
        fn rejects_relative_route() {
            let mut config = ServerConfig::default();
            config.ics_route = "calendar/ics".to_string();
            assert!(config.validate(&store()).is_err());
        }
    }
}
