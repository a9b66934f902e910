use std::sync::Arc;

use calexport_core::{CalendarLinkBuilder, IcsFormatter, Record, RecordResolver};

use crate::config::{ServerConfig, ViewConfig};
use crate::error::ApiError;
use crate::store::RecordSource;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    records: Arc<dyn RecordSource>,
    formatter: IcsFormatter,
    links: CalendarLinkBuilder,
}

impl AppState {
    /// Builds the state from a validated configuration and a record source.
    pub fn new(config: ServerConfig, records: Arc<dyn RecordSource>) -> Self {
        let formatter = IcsFormatter::new(&config.product_id, config.date_fallback);
        let links = CalendarLinkBuilder::new(&config.ics_route, config.date_fallback);
        Self {
            config: Arc::new(config),
            records,
            formatter,
            links,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn records(&self) -> &dyn RecordSource {
        self.records.as_ref()
    }

    pub fn formatter(&self) -> &IcsFormatter {
        &self.formatter
    }

    pub fn links(&self) -> &CalendarLinkBuilder {
        &self.links
    }

    /// Returns the named view, or a not found error.
    pub fn view(&self, name: &str) -> Result<&ViewConfig, ApiError> {
        self.config
            .view(name)
            .ok_or_else(|| ApiError::not_found(format!("View not found: {name}")))
    }

    /// Returns the addressed record, or a not found error.
    pub fn record(&self, entity_type: &str, id: &str) -> Result<Record, ApiError> {
        self.records
            .get(entity_type, id)
            .ok_or_else(|| ApiError::not_found(format!("Record not found: {entity_type}/{id}")))
    }
}
