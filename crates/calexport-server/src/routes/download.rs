//! ICS download endpoint

use axum::{
    Router,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tracing::info;

use calexport_core::ICS_CONTENT_TYPE;

use crate::error::ApiError;
use crate::export::{FieldSelection, export_record};
use crate::state::AppState;

pub fn router(ics_route: &str) -> Router<AppState> {
    Router::new().route(&format!("{ics_route}/{{entity_type}}/{{entity_id}}"), get(download))
}

/// Field names selecting the record values to export
#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl DownloadQuery {
    /// Returns the selection, or `None` when a date field name is missing.
    fn selection(self) -> Option<FieldSelection> {
        let start = self.start.filter(|s| !s.is_empty())?;
        let end = self.end.filter(|e| !e.is_empty())?;
        Some(
            FieldSelection::new(start, end)
                .with_location(self.location)
                .with_description(self.description),
        )
    }
}

/// GET {ics_route}/{entity_type}/{entity_id} - Download one record as ICS
async fn download(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.record(&entity_type, &entity_id)?;
    let selection = query
        .selection()
        .ok_or(ApiError::MissingDateFields(state.config().missing_fields_status))?;

    let export = export_record(state.formatter(), &record, &selection)?;
    info!(
        entity_type = %entity_type,
        entity_id = %entity_id,
        filename = %export.filename,
        "Serving ICS download"
    );

    Ok((
        [
            (header::CONTENT_TYPE, ICS_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, export.content_disposition()),
        ],
        export.body,
    ))
}
