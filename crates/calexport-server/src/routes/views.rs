//! Table view and links endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Html,
    routing::get,
};
use tracing::debug;

use calexport_core::{LinkTable, RenderedLinks, html_escape};

use crate::config::ViewConfig;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::RecordSource;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/views/{view}", get(view_table))
        .route("/links/{view}/{entity_id}", get(record_links))
}

/// Renders every record of a view as a table row with a links cell.
pub fn render_view(state: &AppState, view: &ViewConfig) -> LinkTable {
    let columns = view.columns();
    let mut table = LinkTable::new(columns.clone(), &view.links_header);
    if let Some(ref caption) = view.caption {
        table = table.with_caption(caption);
    }

    for record in state.records().list(&view.entity_type) {
        let cells = columns
            .iter()
            .map(|c| record.fields.get(c).cloned().unwrap_or_default())
            .collect();
        let links = state.links().build_links_for_record(&record, &view.links);
        table.push(cells, links);
    }

    debug!(view = %view.name, rows = table.rows.len(), "Rendered view");
    table
}

/// GET /views/{view} - HTML table of a view's records
async fn view_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, ApiError> {
    let view = state.view(&name)?;
    let table = render_view(&state, view);
    let title = html_escape(view.caption.as_deref().unwrap_or(&view.name));

    Ok(Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        table.render()
    )))
}

/// GET /links/{view}/{entity_id} - Calendar links of one record
async fn record_links(
    State(state): State<AppState>,
    Path((name, entity_id)): Path<(String, String)>,
) -> Result<Json<RenderedLinks>, ApiError> {
    let view = state.view(&name)?;
    let record = state.record(&view.entity_type, &entity_id)?;
    Ok(Json(
        state.links().build_links_for_record(&record, &view.links),
    ))
}
