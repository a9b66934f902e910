//! One-shot export commands.

use std::path::{Path, PathBuf};

use tracing::info;

use calexport_core::{CalendarLinkBuilder, IcsFormatter, RecordResolver};

use crate::config::ServerConfig;
use crate::error::{ApiError, ServerError, ServerResult};
use crate::export::{FieldSelection, export_record};

/// Writes one record as ICS to `output`, or stdout.
///
/// When `output` is a directory the sanitized filename is appended.
pub fn ics(
    config: &ServerConfig,
    entity_type: &str,
    entity_id: &str,
    selection: &FieldSelection,
    output: Option<&Path>,
) -> ServerResult<()> {
    let store = super::open_store(config)?;
    let record = store.get(entity_type, entity_id).ok_or_else(|| {
        ApiError::not_found(format!("Record not found: {entity_type}/{entity_id}"))
    })?;

    let formatter = IcsFormatter::new(&config.product_id, config.date_fallback);
    let export = export_record(&formatter, &record, selection).map_err(ApiError::from)?;

    match output {
        Some(path) => {
            let path = output_path(path, &export.filename);
            std::fs::write(&path, &export.body)?;
            info!(path = %path.display(), "Wrote ICS file");
            println!("{}", path.display());
        }
        None => println!("{}", export.body),
    }
    Ok(())
}

/// Prints the calendar links of one record of a view as JSON.
pub fn links(config: &ServerConfig, view: &str, entity_id: &str) -> ServerResult<()> {
    let view = config
        .view(view)
        .ok_or_else(|| ServerError::config(format!("unknown view {view:?}")))?;
    let store = super::open_store(config)?;
    let record = store.get(&view.entity_type, entity_id).ok_or_else(|| {
        ApiError::not_found(format!(
            "Record not found: {}/{entity_id}",
            view.entity_type
        ))
    })?;

    let builder = CalendarLinkBuilder::new(&config.ics_route, config.date_fallback);
    let links = builder.build_links_for_record(&record, &view.links);
    println!("{}", serde_json::to_string_pretty(&links)?);
    Ok(())
}

fn output_path(path: &Path, filename: &str) -> PathBuf {
    if path.is_dir() {
        path.join(filename)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calexport_core::DateFallback;

    fn setup() -> (tempfile::TempDir, ServerConfig) {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("records.json");
        std::fs::write(
            &records,
            r#"[{"entity_type":"node","id":"1","uuid":"u-1","label":"Team Sync",
                "fields":{"field_date":"2024-06-01 10:00","field_date_end":"2024-06-01 11:00"}}]"#,
        )
        .unwrap();
        let config = ServerConfig::default().with_records_path(records);
        (dir, config)
    }

    #[test]
    fn writes_into_directory_with_sanitized_name() {
        let (dir, config) = setup();
        let selection = FieldSelection::new("field_date", "field_date_end");

        ics(&config, "node", "1", &selection, Some(dir.path())).unwrap();

        let body = std::fs::read_to_string(dir.path().join("Team_Sync.ics")).unwrap();
        assert!(body.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(body.contains("DTSTART:20240601T100000Z\r\n"));
    }

    #[test]
    fn writes_to_explicit_file() {
        let (dir, config) = setup();
        let path = dir.path().join("out.ics");
        let selection = FieldSelection::new("field_date", "field_date_end");

        ics(&config, "node", "1", &selection, Some(&path)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unknown_record_is_not_found() {
        let (dir, config) = setup();
        let selection = FieldSelection::new("field_date", "field_date_end");

        let err = ics(&config, "node", "9", &selection, Some(dir.path())).unwrap_err();
        assert!(matches!(err, ServerError::Api(ApiError::NotFound(_))));
    }

    #[test]
    fn bad_date_is_an_error_unless_epoch() {
        let (dir, config) = setup();
        let selection = FieldSelection::new("field_missing", "field_date_end");

        let err = ics(&config, "node", "1", &selection, Some(dir.path())).unwrap_err();
        assert!(matches!(err, ServerError::Api(ApiError::DateParse(_))));

        let config = config.with_date_fallback(DateFallback::Epoch);
        ics(&config, "node", "1", &selection, Some(dir.path())).unwrap();
    }

    #[test]
    fn links_for_unknown_view_fail() {
        let (_dir, config) = setup();
        assert!(links(&config, "events", "1").is_err());
    }
}
