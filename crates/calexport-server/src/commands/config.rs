//! Configuration commands.

use tracing::warn;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::store::RecordSource;

/// Validates the configuration against the records it serves.
pub fn check(config: &ServerConfig) -> ServerResult<()> {
    let store = super::open_store(config)?;

    println!("records: {} ({})", store.len(), config.records_path.display());
    for view in &config.views {
        let rows = store.list(&view.entity_type).len();
        if rows == 0 {
            warn!(view = %view.name, entity_type = %view.entity_type, "View has no records");
        }
        println!("view {}: {} {} record(s)", view.name, rows, view.entity_type);
    }
    println!("Configuration is valid.");
    Ok(())
}
