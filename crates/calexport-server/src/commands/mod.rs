//! Subcommand implementations.

pub mod config;
pub mod export;
pub mod serve;

use std::path::Path;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::store::RecordStore;

/// Loads the configuration from `path`, or from the default location.
///
/// A missing default file yields the defaults; an explicit path must exist.
pub fn load_config(path: Option<&Path>) -> ServerResult<ServerConfig> {
    match path {
        Some(path) => ServerConfig::load_from(path),
        None => ServerConfig::load(),
    }
}

/// Loads the record store and checks the configuration against it.
pub fn open_store(config: &ServerConfig) -> ServerResult<RecordStore> {
    let store = RecordStore::load(&config.records_path)?;
    config.validate(&store)?;
    Ok(store)
}
