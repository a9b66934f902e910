//! HTTP host, record store and CLI for calendar exports
//!
//! This crate provides the `calexport` binary: an axum server exposing the
//! ICS download endpoint and link table views, plus one-shot commands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod routes;
pub mod state;
pub mod store;

pub use cli::Cli;
pub use config::{MissingFieldsStatus, ServerConfig, ViewConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use export::{FieldSelection, IcsExport, export_record};
pub use routes::router;
pub use state::AppState;
pub use store::{RecordSource, RecordStore};
