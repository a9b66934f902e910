//! Tracing setup for calexport.
//!
//! One subscriber configuration shared by the CLI and the HTTP server.
//! `RUST_LOG` takes precedence over the preset's level.
//!
//! ```ignore
//! use calexport_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::server())?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Log output format, selectable from the server config
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracingOutputFormat {
    /// Multi-line, for a terminal
    #[default]
    Pretty,
    /// Single-line
    Compact,
    /// JSON lines, for log collectors in front of the server
    Json,
}

/// Subscriber settings, built from one of the presets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level of calexport's own targets when `RUST_LOG` is unset
    pub level: Level,
    /// Output format
    pub format: TracingOutputFormat,
    /// Prefix compact lines with a timestamp
    pub timestamps: bool,
    /// Include file and line of the log call
    pub location: bool,
    /// Log one line when each HTTP request span closes, with its duration
    pub request_spans: bool,
}

impl TracingConfig {
    /// One-shot commands: warnings only, no timestamps
    #[must_use]
    pub fn cli() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            timestamps: false,
            location: false,
            request_spans: false,
        }
    }

    /// One-shot commands with `-v`
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            location: true,
            ..Self::cli()
        }
    }

    /// The long-running HTTP server
    #[must_use]
    pub fn server() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Json,
            timestamps: true,
            location: true,
            request_spans: true,
        }
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// Initialize tracing with the given configuration.
///
/// Call once, at the start of the process.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.level)));

    let span_events = if config.request_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_file(config.location)
        .with_line_number(config.location)
        .with_span_events(span_events);

    let layer = match (config.format, config.timestamps) {
        (TracingOutputFormat::Pretty, _) => layer.pretty().boxed(),
        (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
        (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
        (TracingOutputFormat::Json, _) => layer.json().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Filter directive applied when `RUST_LOG` is unset.
fn default_directive(level: Level) -> String {
    format!("calexport_core={level},calexport_server={level},calexport={level},tower_http={level}")
}
