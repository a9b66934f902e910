//! Server error types.

use std::io;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use calexport_core::{DateParseError, OptionsError};

use crate::config::MissingFieldsStatus;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors raised while starting the server or running CLI commands.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error (listener, config file, output file, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration file could not be parsed.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Record file could not be parsed.
    #[error("failed to parse records {path}: {source}")]
    RecordsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Command output could not be serialized.
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Link options of a view are invalid.
    #[error("view {view:?}: {source}")]
    ViewOptions {
        view: String,
        #[source]
        source: OptionsError,
    },

    /// A CLI request could not be served.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a view options error.
    pub fn view_options(view: impl Into<String>, source: OptionsError) -> Self {
        Self::ViewOptions {
            view: view.into(),
            source,
        }
    }
}

/// Errors answered to HTTP clients.
///
/// Every variant is terminal for the request; nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The record or view does not exist.
    #[error("{0}")]
    NotFound(String),

    /// `start` or `end` was not supplied, answered with the configured status.
    #[error("Start and end date fields are required")]
    MissingDateFields(MissingFieldsStatus),

    /// A date field could not be read.
    #[error(transparent)]
    DateParse(#[from] DateParseError),
}

impl ApiError {
    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingDateFields(MissingFieldsStatus::NotFound) => StatusCode::NOT_FOUND,
            Self::MissingDateFields(MissingFieldsStatus::BadRequest) => StatusCode::BAD_REQUEST,
            Self::DateParse(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::DateParse(err) => warn!(error = %err, "Rejecting export"),
            _ => debug!(status = %status, error = %self, "Request failed"),
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_status_follows_config() {
        assert_eq!(
            ApiError::MissingDateFields(MissingFieldsStatus::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::MissingDateFields(MissingFieldsStatus::BadRequest).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn date_errors_are_unprocessable() {
        let err: ApiError = DateParseError::new("soon").into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "unparseable date: \"soon\"");
    }

    #[test]
    fn config_error_message() {
        let err = ServerError::config("bad route");
        assert_eq!(err.to_string(), "Configuration error: bad route");
    }

    #[test]
    fn view_options_error_names_view() {
        let err = ServerError::view_options(
            "events",
            OptionsError::MissingField {
                option: "start_field",
            },
        );
        assert!(err.to_string().starts_with("view \"events\":"));
    }
}
