// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Model output (or a submitted report) that is not valid JSON once the
/// code fences are stripped.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ParseError {
    /// The cleaned text that failed to decode.
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// Failures while turning a report into a document.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(
        "Invalid report format. 'bales' section is missing. Please ensure the input contains bale data."
    )]
    InvalidReportFormat,

    #[error("Invalid JSON format: {0}")]
    InvalidJson(#[from] ParseError),

    #[error("malformed bales: {0}")]
    MalformedBales(String),

    #[error("'{key}' in {slot} is not a number")]
    NonNumericMeasurement {
        slot: &'static str,
        key: &'static str,
    },

    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ReportError::InvalidReportFormat | ReportError::InvalidJson(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Unexpected error: {self}"),
            ),
        };
        error!(status = %status, error = %message, "Report request failed");

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Failures talking to the completion service. These never escape a
/// request: the handler turns them into a message shown on the page.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion API error: {0}")]
    Api(String),

    #[error("Completion API returned an unreadable response ({status}): {body}")]
    Malformed { status: u16, body: String },

    #[error("Completion API key is not configured (set {0})")]
    MissingApiKey(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
