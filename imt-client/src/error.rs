//! Error types for the query client.

use imt_core::LookupError;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid lookup: {0}")]
    Lookup(#[from] LookupError),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiClientError {
    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiClientError::Status { status, .. } => Some(*status),
            ApiClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Build a status error from a non-success response body.
    ///
    /// Structured bodies contribute their `code` and `message`; anything else
    /// is reported verbatim.
    pub fn from_body(status: u16, text: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(text) {
            Ok(body) if !body.message.is_empty() => match body.code {
                Some(code) => format!("{}: {}", code, body.message),
                None => body.message,
            },
            _ => format!("HTTP {}: {}", status, text),
        };
        ApiClientError::Status { status, message }
    }
}

/// Error body sent by the backend on rejected requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}
