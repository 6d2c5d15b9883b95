//! Error types for the gold price API client.
//!
//! # Design
//! The client does not classify server failures beyond "the status was not
//! 2xx": the raw status and body travel to the caller untouched. Transport
//! failures keep the underlying error text and flag timeouts, since that is
//! the one distinction a caller can act on.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by `GoldClient` and `GoldApi`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL or an interpolated path could not form a valid URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The client configuration was rejected before any request was built.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request never produced a response (connect failure, timeout,
    /// broken body stream).
    #[error("transport failure: {message}")]
    Transport { message: String, timeout: bool },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport { timeout: true, .. })
    }

    /// The server answered, but with a non-2xx status.
    pub fn is_status(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }

    /// Status code of a server-reported failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport {
            timeout: err.is_timeout(),
            message: err.to_string(),
        }
    }
}
