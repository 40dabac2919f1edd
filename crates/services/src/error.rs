//! Shared error types for the services crate.

use thiserror::Error;

use mathiter_core::session::ProtocolError;
use mathiter_core::{LegacyError, SessionError};

/// Errors emitted by the HTTP API client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors emitted while reading `ApiConfig` from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API base url {raw:?}: {source}")]
    InvalidBaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base url {0:?} cannot carry paths")]
    NotABase(String),
    #[error("{var} must be a positive integer, got {raw:?}")]
    InvalidNumber { var: &'static str, raw: String },
}

/// Errors surfaced by the controllers to the render layer.
///
/// Every variant leaves the controller in its last stable phase, so the UI
/// can show the message and carry on.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Legacy(#[from] LegacyError),
}

impl ClientError {
    /// Fetch failures, non-2xx replies, and replies that break the protocol.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::Session(SessionError::Protocol(_))
        )
    }

    /// The operation was called in the wrong phase.
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        match self {
            ClientError::Session(err) => err.is_invalid_state(),
            ClientError::Legacy(err) => err.is_invalid_state(),
            ClientError::Network(_) => false,
        }
    }

    #[must_use]
    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            ClientError::Session(SessionError::Protocol(err)) => Some(err),
            _ => None,
        }
    }
}
