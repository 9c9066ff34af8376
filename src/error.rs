//! Error types for the URL Scanner client.
//!
//! Every failure surfaced by the clients is an [`Error`]. Callers that need to
//! branch on the failure class should match on [`Error::kind`] rather than on
//! the rendered message.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the URL Scanner API.
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials or client settings are missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Local input was rejected, or the service answered with a 4xx other
    /// than an authentication or not-found status.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the input
        message: String,
        /// HTTP status when the service rejected the request
        status: Option<u16>,
        /// Raw response body when the service rejected the request
        body: Option<String>,
    },

    /// The service rejected the credentials (401 or 403).
    #[error("authentication failed: status {status}, {body}")]
    Authentication {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The requested scan does not exist (404).
    #[error("not found: {body}")]
    NotFound {
        /// Raw response body
        body: String,
    },

    /// The service failed (5xx) or reported an unsuccessful envelope.
    #[error("remote service error: status {status}, {body}")]
    RemoteService {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A bounded wait ran out of budget while the scan was still pending.
    #[error("scan {uuid} still pending after {elapsed:?} ({attempts} attempts)")]
    Timeout {
        /// Scan being waited on
        uuid: String,
        /// Time spent waiting
        elapsed: Duration,
        /// Number of status requests issued
        attempts: u32,
    },

    /// Connection-level failure below HTTP (DNS, TLS, socket timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A successful response whose body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    InvalidArgument,
    Authentication,
    NotFound,
    RemoteService,
    Timeout,
    Network,
    Decode,
}

impl Error {
    /// Maps a non-2xx HTTP status and its body to the matching error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Error::Authentication { status, body },
            404 => Error::NotFound { body },
            400..=499 => Error::InvalidArgument {
                message: format!("request rejected with status {}", status),
                status: Some(status),
                body: Some(body),
            },
            _ => Error::RemoteService { status, body },
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::RemoteService { .. } => ErrorKind::RemoteService,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Network(_) => ErrorKind::Network,
            Error::Decode(_) => ErrorKind::Decode,
        }
    }

    /// HTTP status code, when the error came from a service response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. } | Error::RemoteService { status, .. } => {
                Some(*status)
            }
            Error::NotFound { .. } => Some(404),
            Error::InvalidArgument { status, .. } => *status,
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body, when the error came from a service response.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Authentication { body, .. }
            | Error::RemoteService { body, .. }
            | Error::NotFound { body } => Some(body.as_str()),
            Error::InvalidArgument { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
