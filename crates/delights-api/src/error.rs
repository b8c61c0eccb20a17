use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`ServiceError`], used by callers to decide
/// how to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed query or form data; the user can correct it.
    BadRequest,
    /// Session missing, invalid or expired.
    Unauthorized,
    /// Endpoint missing or down.
    ServiceUnavailable,
    /// Response shape violates the service contract.
    InvalidFormat,
    /// Transport-level timeout.
    Timeout,
    /// Anything else.
    Unknown,
}

/// Errors returned by the restaurant service client.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP 400, or input rejected before any request was sent (`status: None`).
    #[error("bad request: {message}")]
    BadRequest {
        status: Option<u16>,
        message: String,
    },

    /// HTTP 401 or 403.
    #[error("unauthorized (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// HTTP 404.
    #[error("service unavailable at {url}: {message}")]
    ServiceUnavailable { url: String, message: String },

    /// The body was not JSON, or not the shape the endpoint promises.
    #[error("invalid response format for {context}: {reason}")]
    InvalidFormat { context: String, reason: String },

    #[error("request timed out: {context}")]
    Timeout { context: String },

    /// Any other HTTP status or transport failure.
    #[error("{message}")]
    Unknown {
        status: Option<u16>,
        message: String,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Failure building the underlying `reqwest` client or request.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl ServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::BadRequest { .. } => ErrorKind::BadRequest,
            ServiceError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ServiceError::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            ServiceError::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            ServiceError::Timeout { .. } => ErrorKind::Timeout,
            ServiceError::Unknown { .. }
            | ServiceError::InvalidBaseUrl { .. }
            | ServiceError::Client(_) => ErrorKind::Unknown,
        }
    }

    /// HTTP status that produced this error, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::BadRequest { status, .. } | ServiceError::Unknown { status, .. } => {
                *status
            }
            ServiceError::Unauthorized { status, .. } => Some(*status),
            ServiceError::ServiceUnavailable { .. } => Some(404),
            ServiceError::InvalidFormat { .. }
            | ServiceError::Timeout { .. }
            | ServiceError::InvalidBaseUrl { .. }
            | ServiceError::Client(_) => None,
        }
    }

    /// Text suitable for a one-line user notification.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            ServiceError::BadRequest { message, .. }
            | ServiceError::Unauthorized { message, .. }
            | ServiceError::ServiceUnavailable { message, .. }
            | ServiceError::Unknown { message, .. } => message.clone(),
            ServiceError::InvalidFormat { .. } => "Invalid response data format".to_string(),
            ServiceError::Timeout { .. } => "Request timed out. Please try again.".to_string(),
            ServiceError::InvalidBaseUrl { .. } | ServiceError::Client(_) => {
                "Failed to fetch restaurants".to_string()
            }
        }
    }
}

/// Errors reading or writing the persisted session file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session file at {} is not a valid JSON object: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
