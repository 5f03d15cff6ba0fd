//! Unified error types for campus.
//!
//! [`QueryError`] is the failure half of a [`crate::FetchOutcome`]; it is
//! `Clone` so a single pending fetch can hand the same failure to every
//! caller waiting on it. [`Error`] covers everything that goes wrong before
//! a request is issued.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured failure kind carried on a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// 401 with the `raise` policy.
    Unauthorized,
    /// 403 after the alternate candidate was exhausted.
    Forbidden,
    /// 404 after the raw-path fallback was exhausted.
    NotFound,
    /// Any other non-2xx status.
    Http,
    /// Transport-level failure (DNS, connect, reset).
    Network,
    /// Success status but the body was not the expected JSON.
    Decode,
}

impl ErrorKind {
    /// Stable code used in messages and logs.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Http => "HTTP_ERROR",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Decode => "DECODE_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure half of a fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
pub struct QueryError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl QueryError {
    pub fn new(kind: ErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self { kind, status, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, Some(401), message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, Some(403), message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, Some(404), message)
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Http, Some(status), message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, None, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, None, message)
    }

    /// Map a final HTTP status onto the taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => Self::unauthorized(message),
            403 => Self::forbidden(message),
            404 => Self::not_found(message),
            _ => Self::http(status, message),
        }
    }
}

/// Unified error types for campus.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Resource key with no usable path segments.
    #[error("INVALID_KEY: {0}")]
    InvalidKey(String),

    /// Base URL or candidate URL could not be built.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be constructed.
    #[error("CLIENT_BUILD: {0}")]
    ClientBuild(String),

    /// A query reached the network and failed.
    #[error(transparent)]
    Query(#[from] QueryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_display_with_status() {
        let err = QueryError::forbidden("Forbidden");
        assert_eq!(err.to_string(), "FORBIDDEN (403): Forbidden");
    }

    #[test]
    fn test_query_error_display_without_status() {
        let err = QueryError::network("connection refused");
        assert_eq!(err.to_string(), "NETWORK_ERROR: connection refused");
    }

    #[test]
    fn test_from_status_mapping() {
        assert_eq!(QueryError::from_status(401, "").kind, ErrorKind::Unauthorized);
        assert_eq!(QueryError::from_status(403, "").kind, ErrorKind::Forbidden);
        assert_eq!(QueryError::from_status(404, "").kind, ErrorKind::NotFound);

        let err = QueryError::from_status(503, "Service Unavailable");
        assert_eq!(err.kind, ErrorKind::Http);
        assert_eq!(err.status, Some(503));
    }

    #[test]
    fn test_error_wraps_query_error() {
        let err: Error = QueryError::not_found("missing").into();
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(matches!(err, Error::Query(QueryError { kind: ErrorKind::NotFound, .. })));
    }

    #[test]
    fn test_invalid_key_display() {
        let err = Error::InvalidKey("empty".to_string());
        assert!(err.to_string().contains("INVALID_KEY"));
    }
}
