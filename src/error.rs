//! Error types for the transport, probe, and controller layers.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures surface as [`ApiError`]. The controller classifies them
//! into an [`AuthError`] (kind + message + optional HTTP status) which is both
//! the value returned to the caller and the `last_error` stored in
//! [`crate::state::AuthState`]. Route guards only ever see a boolean.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::fmt;

use serde::Serialize;

/// Error returned by a [`crate::net::api::SessionApi`] call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    /// The response could not be read or decoded.
    #[error("malformed response: {0}")]
    Decode(String),
    /// A header value could not be constructed or forwarded.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_body() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status { status: status.as_u16(), message: err.to_string() }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<axum::http::header::InvalidHeaderValue> for ApiError {
    fn from(err: axum::http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

// =============================================================================
// ERROR KIND
// =============================================================================

/// Coarse category of an auth failure, exposed to UI code via `last_error`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport or connectivity failure.
    Network,
    /// Explicit rejection by the server (any 4xx).
    Unauthorized,
    /// 5xx, unexpected status, or malformed response.
    Server,
}

impl ErrorKind {
    /// Classify a transport error.
    #[must_use]
    pub fn classify(err: &ApiError) -> Self {
        match err {
            ApiError::Network(_) => Self::Network,
            ApiError::Status { status, .. } if (400..500).contains(status) => Self::Unauthorized,
            ApiError::Status { .. } | ApiError::Decode(_) | ApiError::InvalidHeader(_) => Self::Server,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::Unauthorized => "unauthorized",
            Self::Server => "server",
        };
        f.write_str(label)
    }
}

// =============================================================================
// AUTH ERROR
// =============================================================================

/// Tagged failure from the last failed auth operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct AuthError {
    pub kind: ErrorKind,
    pub message: String,
    pub http_status: Option<u16>,
}

/// Name used for the `last_error` payload in state snapshots.
pub type ErrorInfo = AuthError;

impl AuthError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>, http_status: Option<u16>) -> Self {
        Self { kind, message: message.into(), http_status }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        let kind = ErrorKind::classify(&err);
        let http_status = err.http_status();
        let message = match err {
            ApiError::Status { message, .. } => message,
            other => other.to_string(),
        };
        Self { kind, message, http_status }
    }
}

// =============================================================================
// PROBE ERROR
// =============================================================================

/// Failure of a session probe. Callers only care that it failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("session probe failed: {message}")]
pub struct ProbeError {
    pub http_status: Option<u16>,
    pub message: String,
}

impl From<ApiError> for ProbeError {
    fn from(err: ApiError) -> Self {
        Self { http_status: err.http_status(), message: err.to_string() }
    }
}

/// Message used when a non-success response carries no body text.
pub(crate) fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("unknown status").to_owned()
    } else {
        body.to_owned()
    }
}
