//! Error types for the Readeck client and the preferences store.
//!
//! # Design
//! `Server` covers every non-2xx response on the common path. Login gets its
//! own `Authentication` variant so callers can route a bad password
//! differently from a broken server. `ProtocolViolation` marks a 2xx response
//! that still breaks the documented contract, such as a missing
//! `Bookmark-Id` header.

use thiserror::Error;

/// Errors returned by `ReadeckClient` parse methods and `ReadeckApi` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (DNS, connect, TLS, reset...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The request did not complete within the client's timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The server answered with a non-2xx status.
    #[error("API error: {status} - {message}")]
    Server { status: u16, message: String },

    /// Login was rejected.
    #[error("authentication failed: {status} - {message}")]
    Authentication { status: u16, message: String },

    /// A 2xx status other than the single one the endpoint accepts.
    #[error("unexpected status {status}, expected {expected}")]
    UnexpectedStatus { expected: u16, status: u16 },

    /// The response was successful but lacks something the API promises.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. }
            | ApiError::Authentication { status, .. }
            | ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by the preferences store.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// A required key is absent. Carries the storage key name.
    #[error("preferences not set: `{0}` is missing, configure the server URL and API token")]
    ConfigurationMissing(&'static str),

    /// The underlying key-value store failed.
    #[error("preference storage failed: {0}")]
    Storage(String),
}
