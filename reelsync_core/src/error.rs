//! Error types for the reelsync core library
//!
//! Errors are categorized into three main types:
//! - Backend errors: structured failures returned by the remote API
//! - Precondition errors: required parameters missing before a request
//! - Internal errors: cache, serialization and channel failures

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the reelsync core library
#[derive(Error, Debug)]
pub enum Error {
    /// Structured error returned by the backend
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A required parameter was missing before the request was made
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Internal library errors (cache, serialization, channels)
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Structured error returned by the remote API
///
/// Carries the HTTP-ish status, an optional machine-readable code and a
/// human-readable message. The message is what the mutation layer shows
/// to users when present.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("backend error {status}: {message}")]
pub struct BackendError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl BackendError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Rate-limit responses get flow-specific messaging in the auth module
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// A query function was invoked without its required parameters
///
/// Enablement gating should prevent these from firing in practice; seeing
/// one at runtime indicates a wiring bug in the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("missing required parameter: {name}")]
    MissingParameter { name: String },

    #[error("query string is empty")]
    EmptyQuery,

    #[error("query is disabled")]
    Disabled,
}

impl PreconditionError {
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }
}

/// Internal library errors
#[derive(Error, Debug)]
pub enum InternalError {
    #[error("cache error: {message}")]
    Cache { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("realtime patch could not be applied: {reason}")]
    PatchFailed { reason: String },

    #[error("realtime channel error: {message}")]
    Channel { message: String },

    #[error("mutation failed: {message}")]
    Mutation { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl InternalError {
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn patch_failed(reason: impl Into<String>) -> Self {
        Self::PatchFailed {
            reason: reason.into(),
        }
    }

    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }

    pub fn mutation(message: impl Into<String>) -> Self {
        Self::Mutation {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Internal(InternalError::Serialization(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_backend_error_display() {
        let error = Error::Backend(BackendError::new(404, "playlist not found"));
        let display = error.to_string();

        assert!(display.contains("404"));
        assert!(display.contains("playlist not found"));
    }

    #[test]
    fn test_backend_error_code() {
        let error = BackendError::new(429, "Too many requests").with_code("over_request_rate_limit");

        assert!(error.is_rate_limited());
        assert_eq!(error.code.as_deref(), Some("over_request_rate_limit"));
    }

    #[test]
    fn test_precondition_error_display() {
        let error = Error::Precondition(PreconditionError::missing("playlist_id"));

        assert!(error.to_string().contains("playlist_id"));

        let error = Error::Precondition(PreconditionError::EmptyQuery);
        assert!(error.to_string().contains("empty"));
    }

    #[test]
    fn test_internal_patch_failed() {
        let error = Error::Internal(InternalError::patch_failed("item 42 not in collection"));

        assert!(matches!(
            error,
            Error::Internal(InternalError::PatchFailed { .. })
        ));
        assert!(error.to_string().contains("item 42"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let bad = serde_json::from_str::<u32>("not a number").unwrap_err();
        let error: Error = bad.into();

        assert!(matches!(
            error,
            Error::Internal(InternalError::Serialization(_))
        ));
    }

    #[test]
    fn test_backend_error_is_serializable() {
        let error = BackendError::new(401, "invalid credentials");
        let json = serde_json::to_string(&error).unwrap();
        let back: BackendError = serde_json::from_str(&json).unwrap();

        assert_eq!(back, error);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_source_chain() {
        let bad = serde_json::from_str::<u32>("{").unwrap_err();
        let error = Error::Internal(InternalError::Serialization(bad));

        assert!(error.source().is_some());
    }
}
