//! Error taxonomy for the client.
//!
//! Five disjoint classes, matching how callers need to react:
//! server-side rejections ([`Error::Remote`]), I/O and decode failures
//! ([`Error::Transport`]), synchronous-wait deadlines
//! ([`Error::Timeout`]), lifecycle misuse ([`Error::NotInitialized`])
//! and locally rejected arguments ([`Error::Validation`]).

use std::time::Duration;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The server rejected the call inside the response envelope or with
    /// a non-200 reply. `code` is absent when the failure body was not
    /// parseable.
    #[error("server error: {message}")]
    Remote {
        code: Option<String>,
        message: String,
    },

    /// I/O-level failure: connection refused, request timed out on the
    /// wire, malformed or non-JSON response body. Never triggers token
    /// renewal.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// A synchronous `ask` did not complete within the configured
    /// request timeout.
    #[error("request timeout: {timeout:?}")]
    Timeout { timeout: Duration },

    /// Operation invoked on a closed client.
    #[error("client is not initialized")]
    NotInitialized,

    /// A required argument was empty or missing; detected locally,
    /// before any network call.
    #[error("parameter cannot be null or empty: '{param}'")]
    Validation { param: &'static str },

    /// A synchronous wait was abandoned because the client shut down
    /// while the caller was blocked on a result.
    #[error("result wait interrupted")]
    Interrupted,
}

impl Error {
    pub(crate) fn remote(code: Option<String>, message: impl Into<String>) -> Self {
        Error::Remote {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
        }
    }

    /// Server error code, if this is a [`Error::Remote`] carrying one.
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            Error::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether this is a synchronous-wait timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Transport {
            message: format!("malformed response body: {e}"),
        }
    }
}
