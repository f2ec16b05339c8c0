//! Error taxonomy shared by the remote query functions and the fetch
//! controller.
//!
//! Every remote call surfaces a [`FetchError`].  The variants are plain data
//! (no boxed sources) so the controller can keep the last error in its
//! published state and hand out clones to every renderer.

use thiserror::Error;

/// A failure from any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("request failed: {status} {status_text}")]
    Http {
        /// Numeric HTTP status, e.g. `404`.
        status: u16,
        /// Canonical reason phrase, e.g. `Not Found`.
        status_text: String,
    },

    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but its body could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Anything else.
    #[error("{0}")]
    Unknown(String),
}

impl FetchError {
    /// Build an [`FetchError::Http`] from a response status.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Self::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    /// The preserved HTTP status, if this error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::from_status(status)
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            Self::Transport(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unknown(format!("{err:#}"))
    }
}

/// Shorthand used by the catalog and analytics modules.
pub type Result<T> = std::result::Result<T, FetchError>;
