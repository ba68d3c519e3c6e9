//! Domain errors for the simsync client.

use thiserror::Error;

/// Uniform failure contract for every client operation.
///
/// All transport outcomes (network unreachable, 4xx, 5xx, undecodable
/// bodies) are normalized into [`ClientError::RequestFailed`] at the
/// transport boundary. Upper layers match on this one shape and never see
/// `reqwest` errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// A request/response exchange did not succeed.
    #[error("{message}")]
    RequestFailed {
        /// Human-readable message (server `detail`, else status text).
        message: String,
        /// HTTP status code when a response was received.
        status_code: Option<u16>,
    },

    /// A caller-side precondition failed before any request was sent.
    #[error("Validation rejected: {0}")]
    ValidationRejected(String),
}

/// Result alias used across the domain, repositories and services.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Build a `RequestFailed` from a received response.
    pub fn request_failed(message: impl Into<String>, status_code: u16) -> Self {
        Self::RequestFailed {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Build a `RequestFailed` for an exchange that produced no response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            message: message.into(),
            status_code: None,
        }
    }

    /// Build a `ValidationRejected`.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationRejected(message.into())
    }

    /// HTTP status code carried by the failure, if any.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status_code, .. } => *status_code,
            Self::ValidationRejected(_) => None,
        }
    }

    /// True when the server reported the resource as missing.
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status_code(), Some(404))
    }

    /// Returns true if this failure is likely to clear on its own.
    ///
    /// Transient failures include:
    /// - No response at all (connection refused, timeout)
    /// - 408 Request Timeout, 429 Too Many Requests
    /// - Any 5xx
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed { status_code, .. } => match status_code {
                None => true,
                Some(code) => *code == 408 || *code == 429 || (500..600).contains(code),
            },
            Self::ValidationRejected(_) => false,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::transport(format!("Failed to decode response body: {err}"))
    }
}
