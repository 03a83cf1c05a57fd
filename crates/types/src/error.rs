//! Classified error taxonomy for the scribe workspace.

use std::fmt;
use thiserror::Error;

/// Fallback message for a business failure whose envelope carries no description.
pub const GENERIC_BUSINESS_MESSAGE: &str = "business error";

/// Message surfaced to the user when the session cannot be recovered.
pub const SESSION_EXPIRED_MESSAGE: &str = "session expired, please log in again";

/// Coarse tag shared by every [`ApiError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Envelope-level failure on a 2xx transport status.
    Business,
    /// Transport status 401; recoverable through a credential refresh.
    Authentication,
    /// Any other non-2xx status, network failure, or undecodable body.
    Transport,
    /// The credential refresh failed; terminal for the session.
    Refresh,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Business => "business",
            Self::Authentication => "authentication",
            Self::Transport => "transport",
            Self::Refresh => "refresh",
        };
        f.write_str(s)
    }
}

/// Why a credential refresh did not produce a new access token.
///
/// Cloneable so a single failure can be handed verbatim to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// The credential store holds no refresh token.
    #[error("no refresh token")]
    NoRefreshToken,

    /// The refresh endpoint answered with a non-zero envelope code.
    #[error("refresh rejected (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// The refresh call failed at the network level or returned a non-2xx status.
    #[error("refresh request failed: {0}")]
    Transport(String),

    /// The refresh response could not be decoded.
    #[error("malformed refresh response: {0}")]
    Malformed(String),

    /// The in-flight refresh ended without reporting a result.
    #[error("refresh interrupted")]
    Interrupted,
}

/// Failure reported by a [`crate::Transport`] before any response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS, or protocol failure.
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built (bad URL, header, …).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_builder() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// The classified outcome of a failed API call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// `errorCode != 0` on a 2xx response.
    #[error("{message}")]
    Business { code: i64, message: String },

    /// The server rejected the access credential (HTTP 401).
    #[error("{message}")]
    Authentication { status: u16, message: String },

    /// Non-2xx status other than 401, network failure, or malformed envelope.
    #[error("{message}")]
    Transport { status: Option<u16>, message: String },

    /// Refresh failed after an authentication error; the session is gone.
    #[error("session expired: {0}")]
    Refresh(#[from] RefreshError),

    /// Request data could not be encoded, or the `data` of a successful
    /// envelope did not match the expected shape.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<TransportFailure> for ApiError {
    fn from(e: TransportFailure) -> Self {
        Self::Transport {
            status: None,
            message: e.to_string(),
        }
    }
}

impl ApiError {
    /// Returns the kind tag of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Business { .. } => ErrorKind::Business,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Transport { .. } | Self::Serialization(_) => ErrorKind::Transport,
            Self::Refresh(_) => ErrorKind::Refresh,
        }
    }

    /// Numeric code: the business code, the HTTP status, or `0` when neither exists.
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            Self::Business { code, .. } => *code,
            Self::Authentication { status, .. } => i64::from(*status),
            Self::Transport { status, .. } => status.map_or(0, i64::from),
            Self::Refresh(_) => 401,
            Self::Serialization(_) => 0,
        }
    }

    /// Message suitable for display through a [`crate::Notifier`].
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Business { message, .. }
            | Self::Authentication { message, .. }
            | Self::Transport { message, .. } => message.clone(),
            Self::Refresh(_) => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Serialization(_) => self.to_string(),
        }
    }

    /// Returns `true` when the error ends the authenticated session.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Refresh(_))
    }
}
