use thiserror::Error;

use crate::marketplace::OrderError;

/// Top-level error type for the `rappi-api` crate.
///
/// Covers every failure mode of both integrations: login, transport,
/// business-level rejections from the marketplace, and unexpected statuses.
/// The client never retries on its own; callers branch on these variants to
/// decide whether to retry, re-prompt, or give up.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The credential (seed token or bearer) was rejected with HTTP 401.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Login succeeded but the response did not carry a usable credential.
    #[error("No credential received from {source_name}")]
    MissingCredential { source_name: String },

    // ── Business errors ─────────────────────────────────────────────
    /// HTTP 400 with a structured order-error payload (e.g. order already taken).
    #[error("Bad request ({}): {}", .0.error_code, .0.message)]
    BadRequest(OrderError),

    /// Any other non-2xx status.
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A path or path segment that cannot be placed under the base URL.
    #[error("Invalid URL path: {0}")]
    InvalidPath(String),

    /// A credential or header name could not be encoded as an HTTP header.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// TLS setup or client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the credential was rejected and a fresh login
    /// might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` for the "unreachable" class: the remote could not be
    /// reached, or answered with something that could not be understood.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Deserialization { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// The HTTP status behind this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::BadRequest(_) => Some(400),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The structured order error carried by a `BadRequest`.
    pub fn order_error(&self) -> Option<&OrderError> {
        match self {
            Self::BadRequest(err) => Some(err),
            _ => None,
        }
    }
}
