use thiserror::Error;

/// Top-level error type for the `vnc-api` crate.
///
/// Covers every failure mode of the controller API surface:
/// authentication, transport, HTTP status mapping, and payload decoding.
/// `vnc-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token request or API call rejected (bad credentials, expired token).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// The addressed resource does not exist (HTTP 404).
    #[error("{resource_type} {identifier} not found")]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    /// The controller refused the write because of a conflicting object (HTTP 409).
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Any other non-success response from the API server.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}
