use thiserror::Error;

/// Top-level error type for the `backdesk-api` crate.
///
/// Covers every failure mode of the adapter stack: transport, HTTP status,
/// response decoding, request validation, and the credential store.
/// `backdesk-core` routes status-bearing variants through the auth gate.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Network-level failure (connection refused, DNS failure, timeout).
    /// Carries no HTTP status.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL cannot be used for resource paths: {0}")]
    CannotBeABase(String),

    /// TLS configuration or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-2xx response from the API.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Request validation ──────────────────────────────────────────
    /// Page and page size must both be positive.
    #[error("Invalid pagination: page={page}, per_page={per_page} (both must be >= 1)")]
    InvalidPagination { page: u32, per_page: u32 },

    /// Unknown sort direction.
    #[error("Invalid sort order '{0}': expected 'asc' or 'desc'")]
    InvalidSortOrder(String),

    /// A credential cannot be sent as an HTTP header value.
    #[error("Invalid {header} header value: {reason}")]
    InvalidHeader { header: String, reason: String },

    // ── Credentials ─────────────────────────────────────────────────
    /// The backing credential store failed to read or write.
    #[error("Credential store error: {0}")]
    CredentialStore(String),
}

impl Error {
    /// HTTP status carried by this error, if any.
    ///
    /// Network failures and local errors return `None`.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for 401 / 403 responses.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` for network timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` when the server could not be reached at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }
}
