// ── Core error types ──
//
// User-facing errors from backdesk-core. The `From<backdesk_api::Error>`
// impl translates transport-layer errors into domain variants; 401/403
// never reach it because the session routes them through the auth gate.

use thiserror::Error;

/// Outcome of an auth gate check that did not pass.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No credential supplied")]
    MissingCredential,

    #[error("Not authenticated: run `backdesk login` first")]
    NotAuthenticated,

    #[error("Credential rejected by the API (HTTP {status}); stored key cleared")]
    Unauthorized { status: u16 },

    #[error("Credential store error: {0}")]
    Store(#[source] backdesk_api::Error),
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to the API timed out")]
    Timeout,

    // ── Auth errors ──────────────────────────────────────────────────
    #[error(transparent)]
    Auth(#[from] AuthError),

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status behind this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            Self::Auth(AuthError::Unauthorized { status }) => Some(*status),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<backdesk_api::Error> for CoreError {
    fn from(err: backdesk_api::Error) -> Self {
        use backdesk_api::Error as ApiError;

        match err {
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::Api { status: 404, message } => CoreError::NotFound { message },
            ApiError::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::CannotBeABase(url) => CoreError::Config {
                message: format!("Base URL cannot carry resource paths: {url}"),
            },
            ApiError::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            ApiError::InvalidHeader { header, reason } => CoreError::Config {
                message: format!("Invalid {header} header: {reason}"),
            },
            ApiError::InvalidPagination { .. } | ApiError::InvalidSortOrder(_) => {
                CoreError::ValidationFailed {
                    message: err.to_string(),
                }
            }
            ApiError::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            ApiError::CredentialStore(_) => CoreError::Auth(AuthError::Store(err)),
        }
    }
}
