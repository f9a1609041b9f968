//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use backdesk_core::{AuthError, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the API at {url}")]
    #[diagnostic(
        code(backdesk::connection_failed),
        help(
            "Check that the API is running and reachable.\n\
             Reason: {reason}\n\
             Override the URL with --api-url or `backdesk config set api_url <URL>`."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(backdesk::timeout),
        help("Increase the timeout with --timeout or check API responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not logged in (profile '{profile}')")]
    #[diagnostic(
        code(backdesk::not_authenticated),
        help(
            "Store an administrative key with: backdesk login\n\
             Or pass one for a single command with --admin-key / BACKDESK_ADMIN_KEY."
        )
    )]
    NotAuthenticated { profile: String },

    #[error("The API rejected the administrative key (HTTP {status})")]
    #[diagnostic(
        code(backdesk::unauthorized),
        help("The stored key has been cleared. Log in again with: backdesk login")
    )]
    Unauthorized { status: u16 },

    #[error("Credential store error: {message}")]
    #[diagnostic(
        code(backdesk::credential_store),
        help(
            "If the system keyring is unavailable, switch the profile to the file backend:\n\
             backdesk config set credential_backend file"
        )
    )]
    CredentialStore { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(code(backdesk::not_found), help("Run: backdesk {list_command} to see available records"))]
    NotFound { message: String, list_command: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    #[diagnostic(code(backdesk::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(backdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(backdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: backdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(backdesk::config))]
    Config(#[from] backdesk_config::ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(backdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(backdesk::json), help("Check the JSON payload and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotAuthenticated { .. } | Self::Unauthorized { status: 401 } => exit_code::AUTH,
            Self::Unauthorized { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the profile name to a bare "not authenticated" error.
    pub fn with_profile(self, profile: &str) -> Self {
        match self {
            Self::NotAuthenticated { .. } => Self::NotAuthenticated {
                profile: profile.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<AuthError> for CliError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential => CliError::Validation {
                field: "key".into(),
                reason: "key cannot be empty".into(),
            },
            AuthError::NotAuthenticated => CliError::NotAuthenticated {
                profile: "default".into(),
            },
            AuthError::Unauthorized { status } => CliError::Unauthorized { status },
            AuthError::Store(source) => CliError::CredentialStore {
                message: source.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Auth(auth) => auth.into(),

            CoreError::NotFound { message } => CliError::NotFound {
                message,
                list_command: "<resource> list".into(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                status: None,
                message,
            },
        }
    }
}

impl From<backdesk_api::Error> for CliError {
    fn from(err: backdesk_api::Error) -> Self {
        CoreError::from(err).into()
    }
}
