// ── Runtime client configuration ──
//
// Describes *how* to reach the admin API: base URL, header names and
// storage keys per credential scope, resource policies, and HTTP tuning.
// Never touches disk; backdesk-config builds one from a profile.

use backdesk_api::{AuthConfig, PolicyTable, TransportConfig};

/// Base URL used when no profile or flag provides one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Everything needed to build a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., `http://localhost:8000`).
    pub base_url: String,
    /// Header names and storage keys for each credential scope.
    pub auth: AuthConfig,
    /// TLS and timeout settings.
    pub transport: TransportConfig,
    /// Resource name → scope / envelope / filter rules.
    pub policies: PolicyTable,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            auth: AuthConfig::default(),
            transport: TransportConfig::default(),
            policies: PolicyTable::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}
