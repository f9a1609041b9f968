use serde::{Deserialize, Serialize};

/// Which stored credential authorizes a resource.
///
/// Marker enum (no data) -- header names and storage keys live in
/// [`AuthConfig`], the secrets themselves in a
/// [`CredentialStore`](crate::CredentialStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialScope {
    /// Administrative key, sent on `/admin/*` resources.
    Admin,
    /// Service-level key, sent on the public service catalogue.
    Service,
}

impl CredentialScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Service => "service",
        }
    }
}

impl std::fmt::Display for CredentialScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header name and storage key for one credential scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// HTTP header carrying the credential (e.g. `X-Admin-Key`).
    pub header: String,
    /// Key under which the credential is persisted (e.g. `x-admin-key`).
    pub storage_key: String,
}

impl ScopeConfig {
    pub fn new(header: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            storage_key: storage_key.into(),
        }
    }
}

/// Header names and storage keys for both credential scopes.
///
/// These are configuration constants; call sites never hardcode them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub admin: ScopeConfig,
    pub service: ScopeConfig,
}

impl AuthConfig {
    pub const DEFAULT_ADMIN_HEADER: &'static str = "X-Admin-Key";
    pub const DEFAULT_ADMIN_STORAGE_KEY: &'static str = "x-admin-key";
    pub const DEFAULT_SERVICE_HEADER: &'static str = "X-API-Key";
    pub const DEFAULT_SERVICE_STORAGE_KEY: &'static str = "x-api-key";

    pub fn scope(&self, scope: CredentialScope) -> &ScopeConfig {
        match scope {
            CredentialScope::Admin => &self.admin,
            CredentialScope::Service => &self.service,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin: ScopeConfig::new(Self::DEFAULT_ADMIN_HEADER, Self::DEFAULT_ADMIN_STORAGE_KEY),
            service: ScopeConfig::new(
                Self::DEFAULT_SERVICE_HEADER,
                Self::DEFAULT_SERVICE_STORAGE_KEY,
            ),
        }
    }
}
