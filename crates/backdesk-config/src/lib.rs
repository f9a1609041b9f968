//! Shared configuration for backdesk tools.
//!
//! TOML profiles layered with `BACKDESK_*` environment variables, the
//! platform config path, durable credential stores, and translation to
//! `backdesk_core::ClientConfig`. The CLI adds `GlobalOpts`-aware
//! overrides on top.

pub mod store;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use backdesk_api::{AuthConfig, CredentialStore, ScopeConfig, TlsMode, TransportConfig};
use backdesk_core::{ClientConfig, DEFAULT_BASE_URL};

pub use store::{FileCredentialStore, KeyringCredentialStore};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "BACKDESK_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// Where a profile keeps its credentials between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// System keyring (macOS Keychain, Secret Service, Windows Credential Manager).
    #[default]
    Keyring,
    /// A TOML file with owner-only permissions.
    File,
}

impl fmt::Display for CredentialBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Keyring => "keyring",
            Self::File => "file",
        })
    }
}

impl FromStr for CredentialBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keyring" => Ok(Self::Keyring),
            "file" => Ok(Self::File),
            other => Err(ConfigError::Validation {
                field: "credential_backend".into(),
                reason: format!("expected 'keyring' or 'file', got '{other}'"),
            }),
        }
    }
}

/// A named API profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "http://localhost:8000").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Credential storage backend.
    #[serde(default)]
    pub credential_backend: CredentialBackend,

    /// Credentials file for the `file` backend.
    pub credentials_file: Option<PathBuf>,

    /// Header carrying the administrative key.
    pub admin_header: Option<String>,

    /// Storage key for the administrative key.
    pub admin_storage_key: Option<String>,

    /// Header carrying the service key.
    pub service_header: Option<String>,

    /// Storage key for the service key.
    pub service_storage_key: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.into()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            credential_backend: CredentialBackend::default(),
            credentials_file: None,
            admin_header: None,
            admin_storage_key: None,
            service_header: None,
            service_storage_key: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

impl Profile {
    /// Header names and storage keys, falling back to the API defaults.
    pub fn auth_config(&self) -> AuthConfig {
        let defaults = AuthConfig::default();
        AuthConfig {
            admin: ScopeConfig::new(
                self.admin_header.clone().unwrap_or(defaults.admin.header),
                self.admin_storage_key
                    .clone()
                    .unwrap_or(defaults.admin.storage_key),
            ),
            service: ScopeConfig::new(
                self.service_header.clone().unwrap_or(defaults.service.header),
                self.service_storage_key
                    .clone()
                    .unwrap_or(defaults.service.storage_key),
            ),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `BACKDESK_CONFIG`, else XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "backdesk", "backdesk").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("backdesk");
    p
}

/// Default credentials file for `profile_name`, next to the config file.
pub fn default_credentials_path(profile_name: &str) -> PathBuf {
    let path = config_path();
    let dir = path.parent().map_or_else(dirs_fallback, Path::to_path_buf);
    dir.join(format!("credentials-{profile_name}.toml"))
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered over defaults and under
/// `BACKDESK_*` variables (`__` separates nested keys).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BACKDESK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile translation ─────────────────────────────────────────────

/// Build a `ClientConfig` from a profile. No CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    url::Url::parse(&profile.api_url).map_err(|e| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL '{}': {e}", profile.api_url),
    })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    Ok(ClientConfig {
        base_url: profile.api_url.clone(),
        auth: profile.auth_config(),
        transport: TransportConfig {
            tls,
            timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        },
        ..ClientConfig::default()
    })
}

/// Open the durable credential store a profile is configured for.
pub fn open_credential_store(profile: &Profile, profile_name: &str) -> Arc<dyn CredentialStore> {
    match profile.credential_backend {
        CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new(profile_name)),
        CredentialBackend::File => {
            let path = profile
                .credentials_file
                .clone()
                .unwrap_or_else(|| default_credentials_path(profile_name));
            Arc::new(FileCredentialStore::new(path))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn profile_defaults_to_local_api() {
        let cfg = profile_to_client_config(&Profile::default(), &Defaults::default()).unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8000");
        assert_eq!(cfg.auth, AuthConfig::default());
        assert_eq!(cfg.transport.timeout, Duration::from_secs(30));
        assert!(matches!(cfg.transport.tls, TlsMode::System));
    }

    #[test]
    fn profile_overrides_headers_and_timeout() {
        let profile = Profile {
            api_url: "https://api.example.com".into(),
            admin_header: Some("X-Staff-Key".into()),
            service_storage_key: Some("svc".into()),
            timeout: Some(5),
            insecure: Some(true),
            ..Profile::default()
        };
        let cfg = profile_to_client_config(&profile, &Defaults::default()).unwrap();

        assert_eq!(cfg.auth.admin.header, "X-Staff-Key");
        assert_eq!(cfg.auth.admin.storage_key, "x-admin-key");
        assert_eq!(cfg.auth.service.header, "X-API-Key");
        assert_eq!(cfg.auth.service.storage_key, "svc");
        assert_eq!(cfg.transport.timeout, Duration::from_secs(5));
        assert!(matches!(cfg.transport.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn ca_cert_selects_custom_ca() {
        let profile = Profile {
            ca_cert: Some("/etc/backdesk/ca.pem".into()),
            ..Profile::default()
        };
        let cfg = profile_to_client_config(&profile, &Defaults::default()).unwrap();
        assert!(matches!(cfg.transport.tls, TlsMode::CustomCa(ref p) if p == Path::new("/etc/backdesk/ca.pem")));
    }

    #[test]
    fn rejects_invalid_url() {
        let profile = Profile {
            api_url: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_client_config(&profile, &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
    }

    #[test]
    fn loads_profiles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "staging"

[defaults]
timeout = 10

[profiles.staging]
api_url = "https://staging.example.com"
credential_backend = "file"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("staging"));
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.defaults.output, "table");

        let staging = &cfg.profiles["staging"];
        assert_eq!(staging.api_url, "https://staging.example.com");
        assert_eq!(staging.credential_backend, CredentialBackend::File);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_url: "http://127.0.0.1:9000".into(),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"].api_url, "http://127.0.0.1:9000");
        assert_eq!(
            loaded.profiles["default"].credential_backend,
            CredentialBackend::Keyring
        );
    }

    #[test]
    fn credential_backend_parses() {
        assert_eq!("file".parse::<CredentialBackend>().unwrap(), CredentialBackend::File);
        assert!("vault".parse::<CredentialBackend>().is_err());
    }
}
