//! CLI configuration: a thin wrapper around `backdesk_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --admin-key, etc.).

use std::sync::Arc;
use std::time::Duration;

use backdesk_api::{CredentialStore, MemoryCredentialStore, TlsMode};
use backdesk_core::ClientConfig;
use secrecy::SecretString;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use backdesk_config::{
    Config, CredentialBackend, Defaults, FileCredentialStore, Profile, config_path,
    load_config_or_default, save_config,
};

/// Everything a command needs to talk to the API.
pub struct Context {
    pub profile_name: String,
    pub client: ClientConfig,
    /// Store that survives this process (login / logout write here).
    pub durable: Arc<dyn CredentialStore>,
}

impl Context {
    /// Store for data commands: the durable store, or an in-memory one
    /// seeded from `--admin-key`.
    pub fn session_store(&self, global: &GlobalOpts) -> Result<Arc<dyn CredentialStore>, CliError> {
        let Some(ref key) = global.admin_key else {
            return Ok(Arc::clone(&self.durable));
        };

        let auth = &self.client.auth;
        let store = MemoryCredentialStore::new();
        store.set(&auth.admin.storage_key, SecretString::from(key.clone()))?;
        if let Some(service) = self.durable.get(&auth.service.storage_key)? {
            store.set(&auth.service.storage_key, service)?;
        }
        Ok(Arc::new(store))
    }
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the command context from the config file, profile, and CLI
/// overrides.
///
/// A missing profile is only an error when one was asked for by name;
/// otherwise the built-in defaults apply (local API, keyring storage).
pub fn resolve(global: &GlobalOpts) -> Result<Context, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => Profile::default(),
    };

    let client = resolve_client_config(&profile, &cfg.defaults, global)?;
    let durable: Arc<dyn CredentialStore> = match global.credentials_file {
        Some(ref path) => Arc::new(FileCredentialStore::new(path.clone())),
        None => backdesk_config::open_credential_store(&profile, &profile_name),
    };

    tracing::debug!(
        profile = %profile_name,
        api_url = %client.base_url,
        backend = %profile.credential_backend,
        "resolved configuration"
    );

    Ok(Context {
        profile_name,
        client,
        durable,
    })
}

/// Translate a `Profile` + global flags into a `ClientConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_client_config(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ClientConfig, CliError> {
    let mut client = backdesk_config::profile_to_client_config(profile, defaults)?;

    if let Some(ref url) = global.api_url {
        if let Err(e) = url.parse::<url::Url>() {
            return Err(CliError::Validation {
                field: "api-url".into(),
                reason: format!("invalid URL '{url}': {e}"),
            });
        }
        client.base_url.clone_from(url);
    }
    if global.insecure {
        client.transport.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.transport.timeout = Duration::from_secs(secs);
    }

    Ok(client)
}
