// Durable credential stores.
//
// Both survive process restarts, so `backdesk login` in one invocation
// authenticates the next. Keys are the storage keys from `AuthConfig`
// (`x-admin-key`, `x-api-key` by default), namespaced per profile.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use backdesk_api::{CredentialStore, Error};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

const KEYRING_SERVICE: &str = "backdesk";

// ── Keyring ─────────────────────────────────────────────────────────

/// Credentials in the system keyring, one entry per `{profile}/{key}`.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    profile: String,
}

impl KeyringCredentialStore {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, Error> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{}/{key}", self.profile))
            .map_err(|e| Error::CredentialStore(format!("failed to access keyring: {e}")))
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self, key: &str) -> Result<Option<SecretString>, Error> {
        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(SecretString::from(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::CredentialStore(format!(
                "failed to read '{key}' from keyring: {e}"
            ))),
        }
    }

    fn set(&self, key: &str, value: SecretString) -> Result<(), Error> {
        self.entry(key)?
            .set_password(value.expose_secret())
            .map_err(|e| Error::CredentialStore(format!("failed to store '{key}' in keyring: {e}")))
    }

    fn clear(&self, key: &str) -> Result<(), Error> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::CredentialStore(format!(
                "failed to remove '{key}' from keyring: {e}"
            ))),
        }
    }
}

// ── File ────────────────────────────────────────────────────────────

/// Credentials in a flat TOML table (`key = "value"`).
///
/// Every call re-reads the file. Writes replace it whole and, on Unix,
/// restrict it to the owner.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, Error> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(io_error(&self.path, &e)),
        };
        toml::from_str(&raw).map_err(|e| {
            Error::CredentialStore(format!("corrupt credentials file {}: {e}", self.path.display()))
        })
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }
        let body = toml::to_string(entries)
            .map_err(|e| Error::CredentialStore(format!("failed to encode credentials: {e}")))?;
        std::fs::write(&self.path, body).map_err(|e| io_error(&self.path, &e))?;
        restrict_permissions(&self.path)
    }

    fn locked<T>(&self, f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::CredentialStore("credential file lock poisoned".into()))?;
        f()
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<SecretString>, Error> {
        self.locked(|| Ok(self.read()?.remove(key).map(SecretString::from)))
    }

    fn set(&self, key: &str, value: SecretString) -> Result<(), Error> {
        self.locked(|| {
            let mut entries = self.read()?;
            entries.insert(key.to_owned(), value.expose_secret().to_owned());
            self.write(&entries)?;
            debug!(path = %self.path.display(), key, "credential written");
            Ok(())
        })
    }

    fn clear(&self, key: &str) -> Result<(), Error> {
        self.locked(|| {
            let mut entries = self.read()?;
            if entries.remove(key).is_some() {
                self.write(&entries)?;
            }
            Ok(())
        })
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> Error {
    Error::CredentialStore(format!("{}: {err}", path.display()))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_error(path, &e))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn restrict_permissions(_path: &Path) -> Result<(), Error> {
    Ok(())
}
