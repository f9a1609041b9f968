// Credential storage seam.
//
// The transport reads from a store on every request; only the auth gate
// writes to it. Stores are synchronous, last-writer-wins, and start empty.

use dashmap::DashMap;
use secrecy::SecretString;

use crate::error::Error;

/// Durable, synchronous key-value surface holding opaque credentials.
///
/// Absence of a key means "not authenticated for that scope".
pub trait CredentialStore: Send + Sync {
    /// Read the credential stored under `key`.
    fn get(&self, key: &str) -> Result<Option<SecretString>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: SecretString) -> Result<(), Error>;

    /// Remove the credential under `key`. Clearing a missing key succeeds.
    fn clear(&self, key: &str) -> Result<(), Error>;
}

/// Process-local store. Empty at startup, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: DashMap<String, SecretString>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-seeded with `(key, value)` pairs.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, SecretString)>,
        K: Into<String>,
    {
        let store = Self::new();
        for (key, value) in entries {
            store.entries.insert(key.into(), value);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<SecretString>, Error> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: SecretString) -> Result<(), Error> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), Error> {
        self.entries.remove(key);
        Ok(())
    }
}
