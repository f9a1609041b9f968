// ── Auth gate ──
//
// Session lifecycle on top of the credential store: login stores the
// administrative key, logout clears it, check_auth tests for it, and
// check_error clears it when the API answers 401 or 403.

use std::sync::Arc;

use backdesk_api::{AuthConfig, CredentialScope, CredentialStore};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// Login / logout / session checks for the admin front-end.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn CredentialStore>,
    auth: AuthConfig,
}

impl AuthGate {
    pub fn new(store: Arc<dyn CredentialStore>, auth: AuthConfig) -> Self {
        Self { store, auth }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Store `credential` as the administrative key.
    pub fn login(&self, credential: SecretString) -> Result<(), AuthError> {
        self.login_scope(CredentialScope::Admin, credential)
    }

    /// Store `credential` for `scope`. An empty credential is rejected.
    pub fn login_scope(&self, scope: CredentialScope, credential: SecretString) -> Result<(), AuthError> {
        if credential.expose_secret().is_empty() {
            return Err(AuthError::MissingCredential);
        }
        let key = &self.auth.scope(scope).storage_key;
        self.store.set(key, credential).map_err(AuthError::Store)?;
        info!(%scope, "credential stored");
        Ok(())
    }

    /// Clear the administrative key.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.logout_scope(CredentialScope::Admin)
    }

    pub fn logout_scope(&self, scope: CredentialScope) -> Result<(), AuthError> {
        let key = &self.auth.scope(scope).storage_key;
        self.store.clear(key).map_err(AuthError::Store)?;
        info!(%scope, "credential cleared");
        Ok(())
    }

    /// Succeeds iff an administrative key is stored.
    ///
    /// Presence only; the key is not validated against the API.
    pub fn check_auth(&self) -> Result<(), AuthError> {
        if self.has_credential(CredentialScope::Admin)? {
            Ok(())
        } else {
            Err(AuthError::NotAuthenticated)
        }
    }

    /// Whether a non-empty credential is stored for `scope`.
    pub fn has_credential(&self, scope: CredentialScope) -> Result<bool, AuthError> {
        let key = &self.auth.scope(scope).storage_key;
        let stored = self.store.get(key).map_err(AuthError::Store)?;
        Ok(stored.is_some_and(|secret| !secret.expose_secret().is_empty()))
    }

    /// Inspect the status of a failed request.
    ///
    /// 401 and 403 clear the administrative key and fail. Any other status,
    /// or none at all, passes and leaves the key alone.
    pub fn check_error(&self, status: Option<u16>) -> Result<(), AuthError> {
        match status {
            Some(status @ (401 | 403)) => {
                warn!(status, "API rejected credential, clearing admin key");
                let key = &self.auth.admin.storage_key;
                self.store.clear(key).map_err(AuthError::Store)?;
                Err(AuthError::Unauthorized { status })
            }
            other => {
                debug!(status = ?other, "error does not affect session");
                Ok(())
            }
        }
    }

    /// Permissions are not modelled; every session gets full access.
    pub fn permissions(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use backdesk_api::MemoryCredentialStore;

    use super::*;

    fn gate() -> (AuthGate, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        (AuthGate::new(store.clone(), AuthConfig::default()), store)
    }

    fn stored(store: &MemoryCredentialStore, key: &str) -> Option<String> {
        store
            .get(key)
            .unwrap()
            .map(|s| s.expose_secret().to_owned())
    }

    #[test]
    fn login_stores_admin_key() {
        let (gate, store) = gate();
        gate.login(SecretString::from("secret-1")).unwrap();
        assert_eq!(stored(&store, "x-admin-key").as_deref(), Some("secret-1"));
        assert!(gate.check_auth().is_ok());
    }

    #[test]
    fn login_rejects_empty_credential() {
        let (gate, store) = gate();
        let err = gate.login(SecretString::from("")).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential));
        assert!(store.is_empty());
    }

    #[test]
    fn logout_clears_and_is_idempotent() {
        let (gate, store) = gate();
        gate.login(SecretString::from("secret-1")).unwrap();
        gate.logout().unwrap();
        gate.logout().unwrap();
        assert_eq!(stored(&store, "x-admin-key"), None);
        assert!(matches!(gate.check_auth(), Err(AuthError::NotAuthenticated)));
    }

    #[test]
    fn check_auth_fails_when_empty() {
        let (gate, _) = gate();
        assert!(matches!(gate.check_auth(), Err(AuthError::NotAuthenticated)));
    }

    #[test]
    fn service_scope_is_independent() {
        let (gate, store) = gate();
        gate.login_scope(CredentialScope::Service, SecretString::from("svc"))
            .unwrap();
        assert_eq!(stored(&store, "x-api-key").as_deref(), Some("svc"));
        assert!(gate.check_auth().is_err());

        gate.login(SecretString::from("adm")).unwrap();
        gate.logout_scope(CredentialScope::Service).unwrap();
        assert_eq!(stored(&store, "x-api-key"), None);
        assert!(gate.check_auth().is_ok());
    }

    #[test]
    fn unauthorized_statuses_clear_credential() {
        for status in [401, 403] {
            let (gate, store) = gate();
            gate.login(SecretString::from("k")).unwrap();

            let err = gate.check_error(Some(status)).unwrap_err();
            assert!(matches!(err, AuthError::Unauthorized { status: s } if s == status));
            assert_eq!(stored(&store, "x-admin-key"), None);
        }
    }

    #[test]
    fn other_statuses_keep_credential() {
        let (gate, store) = gate();
        gate.login(SecretString::from("k")).unwrap();

        gate.check_error(Some(500)).unwrap();
        gate.check_error(Some(404)).unwrap();
        gate.check_error(None).unwrap();
        assert_eq!(stored(&store, "x-admin-key").as_deref(), Some("k"));
    }

    #[test]
    fn unauthorized_leaves_service_key() {
        let (gate, store) = gate();
        gate.login(SecretString::from("k")).unwrap();
        gate.login_scope(CredentialScope::Service, SecretString::from("svc"))
            .unwrap();

        let _ = gate.check_error(Some(401));
        assert_eq!(stored(&store, "x-api-key").as_deref(), Some("svc"));
    }

    #[test]
    fn permissions_always_granted() {
        let (gate, _) = gate();
        assert!(gate.permissions().is_ok());
    }
}
