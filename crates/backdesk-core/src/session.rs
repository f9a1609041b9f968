// ── Session facade ──
//
// Wires a `DataAdapter` and an `AuthGate` over one credential store.
// Every failed adapter call is routed through `AuthGate::check_error`
// before it reaches the caller, so a 401/403 from any operation ends
// the session.

use std::sync::Arc;

use backdesk_api::{
    CredentialStore, DataAdapter, HttpTransport, ListParams, ListResult, Record, RecordId,
    ReferenceParams,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth_gate::AuthGate;
use crate::config::ClientConfig;
use crate::convert::{decode, decode_all};
use crate::error::{AuthError, CoreError};
use crate::model::{Order, Page, Resource, STATS, Service, Stats};

/// Authenticated view of the admin API.
#[derive(Clone)]
pub struct Session {
    adapter: DataAdapter,
    gate: AuthGate,
}

impl Session {
    /// Build the transport, adapter, and gate from `config`, all sharing
    /// `store`.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, CoreError> {
        let transport = HttpTransport::new(
            &config.base_url,
            &config.transport,
            config.auth.clone(),
            config.policies,
            Arc::clone(&store),
        )?;
        Ok(Self {
            adapter: DataAdapter::new(transport),
            gate: AuthGate::new(store, config.auth),
        })
    }

    pub fn from_parts(adapter: DataAdapter, gate: AuthGate) -> Self {
        Self { adapter, gate }
    }

    pub fn adapter(&self) -> &DataAdapter {
        &self.adapter
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Bootstrap check: fails unless an administrative key is stored.
    pub fn check_auth(&self) -> Result<(), CoreError> {
        Ok(self.gate.check_auth()?)
    }

    /// Pass successes through; let the gate see every failure first.
    ///
    /// When the gate itself fails (the store could not clear the key) its
    /// error is returned and the API error is only logged.
    fn route<T>(&self, result: Result<T, backdesk_api::Error>) -> Result<T, CoreError> {
        result.or_else(|err| {
            if let Err(auth) = self.gate.check_error(err.status()) {
                if matches!(auth, AuthError::Store(_)) {
                    warn!(error = %err, "request failed and credential could not be cleared");
                }
                return Err(auth.into());
            }
            Err(CoreError::from(err))
        })
    }

    // ── Untyped operations ───────────────────────────────────────────

    pub async fn get_list(&self, resource: &str, params: &ListParams) -> Result<ListResult, CoreError> {
        self.route(self.adapter.get_list(resource, params).await)
    }

    pub async fn get_one(&self, resource: &str, id: &RecordId) -> Result<Value, CoreError> {
        self.route(self.adapter.get_one(resource, id).await)
    }

    pub async fn get_many(&self, resource: &str, ids: &[RecordId]) -> Result<Vec<Value>, CoreError> {
        self.route(self.adapter.get_many(resource, ids).await)
    }

    pub async fn get_many_reference(
        &self,
        resource: &str,
        reference: &ReferenceParams,
    ) -> Result<ListResult, CoreError> {
        self.route(self.adapter.get_many_reference(resource, reference).await)
    }

    pub async fn create(&self, resource: &str, data: Record) -> Result<Record, CoreError> {
        self.route(self.adapter.create(resource, data).await)
    }

    pub async fn update(&self, resource: &str, id: &RecordId, data: &Record) -> Result<Value, CoreError> {
        self.route(self.adapter.update(resource, id, data).await)
    }

    pub async fn update_many(
        &self,
        resource: &str,
        ids: &[RecordId],
        data: &Record,
    ) -> Result<Vec<RecordId>, CoreError> {
        self.route(self.adapter.update_many(resource, ids, data).await)
    }

    pub async fn delete(&self, resource: &str, id: &RecordId) -> Result<Value, CoreError> {
        self.route(self.adapter.delete(resource, id).await)
    }

    pub async fn delete_many(&self, resource: &str, ids: &[RecordId]) -> Result<Vec<RecordId>, CoreError> {
        self.route(self.adapter.delete_many(resource, ids).await)
    }

    // ── Typed operations ─────────────────────────────────────────────

    /// List `T::NAME` and decode the page.
    pub async fn list_typed<T>(&self, params: &ListParams) -> Result<Page<T>, CoreError>
    where
        T: Resource + serde::de::DeserializeOwned,
    {
        let page = self.get_list(T::NAME, params).await?;
        Ok(Page {
            items: decode_all(page.records)?,
            total: page.total,
        })
    }

    /// Fetch one `T` by id.
    pub async fn get_typed<T>(&self, id: &RecordId) -> Result<T, CoreError>
    where
        T: Resource + serde::de::DeserializeOwned,
    {
        decode(self.get_one(T::NAME, id).await?)
    }

    /// Dashboard counters.
    pub async fn stats(&self) -> Result<Stats, CoreError> {
        let body = self.route(self.adapter.fetch(STATS).await)?;
        if body.is_null() {
            return Ok(Stats::default());
        }
        decode(body)
    }

    /// Create an order, filling `total_amount` from the referenced
    /// service's `base_price` when the caller left it out.
    pub async fn create_order(&self, mut data: Record) -> Result<Record, CoreError> {
        let amount_missing = data.get("total_amount").is_none_or(Value::is_null);
        let service_id = data.get("service_id").and_then(RecordId::from_value);

        if let (true, Some(service_id)) = (amount_missing, service_id) {
            let service = self.get_one(Service::NAME, &service_id).await?;
            match service.get("base_price") {
                Some(price) if !price.is_null() => {
                    debug!(service = %service_id, %price, "filling order amount from service");
                    data.insert("total_amount".into(), price.clone());
                }
                _ => debug!(service = %service_id, "service has no base price"),
            }
        }

        self.create(Order::NAME, data).await
    }
}
