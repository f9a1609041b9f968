// Generic data adapter.
//
// Implements the uniform list / get / create / update / delete contract the
// front-end consumes on top of `HttpTransport`. Stateless: every operation is
// request building plus response unwrapping. "Many" operations fan out one
// request per id and join them; the first failure fails the whole call.

use std::sync::Arc;

use futures_util::future::try_join_all;
use reqwest::Method;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::Error;
use crate::policy::ResourcePolicy;
use crate::query::{ListParams, ReferenceParams, build_list_query, build_reference_query};
use crate::record::{ListResult, Record, RecordId};
use crate::transport::HttpTransport;

/// Resource-agnostic CRUD client.
///
/// Cheap to clone; clones share the transport and its credential store.
#[derive(Clone)]
pub struct DataAdapter {
    transport: Arc<HttpTransport>,
}

impl DataAdapter {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// `GET {resource}?skip&limit&sort_by&order&filters...`
    pub async fn get_list(&self, resource: &str, params: &ListParams) -> Result<ListResult, Error> {
        let policy = self.transport.policy(resource);
        let query = build_list_query(
            params.pagination,
            params.sort.as_ref(),
            &params.filter,
            &policy.filter_renames,
        );
        let body = self
            .transport
            .request(Method::GET, resource, None, &query, None)
            .await?;
        Ok(unwrap_envelope(resource, &policy, body))
    }

    /// `GET {resource}/{id}`; the record is returned as-is.
    pub async fn get_one(&self, resource: &str, id: &RecordId) -> Result<Value, Error> {
        self.transport
            .request(Method::GET, resource, Some(id), &[], None)
            .await
    }

    /// Plain `GET {resource}` with no query, for non-collection endpoints
    /// such as `admin/stats`. The body is returned as-is.
    pub async fn fetch(&self, resource: &str) -> Result<Value, Error> {
        self.transport
            .request(Method::GET, resource, None, &[], None)
            .await
    }

    /// One `GET {resource}/{id}` per id, concurrently. Results follow the
    /// order of `ids` regardless of completion order.
    pub async fn get_many(&self, resource: &str, ids: &[RecordId]) -> Result<Vec<Value>, Error> {
        debug!(resource, count = ids.len(), "fetching records by id");
        try_join_all(ids.iter().map(|id| self.get_one(resource, id))).await
    }

    /// List records whose `target` field equals the anchor id.
    pub async fn get_many_reference(
        &self,
        resource: &str,
        reference: &ReferenceParams,
    ) -> Result<ListResult, Error> {
        let policy = self.transport.policy(resource);
        let query = build_reference_query(reference, &policy.filter_renames);
        let body = self
            .transport
            .request(Method::GET, resource, None, &query, None)
            .await?;
        Ok(unwrap_envelope(resource, &policy, body))
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// `POST {resource}`. Returns `data` with the server-assigned `id` merged in.
    ///
    /// A response carrying neither `id` nor an alias still succeeds, since the
    /// record exists server-side; `data` comes back without an `id`.
    pub async fn create(&self, resource: &str, mut data: Record) -> Result<Record, Error> {
        let body = Value::Object(data.clone());
        let response = self
            .transport
            .request(Method::POST, resource, None, &[], Some(&body))
            .await?;

        let policy = self.transport.policy(resource);
        if let Some(id) = extract_identity(&policy, &response) {
            data.insert("id".into(), id);
        } else {
            warn!(resource, "creation response carried no record identifier");
        }
        Ok(data)
    }

    /// `PATCH {resource}/{id}`. Returns the server's record verbatim.
    pub async fn update(&self, resource: &str, id: &RecordId, data: &Record) -> Result<Value, Error> {
        let body = Value::Object(data.clone());
        self.transport
            .request(Method::PATCH, resource, Some(id), &[], Some(&body))
            .await
    }

    /// One PATCH per id with the same body, concurrently.
    ///
    /// Returns `ids` unchanged: it confirms acceptance, not server state.
    pub async fn update_many(
        &self,
        resource: &str,
        ids: &[RecordId],
        data: &Record,
    ) -> Result<Vec<RecordId>, Error> {
        let body = Value::Object(data.clone());
        try_join_all(ids.iter().map(|id| {
            self.transport
                .request(Method::PATCH, resource, Some(id), &[], Some(&body))
        }))
        .await?;
        Ok(ids.to_vec())
    }

    /// `DELETE {resource}/{id}`. Returns the server body, or `{"id": id}`
    /// when the server sends none.
    pub async fn delete(&self, resource: &str, id: &RecordId) -> Result<Value, Error> {
        let response = self
            .transport
            .request(Method::DELETE, resource, Some(id), &[], None)
            .await?;
        if response.is_null() {
            return Ok(json!({ "id": id.to_value() }));
        }
        Ok(response)
    }

    /// One DELETE per id, concurrently. Returns `ids` unchanged.
    pub async fn delete_many(&self, resource: &str, ids: &[RecordId]) -> Result<Vec<RecordId>, Error> {
        try_join_all(ids.iter().map(|id| {
            self.transport
                .request(Method::DELETE, resource, Some(id), &[], None)
        }))
        .await?;
        Ok(ids.to_vec())
    }
}

// ── Response normalization ───────────────────────────────────────────

/// Pull the record array out of a list envelope.
///
/// A missing envelope key degrades to an empty page; a missing `total`
/// falls back to the page length.
fn unwrap_envelope(resource: &str, policy: &ResourcePolicy, body: Value) -> ListResult {
    let Value::Object(mut envelope) = body else {
        warn!(resource, "list response is not an object, treating as empty");
        return ListResult {
            records: Vec::new(),
            total: 0,
        };
    };

    let records = match envelope.remove(&policy.envelope_key) {
        Some(Value::Array(records)) => records,
        _ => {
            debug!(
                resource,
                key = %policy.envelope_key,
                "envelope key missing, returning empty page"
            );
            Vec::new()
        }
    };

    let page_len = u64::try_from(records.len()).unwrap_or(u64::MAX);
    let total = match envelope.get("total") {
        Some(total) => total.as_u64().unwrap_or_else(|| {
            debug!(resource, %total, "non-integer total, using page length");
            page_len
        }),
        None => page_len,
    };

    ListResult { records, total }
}

/// Identity from a creation response: `id`, then each alias in order.
fn extract_identity(policy: &ResourcePolicy, response: &Value) -> Option<Value> {
    std::iter::once("id")
        .chain(policy.id_aliases.iter().map(String::as_str))
        .filter_map(|key| response.get(key))
        .find(|value| !value.is_null())
        .cloned()
}
