// HTTP transport.
//
// Issues one request per call: resolves the resource's credential scope,
// attaches that scope's header when a credential is stored, serializes the
// JSON body, and maps non-2xx responses to `Error::Api`. Query strings are
// appended verbatim; building them is the query module's job.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{AuthConfig, CredentialScope};
use crate::credentials::CredentialStore;
use crate::error::Error;
use crate::policy::{PolicyTable, ResourcePolicy};
use crate::record::RecordId;

const USER_AGENT: &str = concat!("backdesk/", env!("CARGO_PKG_VERSION"));

// ── Client construction ──────────────────────────────────────────────

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed development servers).
    DangerAcceptInvalid,
}

/// Shared settings for building the underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout. The adapter adds no timeout of its own.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

// ── Transport ────────────────────────────────────────────────────────

/// Single-request HTTP layer shared by every adapter operation.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    auth: AuthConfig,
    policies: PolicyTable,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpTransport {
    /// Build a transport with its own `reqwest::Client`.
    pub fn new(
        base_url: &str,
        config: &TransportConfig,
        auth: AuthConfig,
        policies: PolicyTable,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, Error> {
        let http = config.build_client()?;
        Self::from_reqwest(base_url, http, auth, policies, credentials)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        auth: AuthConfig,
        policies: PolicyTable,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::CannotBeABase(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            auth,
            policies,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Resolve the policy for `resource`.
    pub fn policy(&self, resource: &str) -> ResourcePolicy {
        self.policies.resolve(resource)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}/{resource segments}[/{id}]`, each segment percent-encoded.
    pub fn resource_url(&self, resource: &str, id: Option<&RecordId>) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::CannotBeABase(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(resource.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        Ok(url)
    }

    // ── Auth ─────────────────────────────────────────────────────────

    /// Header for `scope`, or `None` when no credential is stored.
    fn auth_header(&self, scope: CredentialScope) -> Result<Option<(HeaderName, HeaderValue)>, Error> {
        let cfg = self.auth.scope(scope);
        let Some(secret) = self.credentials.get(&cfg.storage_key)? else {
            return Ok(None);
        };
        if secret.expose_secret().is_empty() {
            return Ok(None);
        }

        let name = HeaderName::from_bytes(cfg.header.as_bytes()).map_err(|e| {
            Error::InvalidHeader {
                header: cfg.header.clone(),
                reason: e.to_string(),
            }
        })?;
        let mut value =
            HeaderValue::from_str(secret.expose_secret()).map_err(|e| Error::InvalidHeader {
                header: cfg.header.clone(),
                reason: e.to_string(),
            })?;
        value.set_sensitive(true);
        Ok(Some((name, value)))
    }

    // ── Request ──────────────────────────────────────────────────────

    /// Issue one request against `resource` (optionally `resource/{id}`).
    ///
    /// Returns the parsed JSON body, or `Value::Null` for an empty 2xx body.
    pub async fn request(
        &self,
        method: Method,
        resource: &str,
        id: Option<&RecordId>,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = self.resource_url(resource, id)?;
        let scope = self.policies.resolve(resource).scope;
        debug!(%method, %url, %scope, "sending request");
        trace!(?query, "query parameters");

        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some((name, value)) = self.auth_header(scope)? {
            builder = builder.header(name, value);
        } else {
            trace!(%scope, "no credential stored, sending unauthenticated");
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        handle_response(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response(resp: reqwest::Response) -> Result<Value, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(parse_error(status, resp).await);
    }

    let body = resp.text().await?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();

    let structured = serde_json::from_str::<ErrorResponse>(&raw)
        .ok()
        .and_then(|err| match err.detail {
            Some(Value::String(detail)) => Some(detail),
            Some(detail) if !detail.is_null() => Some(detail.to_string()),
            _ => err.message,
        });

    let message = match structured {
        Some(message) => message,
        None if raw.is_empty() => status.to_string(),
        None => raw,
    };

    debug!(status = status.as_u16(), %message, "request failed");
    Error::Api {
        status: status.as_u16(),
        message,
    }
}
