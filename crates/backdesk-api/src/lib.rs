// backdesk-api: generic data-access adapter for the backdesk admin REST API
//
// Bridges a resource-agnostic CRUD contract (list / get / create / update /
// delete plus bulk variants) to the concrete API: per-resource credential
// scopes, list envelopes, filter renames, and skip/limit pagination.

pub mod adapter;
pub mod auth;
pub mod credentials;
pub mod error;
pub mod policy;
pub mod query;
pub mod record;
pub mod transport;

pub use adapter::DataAdapter;
pub use auth::{AuthConfig, CredentialScope, ScopeConfig};
pub use credentials::{CredentialStore, MemoryCredentialStore};
pub use error::Error;
pub use policy::{PolicyRule, PolicyTable, ResourcePattern, ResourcePolicy, envelope_key};
pub use query::{Filters, ListParams, Pagination, ReferenceParams, Sort, SortOrder};
pub use record::{ListResult, Record, RecordId};
pub use transport::{HttpTransport, TlsMode, TransportConfig};
