// Resource policy resolution.
//
// Maps a resource name to the credential scope that authorizes it, the key
// its list envelope uses, and any filter renames or identity aliases the
// server applies. Driven by one explicit table; nothing is inferred at call
// sites.

use std::collections::BTreeMap;

use crate::auth::CredentialScope;

/// How a policy rule matches a resource name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePattern {
    /// Matches exactly this resource name.
    Exact(String),
    /// Matches any resource name starting with this prefix (e.g. `admin/`).
    Prefix(String),
}

impl ResourcePattern {
    pub fn matches(&self, resource: &str) -> bool {
        match self {
            Self::Exact(name) => resource == name,
            Self::Prefix(prefix) => resource.starts_with(prefix.as_str()),
        }
    }
}

/// One row of the policy table.
#[derive(Debug, Clone)]
pub struct PolicyRule {
    pattern: ResourcePattern,
    scope: CredentialScope,
    envelope_key: Option<String>,
    filter_renames: BTreeMap<String, String>,
    id_aliases: Vec<String>,
}

impl PolicyRule {
    pub fn exact(name: impl Into<String>, scope: CredentialScope) -> Self {
        Self::new(ResourcePattern::Exact(name.into()), scope)
    }

    pub fn prefix(prefix: impl Into<String>, scope: CredentialScope) -> Self {
        Self::new(ResourcePattern::Prefix(prefix.into()), scope)
    }

    fn new(pattern: ResourcePattern, scope: CredentialScope) -> Self {
        Self {
            pattern,
            scope,
            envelope_key: None,
            filter_renames: BTreeMap::new(),
            id_aliases: Vec::new(),
        }
    }

    /// Override the envelope key derived from the resource name.
    pub fn envelope_key(mut self, key: impl Into<String>) -> Self {
        self.envelope_key = Some(key.into());
        self
    }

    /// Send filter `from` to the server as `to`.
    pub fn rename_filter(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.filter_renames.insert(from.into(), to.into());
        self
    }

    /// Accept `alias` as the record identity in creation responses.
    pub fn id_alias(mut self, alias: impl Into<String>) -> Self {
        self.id_aliases.push(alias.into());
        self
    }
}

/// Resolved policy for a single resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePolicy {
    pub scope: CredentialScope,
    /// Key holding the record array in list responses.
    pub envelope_key: String,
    /// Filter key substitutions; unmapped keys pass through.
    pub filter_renames: BTreeMap<String, String>,
    /// Identity keys tried after `id` in creation responses, in order.
    pub id_aliases: Vec<String>,
}

impl ResourcePolicy {
    /// Server-side name for a filter key.
    pub fn filter_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.filter_renames.get(key).map_or(key, String::as_str)
    }
}

/// The final path segment of a resource name.
///
/// `admin/users` -> `users`, `services` -> `services`.
pub fn envelope_key(resource: &str) -> &str {
    resource.rsplit('/').next().unwrap_or(resource)
}

/// Default identity alias for a resource: `<singular>_id`.
///
/// `admin/orders` -> `order_id`. Returns `None` when the envelope key has no
/// trailing `s` to strip.
fn derived_id_alias(key: &str) -> Option<String> {
    key.strip_suffix('s')
        .filter(|singular| !singular.is_empty())
        .map(|singular| format!("{singular}_id"))
}

/// Ordered, first-match-wins policy table.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    rules: Vec<PolicyRule>,
    fallback: CredentialScope,
}

impl PolicyTable {
    /// An empty table resolving everything to `fallback`.
    pub fn empty(fallback: CredentialScope) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule. Earlier rules take precedence.
    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn fallback(&self) -> CredentialScope {
        self.fallback
    }

    pub fn resolve(&self, resource: &str) -> ResourcePolicy {
        let key = envelope_key(resource);
        let rule = self.rules.iter().find(|r| r.pattern.matches(resource));

        let Some(rule) = rule else {
            return ResourcePolicy {
                scope: self.fallback,
                envelope_key: key.to_owned(),
                filter_renames: BTreeMap::new(),
                id_aliases: derived_id_alias(key).into_iter().collect(),
            };
        };

        let envelope_key = rule.envelope_key.clone().unwrap_or_else(|| key.to_owned());
        let id_aliases = if rule.id_aliases.is_empty() {
            derived_id_alias(&envelope_key).into_iter().collect()
        } else {
            rule.id_aliases.clone()
        };

        ResourcePolicy {
            scope: rule.scope,
            envelope_key,
            filter_renames: rule.filter_renames.clone(),
            id_aliases,
        }
    }
}

impl Default for PolicyTable {
    /// The backdesk API's table: `admin/*` uses the administrative key,
    /// the bare `services` catalogue uses the service key, and orders
    /// filter by `status_filter` and report `order_id` on creation.
    fn default() -> Self {
        Self::empty(CredentialScope::Admin)
            .with_rule(
                PolicyRule::exact("admin/orders", CredentialScope::Admin)
                    .rename_filter("status", "status_filter")
                    .id_alias("order_id"),
            )
            .with_rule(PolicyRule::prefix("admin/", CredentialScope::Admin))
            .with_rule(PolicyRule::exact("services", CredentialScope::Service))
    }
}
