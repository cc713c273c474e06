//! Direction resolution.
//!
//! Maps a [`SyncDirection`] onto concrete source and target credentials.
//! Everything downstream receives already-resolved stores.

use secrecy::{ExposeSecret, SecretString};
use shop_sync_core::{StoreCredential, StoreRole, SyncDirection};

use crate::config::ConfigError;

/// Raw credentials for one role, as loaded from configuration.
///
/// Fields are optional so the dashboard can start with a partial
/// configuration; [`resolve`] rejects anything incomplete.
#[derive(Clone, Default)]
pub struct RoleCredentials {
    pub domain: Option<String>,
    pub access_token: Option<SecretString>,
    /// Theme used for theme settings; the store's main theme when `None`.
    pub theme_id: Option<u64>,
}

impl std::fmt::Debug for RoleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleCredentials")
            .field("domain", &self.domain)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("theme_id", &self.theme_id)
            .finish()
    }
}

/// Credentials for both roles.
#[derive(Debug, Clone, Default)]
pub struct StoreRoles {
    pub stage: RoleCredentials,
    pub prod: RoleCredentials,
}

impl StoreRoles {
    #[must_use]
    pub const fn role(&self, role: StoreRole) -> &RoleCredentials {
        match role {
            StoreRole::Stage => &self.stage,
            StoreRole::Prod => &self.prod,
        }
    }

    /// Validated credential for one role.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if the domain or token is
    /// absent or blank.
    pub fn credential(&self, role: StoreRole) -> Result<StoreCredential, ConfigError> {
        let creds = self.role(role);
        let prefix = env_prefix(role);

        let domain = creds
            .domain
            .as_deref()
            .map(normalize_domain)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                role,
                field: "shop domain",
                var: format!("{prefix}_SHOP"),
            })?;

        let token = creds
            .access_token
            .as_ref()
            .filter(|t| !t.expose_secret().trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                role,
                field: "access token",
                var: format!("{prefix}_ACCESS_TOKEN"),
            })?;

        Ok(StoreCredential::new(domain, token.clone()))
    }

    /// Configured theme ID for the store with this domain, if any.
    #[must_use]
    pub fn theme_id_for(&self, domain: &str) -> Option<u64> {
        [&self.stage, &self.prod]
            .into_iter()
            .find(|creds| {
                creds
                    .domain
                    .as_deref()
                    .is_some_and(|d| normalize_domain(d) == domain)
            })
            .and_then(|creds| creds.theme_id)
    }
}

/// Source and target for one sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStores {
    pub source: StoreCredential,
    pub target: StoreCredential,
}

/// Resolve a direction into `(source, target)` credentials.
///
/// Pure; performs no I/O. Both roles are validated regardless of direction,
/// so a misconfiguration is caught before anything is listed or written.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredential`] naming the first missing value,
/// source before target.
pub fn resolve(direction: SyncDirection, roles: &StoreRoles) -> Result<ResolvedStores, ConfigError> {
    let source = roles.credential(direction.source_role())?;
    let target = roles.credential(direction.target_role())?;
    Ok(ResolvedStores { source, target })
}

const fn env_prefix(role: StoreRole) -> &'static str {
    match role {
        StoreRole::Stage => "STAGE",
        StoreRole::Prod => "PROD",
    }
}

/// `https://Shop.myshopify.com/` -> `shop.myshopify.com`
fn normalize_domain(domain: &str) -> String {
    domain
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_lowercase()
}
