//! Store credential types.
//!
//! A [`StoreCredential`] identifies one Shopify store endpoint: the
//! `*.myshopify.com` domain plus the Admin API access token.

use secrecy::{ExposeSecret, SecretString};

/// Credentials for a single Shopify store.
///
/// Immutable once built. Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct StoreCredential {
    domain: String,
    access_token: SecretString,
}

impl StoreCredential {
    /// Create a new store credential.
    #[must_use]
    pub fn new(domain: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            domain: domain.into(),
            access_token,
        }
    }

    /// Store domain (e.g. `my-store.myshopify.com`).
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Admin API access token.
    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.access_token
    }
}

impl std::fmt::Debug for StoreCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCredential")
            .field("domain", &self.domain)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for StoreCredential {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.access_token.expose_secret() == other.access_token.expose_secret()
    }
}

impl Eq for StoreCredential {}

impl std::fmt::Display for StoreCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.domain)
    }
}
