//! Authentication configuration.

use std::time::Duration;

/// Configuration consumed by the session handler.
///
/// Read-only and externally supplied — whoever loads process
/// configuration builds one of these and hands it to every session.
/// Per-strategy options are not here; they ride on the registry entries.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The path the authentication service is mounted on. Carried in
    /// notification contexts so subscribers can tell deployments apart.
    pub service_path: String,

    /// The connection header that carries the access token after login.
    pub header_name: String,

    /// Token time-to-live in seconds. The expiry deadline is armed this
    /// far in the future on every successful authenticate.
    pub token_ttl_secs: u64,

    /// When set, overrides the message of every credential rejection.
    /// Deployments use this to avoid leaking which part of a credential
    /// was wrong.
    pub failure_message: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            service_path: "/authentication".to_string(),
            header_name: "Authorization".to_string(),
            token_ttl_secs: 86_400,
            failure_message: None,
        }
    }
}

impl AuthConfig {
    /// The TTL as a [`Duration`].
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}
