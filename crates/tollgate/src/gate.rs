//! The `Tollgate` front door: wire once, open one session per connection.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tollgate_protocol::ConnectionId;
use tollgate_session::{AuthConfig, EventSink, NullSink, SessionHandle, spawn_session};
use tollgate_strategy::StrategyRegistry;
use tollgate_token::{MemoryTokenService, TokenService};

/// Counter for assigning connection ids, process-wide.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Everything a deployment wires once and shares across connections.
///
/// The transport layer calls [`open`](Self::open) for each accepted
/// socket and drives the returned [`SessionHandle`] with the socket's
/// inbound events. Everything behind the handle — registry, token
/// service, event sink — is shared and safe for concurrent use.
pub struct Tollgate {
    config: AuthConfig,
    registry: Arc<StrategyRegistry>,
    tokens: Arc<dyn TokenService>,
    events: Arc<dyn EventSink>,
}

impl Tollgate {
    /// Creates a new builder.
    pub fn builder() -> TollgateBuilder {
        TollgateBuilder::new()
    }

    /// Opens a session for a newly accepted connection. `headers` are the
    /// transport handshake's headers.
    pub fn open(&self, headers: HashMap<String, String>) -> SessionHandle {
        let connection = ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%connection, "connection opened");
        spawn_session(
            connection,
            headers,
            self.config.clone(),
            Arc::clone(&self.registry),
            Arc::clone(&self.tokens),
            Arc::clone(&self.events),
        )
    }

    /// The configuration sessions run with.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// The shared strategy registry.
    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }
}

/// Builder for configuring a [`Tollgate`].
///
/// Defaults: [`AuthConfig::default`], an empty registry (every
/// authenticate fails until strategies are registered), an in-process
/// [`MemoryTokenService`], and the [`NullSink`] — inject a
/// [`BroadcastEvents`](crate::BroadcastEvents) to actually observe
/// login/logout notifications.
pub struct TollgateBuilder {
    config: AuthConfig,
    registry: Option<StrategyRegistry>,
    tokens: Option<Arc<dyn TokenService>>,
    events: Option<Arc<dyn EventSink>>,
}

impl TollgateBuilder {
    pub fn new() -> Self {
        Self {
            config: AuthConfig::default(),
            registry: None,
            tokens: None,
            events: None,
        }
    }

    /// Sets the authentication configuration.
    pub fn config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the strategy registry.
    pub fn registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the token service.
    pub fn token_service(mut self, tokens: Arc<dyn TokenService>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the sink login/logout notifications are published to.
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Assembles the gate.
    pub fn build(self) -> Tollgate {
        Tollgate {
            config: self.config,
            registry: Arc::new(
                self.registry
                    .unwrap_or_else(|| StrategyRegistry::builder().build()),
            ),
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(MemoryTokenService::new())),
            events: self.events.unwrap_or_else(|| Arc::new(NullSink)),
        }
    }
}

impl Default for TollgateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let gate = Tollgate::builder().build();
        assert_eq!(gate.config().header_name, "Authorization");
        assert!(gate.registry().is_empty());
    }

    #[tokio::test]
    async fn test_open_assigns_distinct_connection_ids() {
        let gate = Tollgate::builder().build();

        let a = gate.open(HashMap::new());
        let b = gate.open(HashMap::new());

        assert_ne!(a.connection(), b.connection());
    }
}
