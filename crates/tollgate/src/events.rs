//! The process-wide login/logout bus.

use tokio::sync::broadcast;
use tollgate_protocol::AuthEvent;
use tollgate_session::EventSink;

/// Events buffered per subscriber before the oldest are dropped. Login
/// and logout are low-frequency; a subscriber that falls this far behind
/// has bigger problems than lost notifications.
const BUS_CAPACITY: usize = 256;

/// An [`EventSink`] that fans every event out to broadcast subscribers.
///
/// This is the process-wide bus: anything in the surrounding system that
/// cares about logins and logouts subscribes here. Delivery is
/// fire-and-forget — publishing with no subscribers is a no-op, and the
/// sessions never wait on a subscriber.
///
/// Cloning is cheap and every clone publishes into the same bus.
#[derive(Debug, Clone)]
pub struct BroadcastEvents {
    bus: broadcast::Sender<AuthEvent>,
}

impl BroadcastEvents {
    pub fn new() -> Self {
        let (bus, _) = broadcast::channel(BUS_CAPACITY);
        Self { bus }
    }

    /// Opens a fresh subscription. Only events published after this call
    /// are delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.bus.subscribe()
    }
}

impl Default for BroadcastEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for BroadcastEvents {
    fn publish(&self, event: AuthEvent) {
        // Err here only means "no subscribers right now".
        let _ = self.bus.send(event);
    }
}

// =========================================================================
// Tests
// =========================================================================
