//! The notification port.

use tollgate_protocol::AuthEvent;

/// Where the session handler publishes login/logout notifications.
///
/// An explicit injected port rather than ambient global state, so tests
/// assert on emitted events without touching real process wiring, and
/// deployments choose their own bus. Publishing is fire-and-forget:
/// implementations must not block and the handler never waits on
/// subscribers.
pub trait EventSink: Send + Sync + 'static {
    fn publish(&self, event: AuthEvent);
}

/// Discards every event. The sink of last resort.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: AuthEvent) {}
}
