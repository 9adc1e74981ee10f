//! Change feeds: what a watched service looks like to the core.

use std::fmt;

use serde_json::Value;
use tokio::sync::broadcast;

/// How many events a feed buffers per subscriber before it starts
/// dropping the oldest (broadcast semantics). A session only cares about
/// the latest state of one record, so a slow subscriber losing old events
/// is acceptable — the watcher logs the lag and keeps going.
const FEED_CAPACITY: usize = 64;

/// The kind of change a backing service reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The record was replaced wholesale.
    Updated,
    /// Some fields of the record changed.
    Patched,
    /// The record no longer exists.
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated => write!(f, "updated"),
            Self::Patched => write!(f, "patched"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// One change event from a backing service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEvent {
    /// What happened.
    pub kind: ChangeKind,
    /// The affected record. For `Removed`, the last known state.
    pub record: Value,
}

impl ServiceEvent {
    pub fn new(kind: ChangeKind, record: Value) -> Self {
        Self { kind, record }
    }
}

/// A service whose records can be watched for changes.
///
/// The core never queries a watched service — it only subscribes to its
/// feed. How the surrounding system produces the events (database
/// triggers, an ORM hook, replication) is its own business.
pub trait WatchedService: Send + Sync + 'static {
    /// The path the service is mounted on (used for logging and for
    /// telling bindings apart across re-logins).
    fn path(&self) -> &str;

    /// Opens a fresh subscription to the service's change feed.
    fn subscribe(&self) -> broadcast::Receiver<ServiceEvent>;
}

// ---------------------------------------------------------------------------
// BroadcastService
// ---------------------------------------------------------------------------

/// An in-process [`WatchedService`] over a Tokio broadcast channel.
///
/// The surrounding system calls [`publish`](Self::publish) whenever a
/// record changes; every live watcher gets a copy. Publishing with no
/// subscribers is a no-op, matching fire-and-forget feed semantics.
pub struct BroadcastService {
    path: String,
    feed: broadcast::Sender<ServiceEvent>,
}

impl BroadcastService {
    /// Creates a feed for the service mounted at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            path: path.into(),
            feed,
        }
    }

    /// Publishes one change event to every subscriber.
    pub fn publish(&self, kind: ChangeKind, record: Value) {
        // Err here only means "no subscribers right now".
        let _ = self.feed.send(ServiceEvent::new(kind, record));
    }

    /// The number of live subscriptions. One authenticated connection
    /// holds exactly one; this is the leak check.
    pub fn subscriber_count(&self) -> usize {
        self.feed.receiver_count()
    }
}

impl WatchedService for BroadcastService {
    fn path(&self) -> &str {
        &self.path
    }

    fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.feed.subscribe()
    }
}

impl fmt::Debug for BroadcastService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastService")
            .field("path", &self.path)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// =========================================================================
// Tests
// =========================================================================
