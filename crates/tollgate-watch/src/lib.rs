//! Entity synchronization for Tollgate.
//!
//! An authenticated connection caches a snapshot of its principal (the
//! entity that logged in). That record can change elsewhere in the system
//! at any time — edited by an admin, patched by a background job, deleted
//! outright. This crate keeps the snapshot honest:
//!
//! 1. **Change feeds** — a [`WatchedService`] exposes the `updated` /
//!    `patched` / `removed` events of one backing service as a broadcast
//!    channel ([`BroadcastService`] is the in-process implementation).
//! 2. **Watchers** — an [`EntityWatcher`] is a per-connection task that
//!    subscribes to one feed, filters it down to the single entity the
//!    connection authenticated as, and forwards matching events to the
//!    session.
//!
//! At most one watcher is live per connection; registering a new one (on
//! re-login) and every path out of the authenticated state must unregister
//! the previous one, or listeners pile up login after login.

mod service;
mod watcher;

pub use service::{BroadcastService, ChangeKind, ServiceEvent, WatchedService};
pub use watcher::{EntityWatcher, WatcherBinding};
